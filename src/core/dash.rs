use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::format::format_svg_number;
use crate::core::shape::{Curve, segment_lengths};
use crate::error::{ChartError, ChartResult};

/// Dash/gap lengths used for uncertain line segments, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DashPattern {
    pub dash: f64,
    pub gap: f64,
}

impl Default for DashPattern {
    fn default() -> Self {
        Self {
            dash: 4.0,
            gap: 4.0,
        }
    }
}

impl DashPattern {
    pub fn validate(self) -> ChartResult<Self> {
        if !self.dash.is_finite() || !self.gap.is_finite() || self.dash <= 0.0 || self.gap < 0.0 {
            return Err(ChartError::InvalidConfig(
                "dash pattern requires dash > 0 and gap >= 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Builds a `stroke-dasharray` covering the curve through `points` piece by
/// piece.
///
/// Segment `i -> i + 1` is drawn solid when point `i + 1` is certain and
/// dashed otherwise. Segment lengths follow `curve`, so step and monotone
/// lines dash where they are drawn. Returns `None` when every segment is
/// solid.
#[must_use]
pub fn stroke_dash_array(
    points: &[(f64, f64)],
    certain: &[bool],
    curve: Curve,
    pattern: DashPattern,
) -> Option<String> {
    if points.len() < 2 {
        return None;
    }

    let period = pattern.dash + pattern.gap;
    let mut any_dashed = false;
    let mut runs: SmallVec<[(f64, f64); 32]> = SmallVec::new();
    for (index, length) in segment_lengths(points, curve).into_iter().enumerate() {
        let trailing_certain = certain.get(index + 1).copied().unwrap_or(true);
        if trailing_certain || period <= 0.0 {
            runs.push((length, 0.0));
            continue;
        }

        any_dashed = true;
        let repeats = (length / period).floor() as usize;
        for _ in 0..repeats {
            runs.push((pattern.dash, pattern.gap));
        }
        let remainder = length - repeats as f64 * period;
        if remainder > 1e-9 {
            let dash = remainder.min(pattern.dash);
            runs.push((dash, remainder - dash));
        }
    }

    if !any_dashed {
        return None;
    }

    let parts: Vec<String> = runs
        .iter()
        .map(|(on, off)| format!("{},{}", format_svg_number(*on), format_svg_number(*off)))
        .collect();
    Some(parts.join(", "))
}

#[must_use]
pub fn segment_length(from: (f64, f64), to: (f64, f64)) -> f64 {
    let length = (to.0 - from.0).hypot(to.1 - from.1);
    if length.is_finite() { length } else { 0.0 }
}

/// Sum of `stroke-dasharray` entries; equals the covered path length.
pub fn dash_array_length(dash_array: &str) -> ChartResult<f64> {
    dash_array
        .split([',', ' '])
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<f64>().map_err(|e| {
                ChartError::InvalidData(format!("invalid dash array entry `{part}`: {e}"))
            })
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{DashPattern, dash_array_length, stroke_dash_array};
    use crate::core::shape::{Curve, curve_length};

    #[test]
    fn all_certain_points_need_no_dash_array() {
        let points = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        assert_eq!(
            stroke_dash_array(&points, &[true, true, true], Curve::Linear, DashPattern::default()),
            None
        );
    }

    #[test]
    fn uncertain_trailing_point_dashes_its_segment() {
        let points = [(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)];
        let dash = stroke_dash_array(&points, &[true, true, false], Curve::Linear, DashPattern::default())
            .expect("dash array");
        assert_eq!(dash, "10,0, 4,4, 2,0");
        assert_eq!(dash_array_length(&dash).expect("parse"), 20.0);
    }

    #[test]
    fn remainder_longer_than_dash_keeps_gap() {
        let points = [(0.0, 0.0), (0.0, 14.0)];
        let dash = stroke_dash_array(&points, &[true, false], Curve::Linear, DashPattern::default())
            .expect("dash array");
        assert_eq!(dash, "4,4, 4,2");
    }

    #[test]
    fn step_curve_dashes_from_the_corner_leg() {
        let points = [(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)];
        let certain = [true, true, false];
        let dash = stroke_dash_array(&points, &certain, Curve::StepAfter, DashPattern::default())
            .expect("dash array");
        assert!(dash.starts_with("11,0, 4,4"), "{dash}");
        assert_eq!(dash_array_length(&dash).expect("parse"), 22.0);
    }

    #[test]
    fn dash_array_covers_the_drawn_curve() {
        let points = [(0.0, 0.0), (30.0, 80.0), (60.0, 20.0), (90.0, 95.0)];
        let certain = [true, true, false, false];
        for curve in [Curve::Linear, Curve::StepAfter, Curve::MonotoneX] {
            let dash = stroke_dash_array(&points, &certain, curve, DashPattern::default())
                .expect("dash array");
            assert_relative_eq!(
                dash_array_length(&dash).expect("parse"),
                curve_length(&points, curve),
                epsilon = 0.05
            );
        }
    }
}
