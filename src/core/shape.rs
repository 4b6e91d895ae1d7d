use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::core::dash::segment_length;
use crate::core::format::format_svg_number;

/// Interpolation used between consecutive defined points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Curve {
    #[default]
    Linear,
    /// Horizontal run to the next x, then vertical jump.
    StepAfter,
    /// Monotone cubic in x (Fritsch-Carlson tangents).
    MonotoneX,
}

pub type PathPoint = (f64, f64);

fn push_move(d: &mut String, point: PathPoint) {
    let _ = write!(
        d,
        "M{},{}",
        format_svg_number(point.0),
        format_svg_number(point.1)
    );
}

fn push_line(d: &mut String, point: PathPoint) {
    let _ = write!(
        d,
        "L{},{}",
        format_svg_number(point.0),
        format_svg_number(point.1)
    );
}

/// Splits `points` into runs of consecutive defined points.
fn defined_runs(points: &[Option<PathPoint>]) -> Vec<Vec<PathPoint>> {
    let mut runs = Vec::new();
    let mut current = Vec::new();
    for point in points {
        match point {
            Some(p) if p.0.is_finite() && p.1.is_finite() => current.push(*p),
            _ => {
                if !current.is_empty() {
                    runs.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}

/// Appends the curve through `run` to `d`, assuming the pen is at `run[0]`.
fn push_curve(d: &mut String, run: &[PathPoint], curve: Curve) {
    match curve {
        Curve::Linear => {
            for point in run.iter().skip(1) {
                push_line(d, *point);
            }
        }
        Curve::StepAfter => {
            for pair in run.windows(2) {
                push_line(d, (pair[1].0, pair[0].1));
                push_line(d, pair[1]);
            }
        }
        Curve::MonotoneX => push_monotone(d, run),
    }
}

fn push_monotone(d: &mut String, run: &[PathPoint]) {
    if run.len() < 3 {
        for point in run.iter().skip(1) {
            push_line(d, *point);
        }
        return;
    }

    for [_, c1, c2, end] in monotone_segments(run) {
        let _ = write!(
            d,
            "C{},{},{},{},{},{}",
            format_svg_number(c1.0),
            format_svg_number(c1.1),
            format_svg_number(c2.0),
            format_svg_number(c2.1),
            format_svg_number(end.0),
            format_svg_number(end.1)
        );
    }
}

/// Cubic Bezier pieces `[start, control, control, end]` of the monotone
/// curve through `run`. Needs at least three points.
fn monotone_segments(run: &[PathPoint]) -> Vec<[PathPoint; 4]> {
    let n = run.len();
    let mut secants = Vec::with_capacity(n - 1);
    for pair in run.windows(2) {
        let dx = pair[1].0 - pair[0].0;
        secants.push(if dx == 0.0 {
            0.0
        } else {
            (pair[1].1 - pair[0].1) / dx
        });
    }

    let mut tangents = vec![0.0; n];
    tangents[0] = secants[0];
    tangents[n - 1] = secants[n - 2];
    for i in 1..n - 1 {
        tangents[i] = if secants[i - 1] * secants[i] <= 0.0 {
            0.0
        } else {
            (secants[i - 1] + secants[i]) * 0.5
        };
    }
    for i in 0..n - 1 {
        if secants[i] == 0.0 {
            tangents[i] = 0.0;
            tangents[i + 1] = 0.0;
            continue;
        }
        let a = tangents[i] / secants[i];
        let b = tangents[i + 1] / secants[i];
        let h = a.hypot(b);
        if h > 3.0 {
            let t = 3.0 / h;
            tangents[i] = t * a * secants[i];
            tangents[i + 1] = t * b * secants[i];
        }
    }

    (0..n - 1)
        .map(|i| {
            let (x0, y0) = run[i];
            let (x1, y1) = run[i + 1];
            let third = (x1 - x0) / 3.0;
            [
                (x0, y0),
                (x0 + third, y0 + third * tangents[i]),
                (x1 - third, y1 - third * tangents[i + 1]),
                (x1, y1),
            ]
        })
        .collect()
}

const CUBIC_LENGTH_STEPS: usize = 64;

/// Arc length of a cubic Bezier, summed over evenly spaced samples.
fn cubic_length([p0, p1, p2, p3]: &[PathPoint; 4]) -> f64 {
    let mut length = 0.0;
    let mut previous = *p0;
    for step in 1..=CUBIC_LENGTH_STEPS {
        let t = step as f64 / CUBIC_LENGTH_STEPS as f64;
        let u = 1.0 - t;
        let (a, b, c, e) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
        let point = (
            a * p0.0 + b * p1.0 + c * p2.0 + e * p3.0,
            a * p0.1 + b * p1.1 + c * p2.1 + e * p3.1,
        );
        length += segment_length(previous, point);
        previous = point;
    }
    length
}

/// SVG path data through the defined points; `None` entries break the line.
#[must_use]
pub fn line_path(points: &[Option<PathPoint>], curve: Curve) -> String {
    let mut d = String::new();
    for run in defined_runs(points) {
        push_move(&mut d, run[0]);
        if run.len() == 1 {
            // A lone defined point still needs a visible stroke cap.
            push_line(&mut d, run[0]);
            continue;
        }
        push_curve(&mut d, &run, curve);
    }
    d
}

/// Closed SVG area between `top` and `bottom` edges sharing indices.
///
/// An index undefined on either edge breaks the area into separate pieces.
#[must_use]
pub fn area_path(top: &[Option<PathPoint>], bottom: &[Option<PathPoint>], curve: Curve) -> String {
    let paired: Vec<Option<(PathPoint, PathPoint)>> = top
        .iter()
        .zip(bottom.iter())
        .map(|(t, b)| match (t, b) {
            (Some(t), Some(b))
                if t.0.is_finite() && t.1.is_finite() && b.0.is_finite() && b.1.is_finite() =>
            {
                Some((*t, *b))
            }
            _ => None,
        })
        .collect();

    let mut d = String::new();
    let mut start = 0;
    while start < paired.len() {
        if paired[start].is_none() {
            start += 1;
            continue;
        }
        let mut end = start;
        while end < paired.len() && paired[end].is_some() {
            end += 1;
        }

        let pieces: Vec<(PathPoint, PathPoint)> = paired[start..end].iter().flatten().copied().collect();
        let upper: Vec<PathPoint> = pieces.iter().map(|(t, _)| *t).collect();
        let mut lower: Vec<PathPoint> = pieces.iter().map(|(_, b)| *b).collect();
        lower.reverse();

        push_move(&mut d, upper[0]);
        push_curve(&mut d, &upper, curve);
        push_line(&mut d, lower[0]);
        push_curve(&mut d, &lower, curve);
        d.push('Z');
        start = end;
    }
    d
}

/// Closed polygon through `points`.
#[must_use]
pub fn polygon_path(points: &[PathPoint]) -> String {
    let mut d = String::new();
    let mut iter = points.iter().filter(|p| p.0.is_finite() && p.1.is_finite());
    let Some(first) = iter.next() else {
        return d;
    };
    push_move(&mut d, *first);
    for point in iter {
        push_line(&mut d, *point);
    }
    d.push('Z');
    d
}

/// Quad linking segment `a` (right edge of one column) to segment `b`
/// (left edge of the next column). Each edge is `(x, y_top, y_bottom)`.
#[must_use]
pub fn ribbon_path(a: (f64, f64, f64), b: (f64, f64, f64)) -> String {
    let mut d = String::new();
    let mid = (a.0 + b.0) * 0.5;
    push_move(&mut d, (a.0, a.1));
    let _ = write!(
        d,
        "C{},{},{},{},{},{}",
        format_svg_number(mid),
        format_svg_number(a.1),
        format_svg_number(mid),
        format_svg_number(b.1),
        format_svg_number(b.0),
        format_svg_number(b.1)
    );
    push_line(&mut d, (b.0, b.2));
    let _ = write!(
        d,
        "C{},{},{},{},{},{}",
        format_svg_number(mid),
        format_svg_number(b.2),
        format_svg_number(mid),
        format_svg_number(a.2),
        format_svg_number(a.0),
        format_svg_number(a.2)
    );
    d.push('Z');
    d
}

/// Drawn length of each segment `i -> i + 1` of `run` under `curve`.
///
/// These are the lengths the stroke actually covers, so a dash array built
/// from them lines up with the rendered path.
#[must_use]
pub fn segment_lengths(run: &[PathPoint], curve: Curve) -> Vec<f64> {
    match curve {
        Curve::MonotoneX if run.len() >= 3 => {
            monotone_segments(run).iter().map(cubic_length).collect()
        }
        Curve::StepAfter => run
            .windows(2)
            .map(|pair| {
                let corner = (pair[1].0, pair[0].1);
                segment_length(pair[0], corner) + segment_length(corner, pair[1])
            })
            .collect(),
        Curve::Linear | Curve::MonotoneX => run
            .windows(2)
            .map(|pair| segment_length(pair[0], pair[1]))
            .collect(),
    }
}

/// Length of the curve through one run of defined points.
#[must_use]
pub fn curve_length(run: &[PathPoint], curve: Curve) -> f64 {
    segment_lengths(run, curve).iter().sum()
}

/// Stroke length of [`line_path`] for the same points and curve.
#[must_use]
pub fn path_length(points: &[Option<PathPoint>], curve: Curve) -> f64 {
    defined_runs(points)
        .iter()
        .map(|run| curve_length(run, curve))
        .sum()
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::{
        Curve, area_path, curve_length, line_path, path_length, polygon_path, segment_lengths,
    };

    #[test]
    fn gaps_split_line_into_subpaths() {
        let d = line_path(
            &[Some((0.0, 0.0)), Some((10.0, 5.0)), None, Some((30.0, 1.5))],
            Curve::Linear,
        );
        assert_eq!(d, "M0,0L10,5M30,1.5L30,1.5");
    }

    #[test]
    fn step_curve_emits_horizontal_then_vertical() {
        let d = line_path(&[Some((0.0, 0.0)), Some((10.0, 5.0))], Curve::StepAfter);
        assert_eq!(d, "M0,0L10,0L10,5");
    }

    #[test]
    fn area_closes_against_bottom_edge() {
        let d = area_path(
            &[Some((0.0, 1.0)), Some((10.0, 2.0))],
            &[Some((0.0, 5.0)), Some((10.0, 5.0))],
            Curve::Linear,
        );
        assert_eq!(d, "M0,1L10,2L10,5L0,5Z");
    }

    #[test]
    fn polygon_and_length_helpers() {
        assert_eq!(polygon_path(&[(0.0, 0.0), (3.0, 0.0), (3.0, 4.0)]), "M0,0L3,0L3,4Z");
        assert_eq!(curve_length(&[(0.0, 0.0), (3.0, 4.0), (3.0, 6.0)], Curve::Linear), 7.0);
    }

    #[test]
    fn step_segments_measure_both_legs() {
        let run = [(0.0, 0.0), (1.0, 10.0), (2.0, 0.0)];
        assert_eq!(segment_lengths(&run, Curve::StepAfter), vec![11.0, 11.0]);
        assert_eq!(segment_lengths(&run, Curve::Linear)[0], 1.0f64.hypot(10.0));
    }

    #[test]
    fn monotone_length_follows_the_cubic() {
        let straight = [(0.0, 0.0), (10.0, 10.0), (20.0, 20.0)];
        assert_relative_eq!(
            curve_length(&straight, Curve::MonotoneX),
            20.0 * 2.0f64.sqrt(),
            max_relative = 1e-9
        );

        let bent = [(0.0, 0.0), (10.0, 40.0), (20.0, 0.0)];
        let chords = curve_length(&bent, Curve::Linear);
        let curved = curve_length(&bent, Curve::MonotoneX);
        // Bounded by the chords below and the control polygon above.
        assert!(curved > chords && curved < 88.0, "curved length {curved}");
    }

    #[test]
    fn path_length_skips_gaps() {
        let points = [
            Some((0.0, 0.0)),
            Some((3.0, 4.0)),
            None,
            Some((10.0, 0.0)),
            Some((10.0, 2.0)),
        ];
        assert_eq!(path_length(&points, Curve::Linear), 7.0);
        assert_eq!(path_length(&[Some((1.0, 1.0))], Curve::StepAfter), 0.0);
    }
}
