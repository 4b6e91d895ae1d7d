use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Padding applied between and around bands, as fractions of the step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPadding {
    pub inner: f64,
    pub outer: f64,
}

impl Default for BandPadding {
    fn default() -> Self {
        Self {
            inner: 0.2,
            outer: 0.1,
        }
    }
}

/// Ordinal scale that splits a pixel range into equal bands, one per label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandScale {
    domain: Vec<String>,
    range_start: f64,
    range_end: f64,
    padding: BandPadding,
    align: f64,
    step: f64,
    bandwidth: f64,
    offset: f64,
}

impl BandScale {
    /// Builds a band scale; duplicate labels keep their first position.
    pub fn new<I, S>(domain: I, range: (f64, f64), padding: BandPadding) -> ChartResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "band range must be finite".to_owned(),
            ));
        }
        if !(0.0..1.0).contains(&padding.inner) || !padding.outer.is_finite() || padding.outer < 0.0
        {
            return Err(ChartError::InvalidData(
                "band padding must be inner in [0, 1) and outer >= 0".to_owned(),
            ));
        }

        let mut labels: Vec<String> = Vec::new();
        for label in domain {
            let label = label.into();
            if !labels.contains(&label) {
                labels.push(label);
            }
        }

        let mut scale = Self {
            domain: labels,
            range_start: range.0,
            range_end: range.1,
            padding,
            align: 0.5,
            step: 0.0,
            bandwidth: 0.0,
            offset: range.0,
        };
        scale.rescale();
        Ok(scale)
    }

    fn rescale(&mut self) {
        let n = self.domain.len() as f64;
        let reversed = self.range_end < self.range_start;
        let (start, stop) = if reversed {
            (self.range_end, self.range_start)
        } else {
            (self.range_start, self.range_end)
        };
        let span = stop - start;

        let step = span / (n - self.padding.inner + self.padding.outer * 2.0).max(1.0);
        let offset = start + (span - step * (n - self.padding.inner)) * self.align;
        self.step = step;
        self.bandwidth = step * (1.0 - self.padding.inner);
        self.offset = if reversed {
            // Band origin is measured from the far end when the range runs backwards.
            stop - (offset - start) - self.bandwidth
        } else {
            offset
        };
    }

    #[must_use]
    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    #[must_use]
    pub fn range(&self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn step(&self) -> f64 {
        self.step
    }

    #[must_use]
    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.domain.iter().position(|entry| entry == label)
    }

    /// Start coordinate of the band for `label`.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<f64> {
        let index = self.index_of(label)? as f64;
        if self.range_end < self.range_start {
            Some(self.offset - index * self.step)
        } else {
            Some(self.offset + index * self.step)
        }
    }

    /// Center coordinate of the band for `label`.
    #[must_use]
    pub fn center(&self, label: &str) -> Option<f64> {
        self.position(label).map(|start| start + self.bandwidth * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::{BandPadding, BandScale};

    #[test]
    fn band_layout_without_padding_splits_range_evenly() {
        let scale = BandScale::new(
            ["a", "b", "c", "d"],
            (0.0, 400.0),
            BandPadding {
                inner: 0.0,
                outer: 0.0,
            },
        )
        .expect("band scale");

        assert_eq!(scale.step(), 100.0);
        assert_eq!(scale.bandwidth(), 100.0);
        assert_eq!(scale.position("c"), Some(200.0));
        assert_eq!(scale.position("z"), None);
    }

    #[test]
    fn duplicates_keep_first_position() {
        let scale = BandScale::new(["a", "b", "a"], (0.0, 100.0), BandPadding::default())
            .expect("band scale");
        assert_eq!(scale.domain().len(), 2);
    }
}
