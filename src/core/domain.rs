use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::core::scale::nice_domain;
use crate::error::{ChartError, ChartResult};

/// How a continuous axis domain is derived from data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainOptions {
    /// Pins the lower bound instead of using the data minimum.
    #[serde(default)]
    pub min: Option<f64>,
    /// Pins the upper bound instead of using the data maximum.
    #[serde(default)]
    pub max: Option<f64>,
    #[serde(default)]
    pub include_zero: bool,
    #[serde(default = "default_nice")]
    pub nice: bool,
    /// Final bounds the domain is clamped into.
    #[serde(default)]
    pub clamp: Option<(f64, f64)>,
    #[serde(default = "default_tick_count")]
    pub tick_count: usize,
}

fn default_nice() -> bool {
    true
}

fn default_tick_count() -> usize {
    5
}

impl Default for DomainOptions {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
            include_zero: false,
            nice: true,
            clamp: None,
            tick_count: default_tick_count(),
        }
    }
}

impl DomainOptions {
    #[must_use]
    pub fn zero_based() -> Self {
        Self {
            include_zero: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    #[must_use]
    pub fn with_nice(mut self, nice: bool) -> Self {
        self.nice = nice;
        self
    }

    #[must_use]
    pub fn with_clamp(mut self, lower: f64, upper: f64) -> Self {
        self.clamp = Some((lower, upper));
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        for (name, bound) in [("min", self.min), ("max", self.max)] {
            if bound.is_some_and(|v| !v.is_finite()) {
                return Err(ChartError::InvalidConfig(format!(
                    "domain {name} override must be finite"
                )));
            }
        }
        if let (Some(min), Some(max)) = (self.min, self.max) {
            if min > max {
                return Err(ChartError::InvalidConfig(
                    "domain min override must be <= max override".to_owned(),
                ));
            }
        }
        if let Some((lower, upper)) = self.clamp {
            if !lower.is_finite() || !upper.is_finite() || lower > upper {
                return Err(ChartError::InvalidConfig(
                    "domain clamp bounds must be finite and ordered".to_owned(),
                ));
            }
        }
        if self.tick_count == 0 {
            return Err(ChartError::InvalidConfig(
                "domain tick count must be > 0".to_owned(),
            ));
        }
        Ok(self)
    }
}

/// Min/max over the finite values; `None` when nothing finite remains.
#[must_use]
pub fn numeric_extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut finite = values.into_iter().filter(|v| v.is_finite()).map(OrderedFloat);
    let first = finite.next()?;
    let (min, max) = finite.fold((first, first), |(min, max), v| (min.min(v), max.max(v)));
    Some((min.0, max.0))
}

/// Derives an axis domain from raw values.
///
/// Callers filter out disabled series before passing values in.
#[must_use]
pub fn resolve_domain(values: impl IntoIterator<Item = f64>, options: DomainOptions) -> (f64, f64) {
    let (mut lo, mut hi) = numeric_extent(values).unwrap_or((0.0, 1.0));

    if options.include_zero {
        lo = lo.min(0.0);
        hi = hi.max(0.0);
    }
    if let Some(min) = options.min {
        lo = min;
    }
    if let Some(max) = options.max {
        hi = max;
    }
    if hi < lo {
        // A single override can cross the data extent; collapse onto the override.
        if options.min.is_some() {
            hi = lo;
        } else {
            lo = hi;
        }
    }
    if lo == hi {
        if lo == 0.0 {
            hi = 1.0;
        } else if options.min.is_some() && options.max.is_none() {
            hi = lo + lo.abs();
        } else if options.max.is_some() && options.min.is_none() {
            lo = hi - hi.abs();
        } else if options.min.is_none() {
            lo -= 1.0;
            hi += 1.0;
        }
    }

    if options.nice && lo < hi {
        let (nice_lo, nice_hi) = nice_domain((lo, hi), options.tick_count);
        if options.min.is_none() {
            lo = nice_lo;
        }
        if options.max.is_none() {
            hi = nice_hi;
        }
    }

    if let Some((lower, upper)) = options.clamp {
        lo = lo.clamp(lower, upper);
        hi = hi.clamp(lower, upper);
    }

    (lo, hi)
}
