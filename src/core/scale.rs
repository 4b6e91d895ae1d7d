use serde::{Deserialize, Serialize};

use crate::error::{ChartError, ChartResult};

/// Continuous numeric scale mapping a value domain onto a pixel range.
///
/// Scales are immutable: every render pass builds fresh ones.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
    range_start: f64,
    range_end: f64,
    clamp: bool,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> ChartResult<Self> {
        if !domain.0.is_finite() || !domain.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale domain must be finite".to_owned(),
            ));
        }
        if !range.0.is_finite() || !range.1.is_finite() {
            return Err(ChartError::InvalidData(
                "scale range must be finite".to_owned(),
            ));
        }

        Ok(Self {
            domain_start: domain.0,
            domain_end: domain.1,
            range_start: range.0,
            range_end: range.1,
            clamp: false,
        })
    }

    #[must_use]
    pub fn with_clamp(mut self, clamp: bool) -> Self {
        self.clamp = clamp;
        self
    }

    /// Extends the domain outward to round multiples of a 1/2/5 tick step.
    #[must_use]
    pub fn nice(self, tick_count: usize) -> Self {
        let (start, end) = nice_domain((self.domain_start, self.domain_end), tick_count);
        Self {
            domain_start: start,
            domain_end: end,
            ..self
        }
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        (self.range_start, self.range_end)
    }

    #[must_use]
    pub fn is_clamped(self) -> bool {
        self.clamp
    }

    #[must_use]
    pub fn scale(self, value: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        if span == 0.0 {
            return (self.range_start + self.range_end) * 0.5;
        }

        let mut normalized = (value - self.domain_start) / span;
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        self.range_start + normalized * (self.range_end - self.range_start)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        let span = self.range_end - self.range_start;
        if span == 0.0 {
            return (self.domain_start + self.domain_end) * 0.5;
        }

        let mut normalized = (pixel - self.range_start) / span;
        if self.clamp {
            normalized = normalized.clamp(0.0, 1.0);
        }
        self.domain_start + normalized * (self.domain_end - self.domain_start)
    }

    /// Round tick values inside the domain, roughly `count` of them.
    #[must_use]
    pub fn ticks(self, count: usize) -> Vec<f64> {
        ticks((self.domain_start, self.domain_end), count)
    }
}

/// Tick increment for `count` ticks over `[start, stop]`, snapped to 1, 2 or 5 × 10^k.
///
/// A positive result is the step itself; a negative result `-n` means the
/// step is `1 / n`, which keeps sub-unit ticks exact.
#[must_use]
pub fn tick_increment(start: f64, stop: f64, count: usize) -> f64 {
    let count = count.max(1) as f64;
    let step = (stop - start) / count;
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }

    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= 50f64.sqrt() {
        10.0
    } else if error >= 10f64.sqrt() {
        5.0
    } else if error >= 2f64.sqrt() {
        2.0
    } else {
        1.0
    };

    if power >= 0.0 {
        factor * 10f64.powf(power)
    } else {
        -(10f64.powf(-power) / factor)
    }
}

/// Absolute tick step for `count` ticks over `[start, stop]`.
#[must_use]
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    let (lo, hi) = ordered(start, stop);
    let increment = tick_increment(lo, hi, count);
    if increment < 0.0 {
        -1.0 / increment
    } else {
        increment
    }
}

#[must_use]
pub fn ticks(domain: (f64, f64), count: usize) -> Vec<f64> {
    if count == 0 || !domain.0.is_finite() || !domain.1.is_finite() {
        return Vec::new();
    }
    if domain.0 == domain.1 {
        return vec![domain.0];
    }

    let reversed = domain.1 < domain.0;
    let (lo, hi) = ordered(domain.0, domain.1);
    let increment = tick_increment(lo, hi, count);
    if increment == 0.0 {
        return Vec::new();
    }

    let mut values = if increment > 0.0 {
        let first = (lo / increment).ceil() as i64;
        let last = (hi / increment).floor() as i64;
        (first..=last).map(|i| i as f64 * increment).collect::<Vec<_>>()
    } else {
        let inverse = -increment;
        let first = (lo * inverse).ceil() as i64;
        let last = (hi * inverse).floor() as i64;
        (first..=last).map(|i| i as f64 / inverse).collect::<Vec<_>>()
    };

    if reversed {
        values.reverse();
    }
    values
}

/// Extends `domain` outward to multiples of the tick step for `count` ticks.
#[must_use]
pub fn nice_domain(domain: (f64, f64), count: usize) -> (f64, f64) {
    if !domain.0.is_finite() || !domain.1.is_finite() || domain.0 == domain.1 {
        return domain;
    }

    let reversed = domain.1 < domain.0;
    let (mut lo, mut hi) = ordered(domain.0, domain.1);
    let mut previous = None;
    // Converges in two or three passes; the bound guards against float oscillation.
    for _ in 0..10 {
        let increment = tick_increment(lo, hi, count);
        if increment == 0.0 || previous == Some(increment) {
            break;
        }
        if increment > 0.0 {
            lo = (lo / increment).floor() * increment;
            hi = (hi / increment).ceil() * increment;
        } else {
            lo = (lo * -increment).floor() / -increment;
            hi = (hi * -increment).ceil() / -increment;
        }
        previous = Some(increment);
    }

    if reversed { (hi, lo) } else { (lo, hi) }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

#[cfg(test)]
mod tests {
    use super::{nice_domain, tick_step, ticks};

    #[test]
    fn nice_domain_rounds_outward() {
        assert_eq!(nice_domain((0.3, 9.6), 10), (0.0, 10.0));
        assert_eq!(nice_domain((12.0, 87.0), 5), (0.0, 100.0));
    }

    #[test]
    fn nice_domain_keeps_reversed_orientation() {
        assert_eq!(nice_domain((9.6, 0.3), 10), (10.0, 0.0));
    }

    #[test]
    fn sub_unit_ticks_are_exact() {
        assert_eq!(ticks((0.0, 1.0), 5), vec![0.0, 0.2, 0.4, 0.6, 0.8, 1.0]);
        assert_eq!(tick_step(0.0, 1.0, 5), 0.2);
    }

    #[test]
    fn flat_domain_produces_single_tick() {
        assert_eq!(ticks((3.0, 3.0), 5), vec![3.0]);
    }
}
