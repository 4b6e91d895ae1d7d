use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::core::AxisType;
use crate::core::primitives::{unix_seconds_to_datetime, year_month_to_unix_seconds};
use crate::core::scale::{LinearScale, nice_domain, ticks};
use crate::error::{ChartError, ChartResult};

const YEAR_STEPS: [i32; 8] = [1, 2, 5, 10, 20, 50, 100, 250];
const MONTH_STEPS: [i32; 5] = [1, 2, 3, 6, 12];

/// Time axis model over unix seconds with calendar-aware ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeScale {
    linear: LinearScale,
    axis_type: AxisType,
}

impl TimeScale {
    pub fn new(domain: (f64, f64), range: (f64, f64), axis_type: AxisType) -> ChartResult<Self> {
        Ok(Self {
            linear: LinearScale::new(domain, range)?,
            axis_type,
        })
    }

    /// Fits the domain to the min/max of `times`; non-finite entries are ignored.
    pub fn from_times(
        times: impl IntoIterator<Item = f64>,
        range: (f64, f64),
        axis_type: AxisType,
    ) -> ChartResult<Self> {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for time in times.into_iter().filter(|t| t.is_finite()) {
            min = min.min(time);
            max = max.max(time);
        }
        if !min.is_finite() || !max.is_finite() {
            return Err(ChartError::InvalidData(
                "time scale requires at least one finite time".to_owned(),
            ));
        }
        Self::new((min, max), range, axis_type)
    }

    #[must_use]
    pub fn axis_type(self) -> AxisType {
        self.axis_type
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        self.linear.domain()
    }

    #[must_use]
    pub fn range(self) -> (f64, f64) {
        self.linear.range()
    }

    #[must_use]
    pub fn scale(self, time: f64) -> f64 {
        self.linear.scale(time)
    }

    #[must_use]
    pub fn invert(self, pixel: f64) -> f64 {
        self.linear.invert(pixel)
    }

    /// Rounds the domain outward: whole years, whole months, or nice numbers.
    pub fn nice(self, count: usize) -> ChartResult<Self> {
        let (start, end) = self.domain();
        let domain = match self.axis_type {
            AxisType::Number => nice_domain((start, end), count),
            AxisType::DateAnnual => {
                let first = unix_seconds_to_datetime(start.min(end))?;
                let last = unix_seconds_to_datetime(start.max(end))?;
                let last_year = if last.month() == 1 && last.day() == 1 && is_midnight(last) {
                    last.year()
                } else {
                    last.year() + 1
                };
                (
                    year_month_to_unix_seconds(first.year(), 1)?,
                    year_month_to_unix_seconds(last_year, 1)?,
                )
            }
            AxisType::DateMonthly => {
                let first = unix_seconds_to_datetime(start.min(end))?;
                let last = unix_seconds_to_datetime(start.max(end))?;
                let (mut year, mut month) = (last.year(), last.month());
                if !(last.day() == 1 && is_midnight(last)) {
                    (year, month) = next_month(year, month);
                }
                (
                    year_month_to_unix_seconds(first.year(), first.month())?,
                    year_month_to_unix_seconds(year, month)?,
                )
            }
        };
        Self::new(domain, self.range(), self.axis_type)
    }

    /// Tick times inside the domain, roughly `count` of them.
    pub fn ticks(self, count: usize) -> ChartResult<Vec<f64>> {
        if count == 0 {
            return Ok(Vec::new());
        }
        let (start, end) = self.domain();
        let (lo, hi) = if start <= end {
            (start, end)
        } else {
            (end, start)
        };

        match self.axis_type {
            AxisType::Number => Ok(ticks((lo, hi), count)),
            AxisType::DateAnnual => {
                let first = unix_seconds_to_datetime(lo)?;
                let last = unix_seconds_to_datetime(hi)?;
                let span_years = (last.year() - first.year()).max(0);
                let step = pick_step(&YEAR_STEPS, span_years, count);
                let mut year = first.year().div_euclid(step) * step;
                let mut out = Vec::new();
                while year <= last.year() {
                    let time = year_month_to_unix_seconds(year, 1)?;
                    if time >= lo && time <= hi {
                        out.push(time);
                    }
                    year += step;
                }
                Ok(out)
            }
            AxisType::DateMonthly => {
                let first = unix_seconds_to_datetime(lo)?;
                let last = unix_seconds_to_datetime(hi)?;
                let first_index = first.year() * 12 + first.month0() as i32;
                let last_index = last.year() * 12 + last.month0() as i32;
                let span_months = (last_index - first_index).max(0);
                let step = pick_step(&MONTH_STEPS, span_months, count);
                if span_months / step > (count as i32) * 2 && step == 12 {
                    // Multi-decade monthly data falls back to yearly steps.
                    let years = Self {
                        axis_type: AxisType::DateAnnual,
                        ..self
                    };
                    return years.ticks(count);
                }

                let mut index = first_index.div_euclid(step) * step;
                let mut out = Vec::new();
                while index <= last_index {
                    let year = index.div_euclid(12);
                    let month = index.rem_euclid(12) as u32 + 1;
                    let time = year_month_to_unix_seconds(year, month)?;
                    if time >= lo && time <= hi {
                        out.push(time);
                    }
                    index += step;
                }
                Ok(out)
            }
        }
    }
}

fn pick_step(steps: &[i32], span: i32, count: usize) -> i32 {
    let target = (span as f64 / count.max(1) as f64).max(1.0);
    steps
        .iter()
        .copied()
        .find(|step| f64::from(*step) >= target)
        .unwrap_or_else(|| steps[steps.len() - 1])
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

fn is_midnight(time: chrono::DateTime<chrono::Utc>) -> bool {
    time.timestamp() % 86_400 == 0
}

#[cfg(test)]
mod tests {
    use super::TimeScale;
    use crate::core::AxisType;
    use crate::core::primitives::{year_month_to_unix_seconds, year_to_unix_seconds};

    #[test]
    fn annual_ticks_land_on_year_starts() {
        let start = year_to_unix_seconds(2010).expect("year");
        let end = year_to_unix_seconds(2015).expect("year");
        let scale = TimeScale::new((start, end), (0.0, 500.0), AxisType::DateAnnual)
            .expect("time scale");

        let ticks = scale.ticks(10).expect("ticks");
        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0], start);
        assert_eq!(ticks[5], end);
    }

    #[test]
    fn monthly_ticks_respect_step() {
        let start = year_month_to_unix_seconds(2020, 1).expect("month");
        let end = year_month_to_unix_seconds(2020, 12).expect("month");
        let scale = TimeScale::new((start, end), (0.0, 500.0), AxisType::DateMonthly)
            .expect("time scale");

        let ticks = scale.ticks(4).expect("ticks");
        // 11 months over 4 ticks picks a quarterly step.
        assert_eq!(ticks.len(), 4);
        assert_eq!(
            ticks[1],
            year_month_to_unix_seconds(2020, 4).expect("month")
        );
    }

    #[test]
    fn annual_nice_extends_to_next_year() {
        let start = year_month_to_unix_seconds(2010, 6).expect("month");
        let end = year_month_to_unix_seconds(2012, 3).expect("month");
        let scale = TimeScale::new((start, end), (0.0, 100.0), AxisType::DateAnnual)
            .expect("time scale")
            .nice(5)
            .expect("nice");
        assert_eq!(
            scale.domain(),
            (
                year_to_unix_seconds(2010).expect("year"),
                year_to_unix_seconds(2013).expect("year")
            )
        );
    }
}
