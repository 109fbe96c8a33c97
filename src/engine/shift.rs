//! Time-of-day rules shared by the classifier, hours calculator and report:
//! shift cutoffs, the lunch window, interval overlap and work-week bounds.

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;

use super::error::EngineError;

/// How a check-in time is compared against the expected shift start.
///
/// A check-in at or before the applicable cutoff is on time.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShiftPolicy {
    /// Morning and afternoon shifts. Check-ins before `split_hour` use the
    /// morning cutoff, the rest use the afternoon cutoff.
    Split {
        morning_cutoff: NaiveTime,
        afternoon_cutoff: NaiveTime,
        split_hour: u32,
    },
    /// One shift for the whole day.
    Single { cutoff: NaiveTime },
}

impl Default for ShiftPolicy {
    fn default() -> Self {
        ShiftPolicy::Split {
            morning_cutoff: hm(6, 40),
            afternoon_cutoff: hm(13, 10),
            split_hour: 12,
        }
    }
}

impl ShiftPolicy {
    pub fn split(
        morning_cutoff: NaiveTime,
        afternoon_cutoff: NaiveTime,
        split_hour: u32,
    ) -> Result<Self, EngineError> {
        if split_hour > 23 {
            return Err(EngineError::InvalidValue {
                key: "SHIFT_SPLIT_HOUR",
                reason: format!("{split_hour} is not an hour of the day"),
            });
        }
        Ok(ShiftPolicy::Split {
            morning_cutoff,
            afternoon_cutoff,
            split_hour,
        })
    }

    pub fn single(cutoff: NaiveTime) -> Self {
        ShiftPolicy::Single { cutoff }
    }

    pub fn cutoff_for(&self, at: NaiveTime) -> NaiveTime {
        match *self {
            ShiftPolicy::Split {
                morning_cutoff,
                afternoon_cutoff,
                split_hour,
            } => {
                if at.hour() < split_hour {
                    morning_cutoff
                } else {
                    afternoon_cutoff
                }
            }
            ShiftPolicy::Single { cutoff } => cutoff,
        }
    }
}

/// Daily interval deducted from gross hours.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub struct LunchWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl Default for LunchWindow {
    fn default() -> Self {
        Self {
            start: hm(12, 0),
            end: hm(13, 0),
        }
    }
}

impl LunchWindow {
    pub fn new(start: NaiveTime, end: NaiveTime) -> Result<Self, EngineError> {
        if end < start {
            return Err(EngineError::InvalidValue {
                key: "LUNCH_END",
                reason: format!("lunch ends at {end} before it starts at {start}"),
            });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveTime {
        self.start
    }

    pub fn end(&self) -> NaiveTime {
        self.end
    }

    /// The window on a given calendar day.
    pub fn on(&self, day: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
        (day.and_time(self.start), day.and_time(self.end))
    }
}

/// Fractional hours in a duration, to the second.
///
/// Sum durations first and convert once, so totals stay exact.
pub fn to_hours(duration: Duration) -> f64 {
    duration.num_seconds() as f64 / 3600.0
}

/// Time shared by two intervals, zero when they do not intersect.
pub fn overlap(a: (NaiveDateTime, NaiveDateTime), b: (NaiveDateTime, NaiveDateTime)) -> Duration {
    let start = a.0.max(b.0);
    let end = a.1.min(b.1);
    if end <= start {
        Duration::zero()
    } else {
        end - start
    }
}

/// Monday of the week containing `today`. Sunday belongs to the week that
/// started six days earlier.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let back = u64::from(today.weekday().num_days_from_monday());
    today - Days::new(back)
}

/// Friday of the work week starting on `monday`.
pub fn week_end(monday: NaiveDate) -> NaiveDate {
    monday + Days::new(4)
}

/// Monday through Friday starting at `monday`.
pub fn work_days(monday: NaiveDate) -> [NaiveDate; 5] {
    [0u64, 1, 2, 3, 4].map(|offset| monday + Days::new(offset))
}

/// Parses `HH:MM` or `HH:MM:SS`.
pub fn parse_time_of_day(key: &'static str, value: &str) -> Result<NaiveTime, EngineError> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|e| EngineError::InvalidValue {
            key,
            reason: format!("{value:?} is not a time of day: {e}"),
        })
}

fn hm(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}
