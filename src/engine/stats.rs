use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use super::error::EngineError;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum WindowBy {
    /// The most recent `size` records, however far apart they are.
    RecordCount,
    /// Records dated within the last `size` calendar days, today included.
    CalendarDays,
}

/// The trailing slice of history the statistics are computed over.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize)]
pub struct StatsWindow {
    pub by: WindowBy,
    pub size: u32,
}

impl Default for StatsWindow {
    fn default() -> Self {
        Self {
            by: WindowBy::RecordCount,
            size: 30,
        }
    }
}

impl StatsWindow {
    pub fn new(by: WindowBy, size: u32) -> Result<Self, EngineError> {
        if size == 0 {
            return Err(EngineError::InvalidValue {
                key: "STATS_WINDOW_SIZE",
                reason: "window size must be at least 1".to_string(),
            });
        }
        Ok(Self { by, size })
    }

    /// Maximum number of records to take, newest first.
    pub fn limit(&self) -> Option<u32> {
        match self.by {
            WindowBy::RecordCount => Some(self.size),
            WindowBy::CalendarDays => None,
        }
    }

    /// Earliest date inside the window.
    pub fn since(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self.by {
            WindowBy::RecordCount => None,
            WindowBy::CalendarDays => {
                Some(today - Days::new(u64::from(self.size.saturating_sub(1))))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, ToSchema)]
pub struct AttendanceStats {
    pub total_days: u32,
    pub present_count: u32,
    pub late_count: u32,
    pub absent_count: u32,
    /// On-time share of attended days.
    pub punctuality: u32,
    /// Attended share of all days in the window.
    pub attendance_rate: u32,
    /// Absent share of all days in the window.
    pub absenteeism: u32,
}

/// Percentages over the given records.
///
/// Only stored records count. A work day with no record at all is not
/// treated as an absence; absences exist only where a record with status
/// `absent` was written.
pub fn compute_stats(window: &[AttendanceRecord]) -> AttendanceStats {
    let mut stats = AttendanceStats {
        total_days: window.len() as u32,
        ..AttendanceStats::default()
    };

    for record in window {
        match record.status {
            AttendanceStatus::Present => stats.present_count += 1,
            AttendanceStatus::Late => stats.late_count += 1,
            AttendanceStatus::Absent => stats.absent_count += 1,
        }
    }

    let attended = stats.present_count + stats.late_count;
    stats.punctuality = percent(stats.present_count, attended);
    stats.attendance_rate = percent(attended, stats.total_days);
    stats.absenteeism = percent(stats.absent_count, stats.total_days);
    stats
}

/// `part / whole` as a whole percent, rounding halves up. An empty whole
/// yields 0.
pub fn percent(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((part * 200 + whole) / (whole * 2)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn records(statuses: &[AttendanceStatus]) -> Vec<AttendanceRecord> {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        statuses
            .iter()
            .enumerate()
            .map(|(i, status)| {
                let date = start + Days::new(i as u64);
                let check_in = date.and_hms_opt(6, 30, 0).unwrap();
                AttendanceRecord::new(i as u64 + 1, 3, date, check_in, None, *status, check_in)
                    .unwrap()
            })
            .collect()
    }

    fn repeat(status: AttendanceStatus, n: usize) -> Vec<AttendanceStatus> {
        vec![status; n]
    }

    #[test]
    fn empty_window_is_all_zero() {
        assert_eq!(compute_stats(&[]), AttendanceStats::default());
    }

    #[test]
    fn mixed_window() {
        let mut statuses = repeat(AttendanceStatus::Present, 7);
        statuses.extend(repeat(AttendanceStatus::Late, 2));
        statuses.push(AttendanceStatus::Absent);

        let stats = compute_stats(&records(&statuses));
        assert_eq!(
            stats,
            AttendanceStats {
                total_days: 10,
                present_count: 7,
                late_count: 2,
                absent_count: 1,
                punctuality: 78,
                attendance_rate: 90,
                absenteeism: 10,
            }
        );
    }

    #[test]
    fn only_absences_gives_zero_punctuality() {
        let stats = compute_stats(&records(&repeat(AttendanceStatus::Absent, 4)));
        assert_eq!(stats.punctuality, 0);
        assert_eq!(stats.attendance_rate, 0);
        assert_eq!(stats.absenteeism, 100);
    }

    #[test]
    fn absences_do_not_penalise_punctuality() {
        let mut statuses = repeat(AttendanceStatus::Present, 3);
        statuses.extend(repeat(AttendanceStatus::Absent, 5));
        let stats = compute_stats(&records(&statuses));
        assert_eq!(stats.punctuality, 100);
    }

    #[test]
    fn rates_need_not_sum_to_one_hundred() {
        let mut statuses = vec![AttendanceStatus::Present];
        statuses.extend(repeat(AttendanceStatus::Absent, 7));
        let stats = compute_stats(&records(&statuses));

        assert_eq!(stats.attendance_rate, 13);
        assert_eq!(stats.absenteeism, 88);
        assert_ne!(stats.attendance_rate + stats.absenteeism, 100);
        assert!(stats.present_count + stats.late_count + stats.absent_count <= stats.total_days);
    }

    #[test]
    fn gaps_between_records_are_not_absences() {
        // three records spread over two weeks
        let mut window = records(&repeat(AttendanceStatus::Present, 3));
        window[1].date = window[1].date + Days::new(6);
        window[2].date = window[2].date + Days::new(12);

        let stats = compute_stats(&window);
        assert_eq!(stats.total_days, 3);
        assert_eq!(stats.absent_count, 0);
        assert_eq!(stats.attendance_rate, 100);
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(7, 9), 78);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(0, 0), 0);
        assert_eq!(percent(5, 5), 100);
    }

    #[test]
    fn window_bounds() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 30).unwrap();

        let by_count = StatsWindow::default();
        assert_eq!(by_count.limit(), Some(30));
        assert_eq!(by_count.since(today), None);

        let by_days = StatsWindow::new(WindowBy::CalendarDays, 30).unwrap();
        assert_eq!(by_days.limit(), None);
        assert_eq!(by_days.since(today), NaiveDate::from_ymd_opt(2026, 1, 1));

        let just_today = StatsWindow::new(WindowBy::CalendarDays, 1).unwrap();
        assert_eq!(just_today.since(today), Some(today));
    }

    #[test]
    fn window_rejects_zero_size() {
        assert!(StatsWindow::new(WindowBy::RecordCount, 0).is_err());
    }

    #[test]
    fn window_by_parses_query_values() {
        assert_eq!(WindowBy::from_str("calendar_days").unwrap(), WindowBy::CalendarDays);
        assert_eq!(WindowBy::RecordCount.to_string(), "record_count");
    }
}
