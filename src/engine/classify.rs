use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use super::shift::ShiftPolicy;
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

/// Where an employee stands today, and therefore what the kiosk does next.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DailyStatus {
    /// No record yet; next action is check-in.
    Pending,
    /// Open record; next action is check-out.
    Working,
    /// Closed record; nothing left to do today.
    Completed,
}

/// On time when `now` is at or before the applicable cutoff, late otherwise.
/// Never yields `Absent`.
pub fn classify_check_in(now: NaiveDateTime, policy: &ShiftPolicy) -> AttendanceStatus {
    let at = now.time();
    if at <= policy.cutoff_for(at) {
        AttendanceStatus::Present
    } else {
        AttendanceStatus::Late
    }
}

/// The record that decides the employee's status for the day.
///
/// Duplicates should not exist, but when they do the most recently created
/// one wins; ties on `created_at` go to the higher id.
pub fn current_record(
    employee_id: u64,
    todays_records: &[AttendanceRecord],
) -> Option<&AttendanceRecord> {
    todays_records
        .iter()
        .filter(|r| r.employee_id == employee_id)
        .max_by_key(|r| (r.created_at, r.id))
}

pub fn project_daily_status(employee_id: u64, todays_records: &[AttendanceRecord]) -> DailyStatus {
    match current_record(employee_id, todays_records) {
        None => DailyStatus::Pending,
        Some(r) if r.is_open() => DailyStatus::Working,
        Some(_) => DailyStatus::Completed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 5)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn record(
        id: u64,
        employee_id: u64,
        created: NaiveDateTime,
        check_out: Option<NaiveDateTime>,
    ) -> AttendanceRecord {
        AttendanceRecord::new(
            id,
            employee_id,
            created.date(),
            created,
            check_out,
            AttendanceStatus::Present,
            created,
        )
        .unwrap()
    }

    #[test]
    fn morning_cutoff_is_inclusive() {
        let policy = ShiftPolicy::default();
        assert_eq!(classify_check_in(at(6, 40, 0), &policy), AttendanceStatus::Present);
        assert_eq!(classify_check_in(at(6, 41, 0), &policy), AttendanceStatus::Late);
        assert_eq!(classify_check_in(at(6, 40, 1), &policy), AttendanceStatus::Late);
    }

    #[test]
    fn afternoon_cutoff_is_inclusive() {
        let policy = ShiftPolicy::default();
        assert_eq!(classify_check_in(at(12, 5, 0), &policy), AttendanceStatus::Present);
        assert_eq!(classify_check_in(at(13, 10, 0), &policy), AttendanceStatus::Present);
        assert_eq!(classify_check_in(at(13, 11, 0), &policy), AttendanceStatus::Late);
    }

    #[test]
    fn late_morning_arrival_is_late_not_afternoon() {
        let policy = ShiftPolicy::default();
        assert_eq!(classify_check_in(at(11, 30, 0), &policy), AttendanceStatus::Late);
    }

    #[test]
    fn single_cutoff_policy() {
        let policy = ShiftPolicy::single(NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(classify_check_in(at(9, 0, 0), &policy), AttendanceStatus::Present);
        assert_eq!(classify_check_in(at(9, 1, 0), &policy), AttendanceStatus::Late);
        assert_eq!(classify_check_in(at(14, 0, 0), &policy), AttendanceStatus::Late);
    }

    #[test]
    fn projects_the_three_states() {
        let records = vec![
            record(1, 10, at(6, 30, 0), None),
            record(2, 11, at(6, 35, 0), Some(at(15, 0, 0))),
        ];

        assert_eq!(project_daily_status(10, &records), DailyStatus::Working);
        assert_eq!(project_daily_status(11, &records), DailyStatus::Completed);
        assert_eq!(project_daily_status(12, &records), DailyStatus::Pending);
        assert_eq!(project_daily_status(12, &[]), DailyStatus::Pending);
    }

    #[test]
    fn most_recent_duplicate_wins() {
        let closed = record(1, 10, at(6, 30, 0), Some(at(9, 0, 0)));
        let reopened = record(2, 10, at(9, 5, 0), None);

        assert_eq!(
            project_daily_status(10, &[closed.clone(), reopened.clone()]),
            DailyStatus::Working
        );
        assert_eq!(
            project_daily_status(10, &[reopened.clone(), closed.clone()]),
            DailyStatus::Working
        );
        assert_eq!(current_record(10, &[reopened, closed]).map(|r| r.id), Some(2));
    }

    #[test]
    fn equal_creation_times_break_on_id() {
        let a = record(3, 10, at(6, 30, 0), None);
        let b = record(4, 10, at(6, 30, 0), Some(at(7, 0, 0)));

        assert_eq!(project_daily_status(10, &[a.clone(), b.clone()]), DailyStatus::Completed);
        assert_eq!(project_daily_status(10, &[b, a]), DailyStatus::Completed);
    }
}
