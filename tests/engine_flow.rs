use chrono::{Days, NaiveDate, NaiveDateTime};
use metalflow_attendance::engine::{
    Clock, DailyStatus, EngineError, FixedClock, LunchWindow, ShiftPolicy, StatsWindow,
    build_weekly_report, classify_check_in, compute_stats, project_daily_status,
};
use metalflow_attendance::model::attendance::{AttendanceRecord, AttendanceStatus};
use metalflow_attendance::model::employee::{Employee, EmployeeStatus};

fn at(date: NaiveDate, h: u32, m: u32) -> NaiveDateTime {
    date.and_hms_opt(h, m, 0).unwrap()
}

fn employee(id: u64, first: &str, status: EmployeeStatus) -> Employee {
    Employee {
        id,
        first_name: first.to_string(),
        last_name: "Pereyra".to_string(),
        role: "Tornero".to_string(),
        status,
        created_at: None,
    }
}

/// Simulates a kiosk check-in against an in-memory day.
fn check_in(
    clock: &impl Clock,
    policy: &ShiftPolicy,
    employee_id: u64,
    next_id: u64,
) -> AttendanceRecord {
    let now = clock.now();
    AttendanceRecord::new(
        next_id,
        employee_id,
        now.date(),
        now,
        None,
        classify_check_in(now, policy),
        now,
    )
    .unwrap()
}

#[test]
fn a_week_on_the_shop_floor() {
    let policy = ShiftPolicy::default();
    let lunch = LunchWindow::default();
    let monday = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
    let tuesday = monday + Days::new(1);
    let wednesday = monday + Days::new(2);

    // Monday: on time, full day
    let mut mon = check_in(&FixedClock(at(monday, 6, 40)), &policy, 1, 1);
    assert_eq!(mon.status, AttendanceStatus::Present);
    assert_eq!(project_daily_status(1, std::slice::from_ref(&mon)), DailyStatus::Working);
    mon.check_out_at(at(monday, 15, 40)).unwrap();
    assert_eq!(project_daily_status(1, std::slice::from_ref(&mon)), DailyStatus::Completed);
    assert_eq!(mon.net_hours(&lunch).unwrap(), 8.0);

    // A second check-out is refused and leaves the record alone
    assert!(matches!(
        mon.check_out_at(at(monday, 18, 0)),
        Err(EngineError::AlreadyCheckedOut { record_id: 1 })
    ));
    assert_eq!(mon.check_out, Some(at(monday, 15, 40)));

    // Tuesday: one minute past the morning cutoff
    let mut tue = check_in(&FixedClock(at(tuesday, 6, 41)), &policy, 1, 2);
    assert_eq!(tue.status, AttendanceStatus::Late);
    tue.check_out_at(at(tuesday, 12, 30)).unwrap();
    assert!((tue.net_hours(&lunch).unwrap() - (5.0 + 19.0 / 60.0)).abs() < 1e-9);

    // Wednesday: still open, contributes nothing to hours
    let wed = check_in(&FixedClock(at(wednesday, 13, 10)), &policy, 1, 3);
    assert_eq!(wed.status, AttendanceStatus::Present);

    let history = vec![wed.clone(), tue.clone(), mon.clone()];
    let stats = compute_stats(&history);
    assert_eq!(stats.total_days, 3);
    assert_eq!(stats.present_count, 2);
    assert_eq!(stats.late_count, 1);
    assert_eq!(stats.punctuality, 67);
    assert_eq!(stats.attendance_rate, 100);
    assert_eq!(stats.absenteeism, 0);
    assert_eq!(StatsWindow::default().limit(), Some(30));

    let roster = vec![
        employee(2, "Ana", EmployeeStatus::Active),
        employee(1, "Bruno", EmployeeStatus::Active),
        employee(3, "Carla", EmployeeStatus::Inactive),
    ];
    let report = build_weekly_report(&roster, &history, wednesday, &lunch);

    assert_eq!(report.week_start, monday);
    assert_eq!(report.week_end, monday + Days::new(4));
    let ids: Vec<u64> = report.rows.iter().map(|r| r.employee.id).collect();
    assert_eq!(ids, vec![2, 1]);

    let ana = &report.rows[0];
    assert_eq!(ana.days.len(), 5);
    assert!(ana.days.values().all(Option::is_none));
    assert_eq!(ana.total_hours, 0.0);

    let bruno = &report.rows[1];
    assert_eq!(bruno.days[&monday].as_ref().map(|r| r.id), Some(1));
    assert_eq!(bruno.days[&wednesday].as_ref().map(|r| r.id), Some(3));
    assert!(bruno.days[&(monday + Days::new(3))].is_none());
    let expected = 8.0 + 5.0 + 19.0 / 60.0;
    assert!((bruno.total_hours - expected).abs() < 1e-9);
}

#[test]
fn sunday_reports_the_week_that_just_ended() {
    let sunday = NaiveDate::from_ymd_opt(2026, 1, 11).unwrap();
    let report = build_weekly_report(&[], &[], sunday, &LunchWindow::default());

    assert_eq!(report.week_start, NaiveDate::from_ymd_opt(2026, 1, 5).unwrap());
    assert_eq!(report.week_end, NaiveDate::from_ymd_opt(2026, 1, 9).unwrap());
    assert!(report.rows.is_empty());
}

#[test]
fn single_cutoff_shift() {
    let policy = ShiftPolicy::single(chrono::NaiveTime::from_hms_opt(9, 0, 0).unwrap());
    let day = NaiveDate::from_ymd_opt(2026, 2, 2).unwrap();

    assert_eq!(check_in(&FixedClock(at(day, 9, 0)), &policy, 4, 1).status, AttendanceStatus::Present);
    assert_eq!(check_in(&FixedClock(at(day, 13, 5)), &policy, 4, 2).status, AttendanceStatus::Late);
}
