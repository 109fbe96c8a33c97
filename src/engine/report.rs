use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::shift::{LunchWindow, week_end, week_start, work_days};
use crate::model::{attendance::AttendanceRecord, employee::Employee};

/// One employee's line in the weekly report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EmployeeWeek {
    pub employee: Employee,

    /// Monday..Friday, each with that day's record or `null`.
    #[schema(value_type = Object)]
    pub days: BTreeMap<NaiveDate, Option<AttendanceRecord>>,

    /// Net hours over the closed, valid records of the week.
    #[schema(example = 42.5)]
    pub total_hours: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WeeklyReport {
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub week_start: NaiveDate,

    #[schema(example = "2026-01-09", value_type = String, format = "date")]
    pub week_end: NaiveDate,

    pub rows: Vec<EmployeeWeek>,
}

/// Groups a week's records by active employee, in roster order.
///
/// `any_day` may be any date of the wanted week; the report always runs
/// from that week's Monday to its Friday. Employees without records keep an
/// empty row. Records outside the week, for employees not on the active
/// roster, or with reversed timestamps are logged and left out of the
/// totals instead of failing the report.
pub fn build_weekly_report(
    roster: &[Employee],
    week_records: &[AttendanceRecord],
    any_day: NaiveDate,
    lunch: &LunchWindow,
) -> WeeklyReport {
    let monday = week_start(any_day);
    let days = work_days(monday);

    let mut rows: Vec<EmployeeWeek> = Vec::new();
    let mut index: HashMap<u64, usize> = HashMap::new();

    for employee in roster {
        if !employee.is_active() {
            debug!(employee_id = employee.id, "Skipping inactive employee in weekly report");
            continue;
        }
        if index.contains_key(&employee.id) {
            warn!(employee_id = employee.id, "Employee listed twice in roster, keeping first");
            continue;
        }
        index.insert(employee.id, rows.len());
        rows.push(EmployeeWeek {
            employee: employee.clone(),
            days: days.iter().map(|d| (*d, None)).collect(),
            total_hours: 0.0,
        });
    }

    for record in week_records {
        let Some(&row) = index.get(&record.employee_id) else {
            warn!(
                record_id = record.id,
                employee_id = record.employee_id,
                "Record for employee not on the active roster, skipping"
            );
            continue;
        };
        let Some(cell) = rows[row].days.get_mut(&record.date) else {
            debug!(record_id = record.id, date = %record.date, "Record outside report week");
            continue;
        };
        let newer = match cell {
            Some(existing) => (record.created_at, record.id) > (existing.created_at, existing.id),
            None => true,
        };
        if newer {
            *cell = Some(record.clone());
        }
    }

    for row in &mut rows {
        row.total_hours = row
            .days
            .values()
            .flatten()
            .filter(|r| r.check_out.is_some())
            .filter_map(|r| match r.net_hours(lunch) {
                Ok(hours) => Some(hours),
                Err(e) => {
                    warn!(error = %e, employee_id = r.employee_id, "Malformed record left out of weekly hours");
                    None
                }
            })
            .sum();
    }

    WeeklyReport {
        week_start: monday,
        week_end: week_end(monday),
        rows,
    }
}
