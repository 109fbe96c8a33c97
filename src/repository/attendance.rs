use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, warn};
use utoipa::ToSchema;

use super::StoreError;
use crate::engine::{EngineError, StatsWindow};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};

const RECORD_COLUMNS: &str =
    "a.id, a.employee_id, a.date, a.check_in, a.check_out, a.status, a.created_at";

#[derive(Debug, FromRow)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub date: NaiveDate,
    pub check_in: NaiveDateTime,
    pub check_out: Option<NaiveDateTime>,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl TryFrom<AttendanceRow> for AttendanceRecord {
    type Error = EngineError;

    fn try_from(row: AttendanceRow) -> Result<Self, Self::Error> {
        let status =
            AttendanceStatus::from_str(&row.status).map_err(|_| EngineError::UnknownValue {
                field: "attendance_logs.status",
                value: row.status.clone(),
            })?;
        Ok(AttendanceRecord::new(
            row.id,
            row.employee_id,
            row.date,
            row.check_in,
            row.check_out,
            status,
            row.created_at,
        )?)
    }
}

fn into_records(rows: Vec<AttendanceRow>) -> Vec<AttendanceRecord> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            AttendanceRecord::try_from(row)
                .map_err(|e| warn!(error = %e, record_id = id, "Skipping unreadable attendance row"))
                .ok()
        })
        .collect()
}

/// A record with the owner's name, as shown in the daily log.
#[derive(Debug, Serialize, ToSchema)]
pub struct DailyLogEntry {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    #[schema(example = "Ramiro")]
    pub first_name: String,
    #[schema(example = "Gómez")]
    pub last_name: String,
    #[schema(example = "Soldador")]
    pub role: String,
}

#[derive(Debug, FromRow)]
struct DailyLogRow {
    #[sqlx(flatten)]
    record: AttendanceRow,
    first_name: String,
    last_name: String,
    role: String,
}

pub async fn find(pool: &MySqlPool, id: u64) -> Result<Option<AttendanceRecord>, StoreError> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM attendance_logs a WHERE a.id = ?");
    let row = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(AttendanceRecord::try_from).transpose()?)
}

/// All records dated `date`, newest check-in first.
pub async fn for_date(pool: &MySqlPool, date: NaiveDate) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_logs a WHERE a.date = ? ORDER BY a.check_in DESC"
    );
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(into_records(rows))
}

pub async fn for_employee_on(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_logs a WHERE a.employee_id = ? AND a.date = ?"
    );
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(date)
        .fetch_all(pool)
        .await?;
    Ok(into_records(rows))
}

pub async fn daily_log(pool: &MySqlPool, date: NaiveDate) -> Result<Vec<DailyLogEntry>, sqlx::Error> {
    let sql = format!(
        r#"
        SELECT {RECORD_COLUMNS}, e.first_name, e.last_name, e.role
        FROM attendance_logs a
        JOIN employees e ON e.id = a.employee_id
        WHERE a.date = ?
        ORDER BY a.check_in DESC
        "#
    );
    let rows = sqlx::query_as::<_, DailyLogRow>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .filter_map(|row| {
            let id = row.record.id;
            match AttendanceRecord::try_from(row.record) {
                Ok(record) => Some(DailyLogEntry {
                    record,
                    first_name: row.first_name,
                    last_name: row.last_name,
                    role: row.role,
                }),
                Err(e) => {
                    warn!(error = %e, record_id = id, "Skipping unreadable attendance row");
                    None
                }
            }
        })
        .collect())
}

/// Records dated `start..=end`, for every employee.
pub async fn in_range(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_logs a WHERE a.date BETWEEN ? AND ? \
         ORDER BY a.date ASC, a.check_in ASC"
    );
    let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;
    Ok(into_records(rows))
}

/// An employee's trailing records up to `today`, newest first, bounded by
/// the window's record count or calendar span.
pub async fn window_for_employee(
    pool: &MySqlPool,
    employee_id: u64,
    window: &StatsWindow,
    today: NaiveDate,
) -> Result<Vec<AttendanceRecord>, sqlx::Error> {
    let mut sql = format!(
        "SELECT {RECORD_COLUMNS} FROM attendance_logs a WHERE a.employee_id = ? AND a.date <= ?"
    );
    let since = window.since(today);
    if since.is_some() {
        sql.push_str(" AND a.date >= ?");
    }
    sql.push_str(" ORDER BY a.date DESC, a.created_at DESC");
    if window.limit().is_some() {
        sql.push_str(" LIMIT ?");
    }
    debug!(sql = %sql, employee_id, window = ?window, "Fetching stats window");

    let mut query = sqlx::query_as::<_, AttendanceRow>(&sql)
        .bind(employee_id)
        .bind(today);
    if let Some(since) = since {
        query = query.bind(since);
    }
    if let Some(limit) = window.limit() {
        query = query.bind(limit);
    }

    Ok(into_records(query.fetch_all(pool).await?))
}

pub async fn insert(
    pool: &MySqlPool,
    employee_id: u64,
    date: NaiveDate,
    check_in: NaiveDateTime,
    status: AttendanceStatus,
) -> Result<AttendanceRecord, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO attendance_logs (employee_id, date, check_in, status, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(date)
    .bind(check_in)
    .bind(status.to_string())
    .bind(check_in)
    .execute(pool)
    .await?;

    Ok(AttendanceRecord {
        id: result.last_insert_id(),
        employee_id,
        date,
        check_in,
        check_out: None,
        status,
        created_at: check_in,
    })
}

/// Closes the record if it is still open. Returns whether it was.
pub async fn set_check_out(
    pool: &MySqlPool,
    id: u64,
    check_out: NaiveDateTime,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE attendance_logs
        SET check_out = ?
        WHERE id = ?
        AND check_out IS NULL
        "#,
    )
    .bind(check_out)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Persists a corrected record. `date` is never written.
pub async fn save_correction(pool: &MySqlPool, record: &AttendanceRecord) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE attendance_logs
        SET check_in = ?, check_out = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(record.check_in)
    .bind(record.check_out)
    .bind(record.status.to_string())
    .bind(record.id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn delete(pool: &MySqlPool, id: u64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM attendance_logs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str, check_out_hour: Option<u32>) -> AttendanceRow {
        let date = NaiveDate::from_ymd_opt(2026, 1, 7).unwrap();
        AttendanceRow {
            id: 12,
            employee_id: 3,
            date,
            check_in: date.and_hms_opt(8, 0, 0).unwrap(),
            check_out: check_out_hour.map(|h| date.and_hms_opt(h, 0, 0).unwrap()),
            status: status.into(),
            created_at: date.and_hms_opt(8, 0, 0).unwrap(),
        }
    }

    #[test]
    fn valid_row_becomes_a_record() {
        let record = AttendanceRecord::try_from(row("late", Some(17))).unwrap();
        assert_eq!(record.status, AttendanceStatus::Late);
        assert!(!record.is_open());
    }

    #[test]
    fn rows_are_validated_at_the_boundary() {
        assert!(matches!(
            AttendanceRecord::try_from(row("present", Some(7))),
            Err(EngineError::Validation(_))
        ));
        assert!(matches!(
            AttendanceRecord::try_from(row("presente", None)),
            Err(EngineError::UnknownValue { .. })
        ));
    }

    #[test]
    fn unreadable_rows_are_dropped_from_lists() {
        let records = into_records(vec![row("present", Some(17)), row("present", Some(7)), row("?", None)]);
        assert_eq!(records.len(), 1);
    }
}
