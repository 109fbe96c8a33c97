use std::str::FromStr;

use chrono::NaiveDateTime;
use sqlx::{FromRow, MySqlPool};
use tracing::{debug, warn};

use super::StoreError;
use crate::engine::EngineError;
use crate::model::employee::{Employee, EmployeeChanges, EmployeeStatus, NewEmployee};

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, role, status, created_at";

#[derive(Debug, FromRow)]
pub struct EmployeeRow {
    pub id: u64,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub status: String,
    pub created_at: Option<NaiveDateTime>,
}

impl TryFrom<EmployeeRow> for Employee {
    type Error = EngineError;

    fn try_from(row: EmployeeRow) -> Result<Self, Self::Error> {
        let status = EmployeeStatus::from_str(&row.status).map_err(|_| EngineError::UnknownValue {
            field: "employees.status",
            value: row.status.clone(),
        })?;
        Ok(Employee {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            role: row.role,
            status,
            created_at: row.created_at,
        })
    }
}

fn into_employees(rows: Vec<EmployeeRow>) -> Vec<Employee> {
    rows.into_iter()
        .filter_map(|row| {
            let id = row.id;
            Employee::try_from(row)
                .map_err(|e| warn!(error = %e, employee_id = id, "Skipping unreadable employee row"))
                .ok()
        })
        .collect()
}

/// Filters for the roster listing.
#[derive(Debug, Default)]
pub struct EmployeeFilter<'a> {
    pub status: Option<EmployeeStatus>,
    pub search: Option<&'a str>,
    pub page: u32,
    pub per_page: u32,
}

/// Active employees in roster order (first name, then last name).
pub async fn active_roster(pool: &MySqlPool) -> Result<Vec<Employee>, sqlx::Error> {
    let sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE status = ? \
         ORDER BY first_name ASC, last_name ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(EmployeeStatus::Active.to_string())
        .fetch_all(pool)
        .await?;
    Ok(into_employees(rows))
}

/// Rows to skip before `page` (1-based). Computed in `u64` since `page`
/// comes straight from the query string.
fn offset_for(page: u32, per_page: u32) -> u64 {
    (u64::from(page.max(1)) - 1) * u64::from(per_page)
}

pub async fn list(
    pool: &MySqlPool,
    filter: &EmployeeFilter<'_>,
) -> Result<(Vec<Employee>, i64), sqlx::Error> {
    // ---------- build WHERE clause dynamically ----------
    let mut conditions = Vec::new();
    let mut bindings: Vec<String> = Vec::new();

    if let Some(status) = filter.status {
        conditions.push("status = ?");
        bindings.push(status.to_string());
    }

    if let Some(search) = filter.search {
        conditions.push("(first_name LIKE ? OR last_name LIKE ? OR role LIKE ?)");
        let like = format!("%{}%", search);
        bindings.push(like.clone());
        bindings.push(like.clone());
        bindings.push(like);
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) AS total FROM employees {}", where_clause);
    debug!(sql = %count_sql, bindings = ?bindings, "Counting employees");

    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = count_query.bind(b);
    }
    let total = count_query.fetch_one(pool).await?;

    let offset = offset_for(filter.page, filter.per_page);
    let data_sql = format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees {} \
         ORDER BY first_name ASC, last_name ASC, id ASC LIMIT ? OFFSET ?",
        where_clause
    );
    debug!(sql = %data_sql, bindings = ?bindings, page = filter.page, per_page = filter.per_page, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, EmployeeRow>(&data_sql);
    for b in &bindings {
        data_query = data_query.bind(b);
    }
    let rows = data_query
        .bind(i64::from(filter.per_page))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    Ok((into_employees(rows), total))
}

pub async fn find(pool: &MySqlPool, id: u64) -> Result<Option<Employee>, StoreError> {
    let sql = format!("SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = ?");
    let row = sqlx::query_as::<_, EmployeeRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(row.map(Employee::try_from).transpose()?)
}

pub async fn insert(
    pool: &MySqlPool,
    employee: &NewEmployee,
    created_at: NaiveDateTime,
) -> Result<u64, sqlx::Error> {
    let status = employee.status.unwrap_or(EmployeeStatus::Active);
    let result = sqlx::query(
        r#"
        INSERT INTO employees (first_name, last_name, role, status, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&employee.first_name)
    .bind(&employee.last_name)
    .bind(&employee.role)
    .bind(status.to_string())
    .bind(created_at)
    .execute(pool)
    .await?;

    Ok(result.last_insert_id())
}

/// Returns whether a row matched.
pub async fn update(
    pool: &MySqlPool,
    id: u64,
    changes: &EmployeeChanges,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE employees
        SET first_name = COALESCE(?, first_name),
            last_name = COALESCE(?, last_name),
            role = COALESCE(?, role),
            status = COALESCE(?, status)
        WHERE id = ?
        "#,
    )
    .bind(changes.first_name.as_deref())
    .bind(changes.last_name.as_deref())
    .bind(changes.role.as_deref())
    .bind(changes.status.map(|s| s.to_string()))
    .bind(id)
    .execute(pool)
    .await?;

    // MySQL reports changed rows, so an update that rewrites identical values
    // shows 0; confirm the row exists before calling it missing.
    if result.rows_affected() > 0 {
        return Ok(true);
    }
    let matching = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(matching > 0)
}

pub async fn delete(pool: &MySqlPool, id: u64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> EmployeeRow {
        EmployeeRow {
            id: 4,
            first_name: "Lucía".into(),
            last_name: "Paz".into(),
            role: "Plegadora".into(),
            status: status.into(),
            created_at: None,
        }
    }

    #[test]
    fn row_converts_known_status() {
        let employee = Employee::try_from(row("inactive")).unwrap();
        assert_eq!(employee.status, EmployeeStatus::Inactive);
        assert_eq!(employee.full_name(), "Lucía Paz");
    }

    #[test]
    fn page_offset_does_not_overflow() {
        assert_eq!(offset_for(0, 20), 0);
        assert_eq!(offset_for(1, 20), 0);
        assert_eq!(offset_for(3, 20), 40);
        assert_eq!(offset_for(50_000_000, 100), 4_999_999_900);
        assert_eq!(offset_for(u32::MAX, 100), (u64::from(u32::MAX) - 1) * 100);
    }

    #[test]
    fn unknown_status_is_rejected_and_skipped_in_lists() {
        assert!(Employee::try_from(row("vacaciones")).is_err());
        let employees = into_employees(vec![row("active"), row("vacaciones")]);
        assert_eq!(employees.len(), 1);
    }
}
