use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::engine::shift::parse_time_of_day;
use crate::engine::{
    AttendanceStats, Clock, DailyStatus, EngineError, StatsWindow, SystemClock, WindowBy,
    WeeklyReport, build_weekly_report, classify_check_in, compute_stats, current_record,
    project_daily_status, week_end, week_start,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::repository::attendance::DailyLogEntry;
use crate::repository::{self, StoreError, attendance as records, employee as employees};
use crate::utils::roster_cache;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, warn};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInRequest {
    /// Defaults to the employee linked to the caller's token.
    #[schema(example = 7)]
    pub employee_id: Option<u64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CorrectionRequest {
    #[schema(example = "06:35")]
    pub check_in: String,
    /// Leave out or send null to reopen the record.
    #[schema(example = "15:05", nullable = true)]
    pub check_out: Option<String>,
    /// Re-run the late/on-time rule on the corrected check-in.
    #[serde(default)]
    pub rederive_status: bool,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DateQuery {
    /// Day to list, defaults to today
    #[param(value_type = Option<String>, format = Date, example = "2026-01-05")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StatsQuery {
    /// `record_count` or `calendar_days`
    #[param(value_type = Option<String>, example = "record_count")]
    pub window_by: Option<WindowBy>,
    /// Number of records or days in the window
    #[param(example = 30)]
    pub size: Option<u32>,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// Any day of the wanted week, defaults to today
    #[param(value_type = Option<String>, format = Date, example = "2026-01-07")]
    pub today: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct KioskEntry {
    pub employee: Employee,
    pub status: DailyStatus,
    /// The record deciding `status`, if any.
    pub record: Option<AttendanceRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    #[schema(example = 7)]
    pub employee_id: u64,
    pub window_by: WindowBy,
    #[schema(example = 30)]
    pub size: u32,
    #[serde(flatten)]
    pub stats: AttendanceStats,
}

fn internal(context: &'static str) -> impl Fn(sqlx::Error) -> actix_web::Error {
    move |e| {
        error!(error = %e, "{}", context);
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    }
}

fn store_failure(e: StoreError) -> actix_web::Error {
    error!(error = %e, "Attendance store failure");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

fn message(status: actix_web::http::StatusCode, text: impl Into<String>) -> HttpResponse {
    HttpResponse::build(status).json(json!({ "message": text.into() }))
}

async fn check_in_employee(
    pool: &MySqlPool,
    config: &Config,
    clock: &impl Clock,
    employee_id: u64,
) -> actix_web::Result<HttpResponse> {
    use actix_web::http::StatusCode;

    let employee = employees::find(pool, employee_id)
        .await
        .map_err(store_failure)?;
    match employee {
        None => return Ok(message(StatusCode::NOT_FOUND, "Employee not found")),
        Some(e) if !e.is_active() => {
            return Ok(message(StatusCode::CONFLICT, "Employee is inactive"));
        }
        Some(_) => {}
    }

    let now = clock.now();
    let today = now.date();
    let todays = records::for_employee_on(pool, employee_id, today)
        .await
        .map_err(internal("Failed to load today's records"))?;
    if project_daily_status(employee_id, &todays) != DailyStatus::Pending {
        return Ok(message(StatusCode::CONFLICT, "Already checked in today"));
    }

    let status = classify_check_in(now, &config.attendance.shift);
    match records::insert(pool, employee_id, today, now, status).await {
        Ok(record) => {
            info!(employee_id, record_id = record.id, %status, "Checked in");
            Ok(HttpResponse::Created().json(record))
        }
        // Two devices raced past the status check
        Err(e) if repository::is_unique_violation(&e) => {
            Ok(message(StatusCode::CONFLICT, "Already checked in today"))
        }
        Err(e) if repository::is_foreign_key_violation(&e) => {
            Ok(message(StatusCode::NOT_FOUND, "Employee not found"))
        }
        Err(e) => {
            error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

async fn check_out_record(
    pool: &MySqlPool,
    clock: &impl Clock,
    mut record: AttendanceRecord,
) -> actix_web::Result<HttpResponse> {
    use actix_web::http::StatusCode;

    let now = clock.now();
    match record.check_out_at(now) {
        Ok(()) => {}
        Err(EngineError::AlreadyCheckedOut { .. }) => {
            return Ok(message(StatusCode::CONFLICT, "Record is already checked out"));
        }
        Err(e) => {
            warn!(error = %e, record_id = record.id, "Rejected check-out");
            return Ok(message(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()));
        }
    }

    let closed = records::set_check_out(pool, record.id, now)
        .await
        .map_err(internal("Check-out failed"))?;
    if !closed {
        return Ok(message(StatusCode::CONFLICT, "Record is already checked out"));
    }

    info!(employee_id = record.employee_id, record_id = record.id, "Checked out");
    Ok(HttpResponse::Ok().json(record))
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    request_body = CheckInRequest,
    responses(
        (status = 201, description = "Checked in", body = AttendanceRecord),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 409, description = "Already checked in today or employee inactive", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<SystemClock>,
    body: web::Json<CheckInRequest>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.target_employee(body.employee_id)?;
    check_in_employee(pool.get_ref(), &config, clock.get_ref(), employee_id).await
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/attendance/{id}/check-out",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Checked out", body = AttendanceRecord),
        (status = 404, description = "Record not found"),
        (status = 409, description = "Record is already checked out", body = Object, example = json!({
            "message": "Record is already checked out"
        })),
        (status = 422, description = "Check-out would precede check-in"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SystemClock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let record_id = path.into_inner();
    let record = records::find(pool.get_ref(), record_id)
        .await
        .map_err(store_failure)?;

    match record {
        Some(record) => check_out_record(pool.get_ref(), clock.get_ref(), record).await,
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        }))),
    }
}

/// Kiosk tap: checks the employee in or out, whichever is next today.
#[utoipa::path(
    post,
    path = "/api/attendance/kiosk/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 201, description = "Checked in", body = AttendanceRecord),
        (status = 200, description = "Checked out", body = AttendanceRecord),
        (status = 409, description = "Workday already completed", body = Object, example = json!({
            "message": "Workday already completed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn kiosk_action(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<SystemClock>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let todays = records::for_employee_on(pool.get_ref(), employee_id, clock.today())
        .await
        .map_err(internal("Failed to load today's records"))?;

    match current_record(employee_id, &todays) {
        None => check_in_employee(pool.get_ref(), &config, clock.get_ref(), employee_id).await,
        Some(record) if record.is_open() => {
            check_out_record(pool.get_ref(), clock.get_ref(), record.clone()).await
        }
        Some(_) => Ok(HttpResponse::Conflict().json(json!({
            "message": "Workday already completed"
        }))),
    }
}

/// Active roster with each employee's status for today.
#[utoipa::path(
    get,
    path = "/api/attendance/kiosk",
    responses(
        (status = 200, description = "Kiosk board", body = [KioskEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn kiosk_board(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SystemClock>,
) -> actix_web::Result<impl Responder> {
    let roster = roster_cache::active_roster(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load roster");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    let todays = records::for_date(pool.get_ref(), clock.today())
        .await
        .map_err(internal("Failed to load today's records"))?;

    let board: Vec<KioskEntry> = roster
        .iter()
        .map(|employee| KioskEntry {
            employee: employee.clone(),
            status: project_daily_status(employee.id, &todays),
            record: current_record(employee.id, &todays).cloned(),
        })
        .collect();

    Ok(HttpResponse::Ok().json(board))
}

/// Records of one day with employee names, newest check-in first.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(DateQuery),
    responses(
        (status = 200, description = "Daily log", body = [DailyLogEntry]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn daily_log(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    clock: web::Data<SystemClock>,
    query: web::Query<DateQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query.date.unwrap_or_else(|| clock.today());
    let entries = records::daily_log(pool.get_ref(), date)
        .await
        .map_err(internal("Failed to fetch daily log"))?;

    Ok(HttpResponse::Ok().json(entries))
}

/// Manual correction of a record's times
#[utoipa::path(
    put,
    path = "/api/attendance/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    request_body = CorrectionRequest,
    responses(
        (status = 200, description = "Record corrected", body = AttendanceRecord),
        (status = 400, description = "Malformed time"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found"),
        (status = 422, description = "Check-out before check-in"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn correct_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    body: web::Json<CorrectionRequest>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;
    let record_id = path.into_inner();

    let check_in = parse_time_of_day("check_in", &body.check_in)
        .map_err(|e| actix_web::error::ErrorBadRequest(e.to_string()))?;
    let check_out = body
        .check_out
        .as_deref()
        .map(|t| parse_time_of_day("check_out", t))
        .transpose()
        .map_err(|e| actix_web::error::ErrorBadRequest(e.to_string()))?;

    let Some(mut record) = records::find(pool.get_ref(), record_id)
        .await
        .map_err(store_failure)?
    else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    };

    if let Err(e) = record.apply_correction(check_in, check_out) {
        return Ok(HttpResponse::UnprocessableEntity().json(json!({
            "message": e.to_string()
        })));
    }
    if body.rederive_status {
        record.status = classify_check_in(record.check_in, &config.attendance.shift);
    }

    records::save_correction(pool.get_ref(), &record)
        .await
        .map_err(internal("Failed to save correction"))?;

    info!(record_id, corrected_by = auth.user_id, "Attendance record corrected");
    Ok(HttpResponse::Ok().json(record))
}

/// Delete a single attendance record
#[utoipa::path(
    delete,
    path = "/api/attendance/{id}",
    params(
        ("id", Path, description = "Attendance record ID")
    ),
    responses(
        (status = 200, description = "Successfully deleted", body = Object, example = json!({
            "message": "Successfully deleted"
        })),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Record not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn delete_record(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;
    let record_id = path.into_inner();

    let deleted = records::delete(pool.get_ref(), record_id)
        .await
        .map_err(internal("Failed to delete attendance record"))?;

    if !deleted {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Attendance record not found"
        })));
    }

    info!(record_id, deleted_by = auth.user_id, "Attendance record deleted");
    Ok(HttpResponse::Ok().json(json!({
        "message": "Successfully deleted"
    })))
}

/// Punctuality, attendance rate and absenteeism over a trailing window
#[utoipa::path(
    get,
    path = "/api/attendance/stats/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID"),
        StatsQuery
    ),
    responses(
        (status = 200, description = "Employee statistics", body = StatsResponse),
        (status = 400, description = "Invalid window"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn employee_stats(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<SystemClock>,
    path: web::Path<u64>,
    query: web::Query<StatsQuery>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    let default = config.attendance.stats_window;
    let window = StatsWindow::new(
        query.window_by.unwrap_or(default.by),
        query.size.unwrap_or(default.size),
    )
    .map_err(|e| actix_web::error::ErrorBadRequest(e.to_string()))?;

    // Inactive employees keep their history
    if employees::find(pool.get_ref(), employee_id)
        .await
        .map_err(store_failure)?
        .is_none()
    {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let history = records::window_for_employee(pool.get_ref(), employee_id, &window, clock.today())
        .await
        .map_err(internal("Failed to fetch stats window"))?;

    Ok(HttpResponse::Ok().json(StatsResponse {
        employee_id,
        window_by: window.by,
        size: window.size,
        stats: compute_stats(&history),
    }))
}

/// Monday to Friday report for every active employee
#[utoipa::path(
    get,
    path = "/api/attendance/report/weekly",
    params(ReportQuery),
    responses(
        (status = 200, description = "Weekly report", body = WeeklyReport),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn weekly_report(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
    clock: web::Data<SystemClock>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_supervisor_or_admin()?;

    let today = query.today.unwrap_or_else(|| clock.today());
    let monday = week_start(today);
    let week = records::in_range(pool.get_ref(), monday, week_end(monday))
        .await
        .map_err(internal("Failed to fetch weekly records"))?;
    let roster = roster_cache::active_roster(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to load roster");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let report = build_weekly_report(&roster, &week, today, &config.attendance.lunch);
    Ok(HttpResponse::Ok().json(report))
}
