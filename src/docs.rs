use crate::api::attendance::{CheckInRequest, CorrectionRequest, KioskEntry, StatsResponse};
use crate::api::employee::EmployeeListResponse;
use crate::engine::{AttendanceStats, DailyStatus, EmployeeWeek, WeeklyReport, WindowBy};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::employee::{Employee, EmployeeChanges, EmployeeStatus, NewEmployee};
use crate::repository::attendance::DailyLogEntry;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "MetalFlow Attendance API",
        version = "1.0.0",
        description = r#"
## Workshop attendance

Check-in/check-out tracking for a metal workshop, with the hours and
statistics supervisors rely on.

### Key Features
- **Kiosk**
  - Tap in and out from the shop-floor terminal, see who is working today
- **Attendance**
  - Late/on-time classification against the shift cutoffs
  - Manual corrections and a daily log
- **Statistics**
  - Punctuality, attendance rate and absenteeism over a trailing window
- **Weekly report**
  - Monday to Friday grid with net hours, lunch deducted

### Security
Every endpoint requires a **JWT Bearer** access token issued by the identity
service. Corrections, deletions, reports and roster changes need the
**supervisor** or **admin** role.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::kiosk_action,
        crate::api::attendance::kiosk_board,
        crate::api::attendance::daily_log,
        crate::api::attendance::correct_record,
        crate::api::attendance::delete_record,
        crate::api::attendance::employee_stats,
        crate::api::attendance::weekly_report,

        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee
    ),
    components(
        schemas(
            AttendanceRecord,
            AttendanceStatus,
            AttendanceStats,
            CheckInRequest,
            CorrectionRequest,
            DailyLogEntry,
            DailyStatus,
            KioskEntry,
            StatsResponse,
            WindowBy,
            EmployeeWeek,
            WeeklyReport,
            Employee,
            EmployeeStatus,
            NewEmployee,
            EmployeeChanges,
            EmployeeListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in, kiosk, statistics and report APIs"),
        (name = "Employee", description = "Employee roster APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for path in [
            "/api/attendance",
            "/api/attendance/check-in",
            "/api/attendance/kiosk",
            "/api/attendance/kiosk/{employee_id}",
            "/api/attendance/{id}",
            "/api/attendance/{id}/check-out",
            "/api/attendance/stats/{employee_id}",
            "/api/attendance/report/weekly",
            "/api/employee",
            "/api/employee/{employee_id}",
        ] {
            assert!(paths.contains(&path), "missing {path}");
        }
        assert!(
            doc.components
                .as_ref()
                .is_some_and(|c| c.security_schemes.contains_key("bearer_auth"))
        );
    }
}
