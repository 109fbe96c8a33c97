//! Attendance computations over records that were already fetched.
//!
//! Nothing here touches the database or the wall clock; callers pass the
//! current instant and the configured policies in.

pub mod classify;
pub mod clock;
pub mod error;
pub mod hours;
pub mod report;
pub mod shift;
pub mod stats;

pub use classify::{DailyStatus, classify_check_in, current_record, project_daily_status};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{EngineError, ValidationError};
pub use hours::compute_net_hours;
pub use report::{EmployeeWeek, WeeklyReport, build_weekly_report};
pub use shift::{LunchWindow, ShiftPolicy, week_end, week_start};
pub use stats::{AttendanceStats, StatsWindow, WindowBy, compute_stats};
