use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

use crate::engine::error::{EngineError, ValidationError};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AttendanceStatus {
    Present,
    Late,
    Absent,
}

/// One employee's attendance for one work day.
///
/// Instants are workshop-local wall-clock values. Construct through
/// [`AttendanceRecord::new`] so a closed record always has
/// `check_out >= check_in`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = "2026-01-05T06:32:00", value_type = String, format = "date-time")]
    pub check_in: NaiveDateTime,

    #[schema(
        example = "2026-01-05T15:05:00",
        value_type = Option<String>,
        format = "date-time",
        nullable = true
    )]
    pub check_out: Option<NaiveDateTime>,

    #[schema(example = "present")]
    pub status: AttendanceStatus,

    #[schema(example = "2026-01-05T06:32:00", value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

impl AttendanceRecord {
    pub fn new(
        id: u64,
        employee_id: u64,
        date: NaiveDate,
        check_in: NaiveDateTime,
        check_out: Option<NaiveDateTime>,
        status: AttendanceStatus,
        created_at: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let record = Self {
            id,
            employee_id,
            date,
            check_in,
            check_out,
            status,
            created_at,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.check_out {
            Some(out) if out < self.check_in => Err(ValidationError::CheckOutBeforeCheckIn {
                record_id: Some(self.id),
                check_in: self.check_in,
                check_out: out,
            }),
            _ => Ok(()),
        }
    }

    pub fn is_open(&self) -> bool {
        self.check_out.is_none()
    }

    /// Closes an open record. Only one check-out is accepted per record.
    pub fn check_out_at(&mut self, now: NaiveDateTime) -> Result<(), EngineError> {
        if self.check_out.is_some() {
            return Err(EngineError::AlreadyCheckedOut { record_id: self.id });
        }
        if now < self.check_in {
            return Err(ValidationError::CheckOutBeforeCheckIn {
                record_id: Some(self.id),
                check_in: self.check_in,
                check_out: now,
            }
            .into());
        }
        self.check_out = Some(now);
        Ok(())
    }

    /// Applies an administrator's correction. Times are anchored to the
    /// record's own `date`, which never changes. On failure the record is
    /// left untouched.
    pub fn apply_correction(
        &mut self,
        check_in: NaiveTime,
        check_out: Option<NaiveTime>,
    ) -> Result<(), ValidationError> {
        let corrected = Self {
            check_in: self.date.and_time(check_in),
            check_out: check_out.map(|t| self.date.and_time(t)),
            ..self.clone()
        };
        corrected.validate()?;
        *self = corrected;
        Ok(())
    }
}
