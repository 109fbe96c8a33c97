use chrono::NaiveDateTime;
use derive_more::{Display, From};

/// A record whose timestamps cannot describe a real work day.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Display)]
pub enum ValidationError {
    #[display(
        fmt = "record {:?}: check-out {} is before check-in {}",
        record_id,
        check_out,
        check_in
    )]
    CheckOutBeforeCheckIn {
        record_id: Option<u64>,
        check_in: NaiveDateTime,
        check_out: NaiveDateTime,
    },
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Display, From)]
pub enum EngineError {
    #[display(fmt = "{}", _0)]
    Validation(ValidationError),

    #[display(fmt = "record {} is already checked out", record_id)]
    #[from(ignore)]
    AlreadyCheckedOut { record_id: u64 },

    #[display(fmt = "unknown {} value {:?}", field, value)]
    #[from(ignore)]
    UnknownValue { field: &'static str, value: String },

    #[display(fmt = "invalid {}: {}", key, reason)]
    #[from(ignore)]
    InvalidValue { key: &'static str, reason: String },
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Validation(e) => Some(e),
            _ => None,
        }
    }
}
