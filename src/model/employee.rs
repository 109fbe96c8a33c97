use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EmployeeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "first_name": "Ramiro",
        "last_name": "Gómez",
        "role": "Soldador",
        "status": "active",
        "created_at": "2026-01-02T09:00:00"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Ramiro")]
    pub first_name: String,

    #[schema(example = "Gómez")]
    pub last_name: String,

    /// Trade or title, e.g. welder, turner.
    #[schema(example = "Soldador")]
    pub role: String,

    #[schema(example = "active")]
    pub status: EmployeeStatus,

    #[schema(
        example = "2026-01-02T09:00:00",
        value_type = Option<String>,
        format = "date-time",
        nullable = true
    )]
    pub created_at: Option<NaiveDateTime>,
}

impl Employee {
    pub fn is_active(&self) -> bool {
        self.status == EmployeeStatus::Active
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct NewEmployee {
    #[schema(example = "Ramiro")]
    pub first_name: String,
    #[schema(example = "Gómez")]
    pub last_name: String,
    #[schema(example = "Soldador")]
    pub role: String,
    /// Defaults to active.
    pub status: Option<EmployeeStatus>,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct EmployeeChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
    pub status: Option<EmployeeStatus>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.role.is_none()
            && self.status.is_none()
    }
}
