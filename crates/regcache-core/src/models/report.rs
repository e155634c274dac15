use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::utils::format_date;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpirationStatus {
    Expired,
    Upcoming,
}

impl ExpirationStatus {
    pub fn from_days_remaining(days: i64) -> Self {
        if days < 0 {
            ExpirationStatus::Expired
        } else {
            ExpirationStatus::Upcoming
        }
    }
}

impl std::fmt::Display for ExpirationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExpirationStatus::Expired => write!(f, "Expired"),
            ExpirationStatus::Upcoming => write!(f, "Upcoming"),
        }
    }
}

/// One row of the expiration report. Derived on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpirationEntry {
    pub id: String,
    pub name: String,
    #[serde(serialize_with = "as_date")]
    pub registration_date: Option<NaiveDateTime>,
    #[serde(serialize_with = "as_date")]
    pub modification_date: Option<NaiveDateTime>,
    #[serde(serialize_with = "as_required_date")]
    pub expiration_date: NaiveDateTime,
    pub days_remaining: i64,
    pub status: ExpirationStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
}

fn as_date<S: Serializer>(value: &Option<NaiveDateTime>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(dt) => serializer.serialize_str(&format_date(dt)),
        None => serializer.serialize_none(),
    }
}

fn as_required_date<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_date(value))
}
