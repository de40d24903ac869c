//! Query-string primitives shared by the read endpoints.
//!
//! Every field arrives as an optional string so a missing or empty value can
//! be reported as a missing parameter before anything touches the database.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::errors::AppError;

/// Return the trimmed value of a required parameter.
pub fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, AppError> {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::MissingParameter(name.to_string())),
    }
}

/// Parse a required integer identifier.
pub fn required_id(value: &Option<String>, name: &str) -> Result<i32, AppError> {
    let raw = required(value, name)?;
    raw.parse()
        .map_err(|_| AppError::Validation(format!("{name} must be an integer, got '{raw}'")))
}

/// Parse a required RFC 3339 timestamp.
pub fn required_timestamp(value: &Option<String>, name: &str) -> Result<DateTime<Utc>, AppError> {
    let raw = required(value, name)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| AppError::Validation(format!("{name} must be an RFC 3339 timestamp, got '{raw}'")))
}

/// Inclusive reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// `?startDate=..&endDate=..`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DateRangeQuery {
    pub fn parse(&self) -> Result<DateRange, AppError> {
        Ok(DateRange {
            start: required_timestamp(&self.start_date, "startDate")?,
            end: required_timestamp(&self.end_date, "endDate")?,
        })
    }
}

/// `?stateId=..&startDate=..&endDate=..`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRangeQuery {
    pub state_id: Option<String>,
    #[serde(flatten)]
    pub range: DateRangeQuery,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub role_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestQuery {
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementQuery {
    pub requirement_type: Option<String>,
}
