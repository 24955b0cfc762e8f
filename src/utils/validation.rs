//! Input validation utilities
//!
//! Turns the raw audit log query string into an [`AuditLogFilter`].
//! Fields are checked in a fixed order and the first failure is reported:
//! `staff_id`, `start_date`, `end_date`, `limit`, `offset`.

use std::num::IntErrorKind;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use thiserror::Error;

use crate::models::{AuditLogFilter, AuditLogParams, MAX_PAGE_SIZE};

/// A query parameter that could not be parsed or was out of range.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid {field} parameter")]
pub struct InvalidParameter {
    pub field: &'static str,
}

impl InvalidParameter {
    pub fn new(field: &'static str) -> Self {
        Self { field }
    }
}

/// Validate raw audit log parameters and build the store filter.
pub fn validate_audit_log_params(
    params: &AuditLogParams,
) -> Result<AuditLogFilter, InvalidParameter> {
    let staff_id = present(&params.staff_id)
        .map(|raw| raw.parse::<i64>().map_err(|_| InvalidParameter::new("staff_id")))
        .transpose()?;

    let entity_type = exact(&params.entity_type);
    let entity_id = exact(&params.entity_id);
    let action_type = exact(&params.action_type);

    let start_date = present(&params.start_date)
        .map(|raw| {
            parse_calendar_day(raw)
                .map(start_of_day)
                .ok_or(InvalidParameter::new("start_date"))
        })
        .transpose()?;

    let end_date = present(&params.end_date)
        .map(|raw| {
            parse_calendar_day(raw)
                .and_then(end_of_day)
                .ok_or(InvalidParameter::new("end_date"))
        })
        .transpose()?;

    let limit = present(&params.limit).map(parse_limit).transpose()?;
    let offset = present(&params.offset).map(parse_offset).transpose()?;

    Ok(AuditLogFilter {
        staff_id,
        entity_type,
        entity_id,
        action_type,
        start_date,
        end_date,
        limit,
        offset,
    })
}

/// Empty values are treated the same as a missing parameter.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Exact-match filters keep their value byte for byte; only `""` is absent.
fn exact(value: &Option<String>) -> Option<String> {
    value.clone().filter(|v| !v.is_empty())
}

fn parse_limit(raw: &str) -> Result<u32, InvalidParameter> {
    match raw.parse::<i64>() {
        Ok(limit) if limit >= 1 => Ok(limit.min(i64::from(MAX_PAGE_SIZE)) as u32),
        // Too large for i64 is still a positive integer, so it clamps too.
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Ok(MAX_PAGE_SIZE),
        _ => Err(InvalidParameter::new("limit")),
    }
}

fn parse_offset(raw: &str) -> Result<u64, InvalidParameter> {
    match raw.parse::<i64>() {
        Ok(offset) if offset >= 0 => Ok(offset as u64),
        _ => Err(InvalidParameter::new("offset")),
    }
}

/// Resolve a date or date-time string to its UTC calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps with any offset and naive
/// `YYYY-MM-DDTHH:MM:SS[.fff]` timestamps, which are taken to be UTC.
/// Days outside years 0000-9999 are rejected: stored timestamps are
/// compared as text and only four-digit years sort correctly.
pub fn parse_calendar_day(raw: &str) -> Option<NaiveDate> {
    parse_any_day(raw).filter(|date| (0..=9999).contains(&date.year()))
}

fn parse_any_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|dt| dt.date())
}

/// 00:00:00.000 UTC of the given day.
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// 23:59:59.999 UTC of the given day, `None` past the last representable day.
pub fn end_of_day(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.succ_opt()
        .map(start_of_day)?
        .checked_sub_signed(Duration::milliseconds(1))
}
