use chrono::{DateTime, NaiveDate, NaiveTime, Utc};

use crate::error::ServiceError;

/// Resolve the `as_of` query parameter into the evaluation instant.
///
/// `as_of` is a `YYYY-MM-DD` date and maps to midnight UTC; absent means now.
pub fn resolve_now(as_of: Option<&str>) -> Result<DateTime<Utc>, ServiceError> {
    match as_of.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Utc::now()),
        Some(value) => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| date.and_time(NaiveTime::MIN).and_utc())
            .map_err(|_| {
                ServiceError::BadRequest(format!("Invalid as_of date {:?}, expected YYYY-MM-DD", value))
            }),
    }
}
