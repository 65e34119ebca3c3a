//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use chrono::{DateTime, Utc};

/// Format a timestamp as `YYYY-MM-DD HH:MM`.
///
/// Usage in templates: `{{ value|datetime_short }}`
#[askama::filter_fn]
pub fn datetime_short(
    value: &DateTime<Utc>,
    _env: &dyn askama::Values,
) -> askama::Result<String> {
    Ok(value.format("%Y-%m-%d %H:%M").to_string())
}

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(
    _value: impl std::fmt::Display,
    _env: &dyn askama::Values,
) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(Utc::now().year())
}
