use std::sync::OnceLock;

use chrono::NaiveDate;
use regex_lite::Regex;

use super::ServiceError;

fn date_only() -> &'static Regex {
    static DATE_ONLY_RE: OnceLock<Regex> = OnceLock::new();
    DATE_ONLY_RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date regex"))
}

/// True when the value has the exact `YYYY-MM-DD` shape
pub fn is_date_only(value: &str) -> bool {
    date_only().is_match(value)
}

/// Prepare a date column for writing.
///
/// Empty input means the column is left out of the payload. A `YYYY-MM-DD`
/// value becomes the UTC start of that day (`YYYY-MM-DDT00:00:00Z`); anything
/// else is sent as given and left for SharePoint to interpret.
pub fn normalize_date(value: &str) -> Result<Option<String>, ServiceError> {
    if value.is_empty() {
        return Ok(None);
    }
    if !is_date_only(value) {
        return Ok(Some(value.to_string()));
    }

    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| ServiceError::Other(format!("Failed to add project: invalid date \"{}\"", value)))?;

    Ok(Some(format!("{}T00:00:00Z", date.format("%Y-%m-%d"))))
}

/// Date part of a stored value for display; values without one are shown as stored
pub fn display_date(value: &str) -> &str {
    match value.get(..10) {
        Some(prefix) if is_date_only(prefix) && (value.len() == 10 || value[10..].starts_with('T')) => prefix,
        _ => value,
    }
}
