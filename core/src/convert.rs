//! Normalisation of caller arguments into the string encodings DodoIS expects.
//!
//! Dates go out as `YYYY-MM-DD`, datetimes as `YYYY-MM-DDTHH:MM:SS` (zoned
//! values are converted to UTC first) and identifiers as 32-character hex
//! UUIDs without dashes. Callers may also pass pre-formatted strings, which
//! are forwarded untouched apart from dash stripping on identifiers.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use regex::Regex;
use uuid::Uuid;

use crate::error::{ApiError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Most identifiers DodoIS accepts in a single list parameter.
pub const MAX_IDS_PER_REQUEST: usize = 30;

/// A calendar date argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateValue {
    Date(NaiveDate),
    Raw(String),
}

impl DateValue {
    pub fn to_query(&self) -> String {
        match self {
            DateValue::Date(date) => date.format(DATE_FORMAT).to_string(),
            DateValue::Raw(raw) => raw.clone(),
        }
    }

    /// The date, when it is typed or parses as ISO 8601.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            DateValue::Date(date) => Some(*date),
            DateValue::Raw(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT).ok(),
        }
    }
}

impl From<NaiveDate> for DateValue {
    fn from(date: NaiveDate) -> Self {
        DateValue::Date(date)
    }
}

impl From<&str> for DateValue {
    fn from(raw: &str) -> Self {
        DateValue::Raw(raw.to_string())
    }
}

impl From<String> for DateValue {
    fn from(raw: String) -> Self {
        DateValue::Raw(raw)
    }
}

/// A point-in-time argument.
///
/// `Date` is kept distinct so endpoints that accept a bare day as the upper
/// bound receive `YYYY-MM-DD` rather than a midnight timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateTimeValue {
    Naive(NaiveDateTime),
    Date(NaiveDate),
    Raw(String),
}

impl DateTimeValue {
    pub fn to_query(&self) -> String {
        match self {
            DateTimeValue::Naive(datetime) => datetime.format(DATETIME_FORMAT).to_string(),
            DateTimeValue::Date(date) => date.format(DATE_FORMAT).to_string(),
            DateTimeValue::Raw(raw) => raw.clone(),
        }
    }

    /// The instant, when it is typed or parses as ISO 8601. Bare dates mean
    /// midnight.
    pub fn as_naive(&self) -> Option<NaiveDateTime> {
        match self {
            DateTimeValue::Naive(datetime) => Some(*datetime),
            DateTimeValue::Date(date) => Some(date.and_time(NaiveTime::MIN)),
            DateTimeValue::Raw(raw) => NaiveDateTime::parse_from_str(raw, DATETIME_FORMAT)
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(raw, DATE_FORMAT)
                        .ok()
                        .map(|date| date.and_time(NaiveTime::MIN))
                }),
        }
    }
}

impl From<NaiveDateTime> for DateTimeValue {
    fn from(datetime: NaiveDateTime) -> Self {
        DateTimeValue::Naive(datetime)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateTimeValue {
    fn from(datetime: DateTime<Tz>) -> Self {
        DateTimeValue::Naive(datetime.with_timezone(&Utc).naive_utc())
    }
}

impl From<NaiveDate> for DateTimeValue {
    fn from(date: NaiveDate) -> Self {
        DateTimeValue::Date(date)
    }
}

impl From<&str> for DateTimeValue {
    fn from(raw: &str) -> Self {
        DateTimeValue::Raw(raw.to_string())
    }
}

impl From<String> for DateTimeValue {
    fn from(raw: String) -> Self {
        DateTimeValue::Raw(raw)
    }
}

/// A UUID argument, typed or as text in either dashed or hex form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdValue {
    Uuid(Uuid),
    Raw(String),
}

impl IdValue {
    /// Hex form without dashes, the DodoIS default.
    pub fn to_hex(&self) -> String {
        match self {
            IdValue::Uuid(id) => id.simple().to_string(),
            IdValue::Raw(raw) => normalize_uuid(raw),
        }
    }

    /// Canonical dashed form. Raw text that is not a UUID is returned as-is.
    pub fn to_hyphenated(&self) -> String {
        match self {
            IdValue::Uuid(id) => id.hyphenated().to_string(),
            IdValue::Raw(raw) => Uuid::parse_str(raw)
                .map(|id| id.hyphenated().to_string())
                .unwrap_or_else(|_| raw.clone()),
        }
    }
}

impl From<Uuid> for IdValue {
    fn from(id: Uuid) -> Self {
        IdValue::Uuid(id)
    }
}

impl From<&str> for IdValue {
    fn from(raw: &str) -> Self {
        IdValue::Raw(raw.to_string())
    }
}

impl From<String> for IdValue {
    fn from(raw: String) -> Self {
        IdValue::Raw(raw)
    }
}

/// Strip every dash from a textual UUID.
pub fn normalize_uuid(raw: &str) -> String {
    raw.replace('-', "")
}

/// Comma-join identifiers in hex form, enforcing the per-request limit.
///
/// Returns `None` for an empty list so the parameter is omitted.
pub fn join_ids(name: &'static str, ids: &[IdValue]) -> Result<Option<String>> {
    if ids.len() > MAX_IDS_PER_REQUEST {
        return Err(ApiError::invalid(
            name,
            format!(
                "at most {MAX_IDS_PER_REQUEST} identifiers per request, got {}",
                ids.len()
            ),
        ));
    }
    if ids.is_empty() {
        return Ok(None);
    }
    Ok(Some(ids.iter().map(IdValue::to_hex).collect::<Vec<_>>().join(",")))
}

/// Comma-join plain strings, `None` when empty.
pub fn join_values<S: AsRef<str>>(values: &[S]) -> Option<String> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|value| value.as_ref()).collect::<Vec<&str>>().join(","))
}

/// Check `from < to` when both bounds are known.
pub fn ensure_ordered(name: &'static str, from: &DateTimeValue, to: &DateTimeValue) -> Result<()> {
    if let (Some(from), Some(to)) = (from.as_naive(), to.as_naive()) {
        if from >= to {
            return Err(ApiError::invalid(name, "period start must be before its end"));
        }
    }
    Ok(())
}

/// Check `from <= to` for optional date filters when both are known.
pub fn ensure_date_range(
    name: &'static str,
    from: Option<&DateValue>,
    to: Option<&DateValue>,
) -> Result<()> {
    let (Some(from), Some(to)) = (from.and_then(DateValue::as_date), to.and_then(DateValue::as_date))
    else {
        return Ok(());
    };
    if from > to {
        return Err(ApiError::invalid(name, "range start must not be after its end"));
    }
    Ok(())
}

static QUOTES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[«»"“”]"#).expect("valid regex"));
static LEGAL_FORM_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:ООО|ОАО|ЗАО|ИП)\s+").expect("valid regex"));

/// Clean a legal entity name: drop surrounding whitespace, quote characters
/// and a leading legal form such as `ООО`.
pub fn clean_legal_entity_name(value: &str) -> String {
    let value = QUOTES.replace_all(value.trim(), "");
    let value = LEGAL_FORM_PREFIX.replace(&value, "");
    value.trim().to_string()
}

pub fn clean_full_address(value: &str) -> String {
    value.trim().to_string()
}
