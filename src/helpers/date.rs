//! Date helper functions

use chrono::{DateTime, Datelike, FixedOffset, TimeZone, Utc};

use crate::i18n::I18n;

/// Parse a CMS timestamp.
///
/// Accepts RFC 3339 (`2023-05-10T00:00:00Z`, `+00:00`) and the compact
/// offset the CMS emits (`2021-03-25T19:25:28+0000`).
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    let value = value.trim();
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::<FixedOffset>::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z"))
        .map(|date| date.with_timezone(&Utc))
}

/// Format a date as `dd MMM yyyy` with a localized month abbreviation
///
/// # Examples
/// ```ignore
/// format_date(&date, &chrono_tz::UTC, &I18n::new("pt-BR")) // -> "10 mai 2023"
/// ```
pub fn format_date<Tz: TimeZone>(date: &DateTime<Utc>, tz: &Tz, i18n: &I18n) -> String {
    let local = date.with_timezone(tz);
    format!(
        "{:02} {} {}",
        local.day(),
        i18n.month_abbr(local.month()),
        local.year()
    )
}

/// Display string for an optional, unparsed publication date.
///
/// Unpublished documents carry no date; they, and unparseable values,
/// render as an empty string.
pub fn display_date<Tz: TimeZone>(raw: Option<&str>, tz: &Tz, i18n: &I18n) -> String {
    let Some(raw) = raw else {
        return String::new();
    };

    match parse_timestamp(raw) {
        Ok(date) => format_date(&date, tz, i18n),
        Err(e) => {
            tracing::warn!("Unparseable publication date {:?}: {}", raw, e);
            String::new()
        }
    }
}

/// Format a date in ISO 8601 / XML format, for `<time datetime>`
pub fn date_xml(date: &DateTime<Utc>) -> String {
    date.format("%Y-%m-%dT%H:%M:%S%.3f%:z").to_string()
}
