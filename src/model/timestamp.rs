//! Timestamp parsing and formatting
//!
//! Sitemaps declare `<lastmod>` in a handful of loosely-followed formats, while
//! the incremental index needs a lossless text encoding. Both live here.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Offset-aware formats tried after RFC 3339
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M%:z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// Formats without an offset; parsed values are taken as UTC
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parses a sitemap `<lastmod>` value
///
/// Accepts W3C datetime / RFC 3339 (with or without seconds), naive ISO-8601
/// datetimes, `YYYY-MM-DD`, `YYYY-MM`, `YYYY` and RFC 2822 dates. The declared
/// offset is kept; values without one are interpreted as UTC.
///
/// # Returns
///
/// * `Some(DateTime)` - The parsed timestamp
/// * `None` - The value is empty or not a recognizable date
pub fn parse_last_modified(raw: &str) -> Option<DateTime<FixedOffset>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed);
    }

    // `%:z` does not accept a `Z` designator
    let zoned = raw
        .strip_suffix('Z')
        .or_else(|| raw.strip_suffix('z'))
        .map(|rest| format!("{}+00:00", rest));
    let offset_input = zoned.as_deref().unwrap_or(raw);
    for format in OFFSET_FORMATS {
        if let Ok(parsed) = DateTime::parse_from_str(offset_input, format) {
            return Some(parsed);
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc().fixed_offset());
        }
    }

    if let Some(date) = parse_partial_date(raw) {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|midnight| midnight.and_utc().fixed_offset());
    }

    DateTime::parse_from_rfc2822(raw).ok()
}

/// Parses `YYYY-MM-DD`, `YYYY-MM` and `YYYY`
fn parse_partial_date(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }

    match raw.len() {
        7 => NaiveDate::parse_from_str(&format!("{}-01", raw), "%Y-%m-%d").ok(),
        4 if raw.chars().all(|c| c.is_ascii_digit()) => {
            let year = raw.parse::<i32>().ok()?;
            NaiveDate::from_ymd_opt(year, 1, 1)
        }
        _ => None,
    }
}

/// Encodes a timestamp for the incremental index
///
/// Uses RFC 3339 with as many fractional digits as needed, so decoding with
/// [`parse_index_timestamp`] returns the exact same instant.
pub fn format_index_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Decodes a timestamp read back from the incremental index
///
/// Besides RFC 3339, naive ISO-8601 values (`2024-01-01T10:00:00.123456`)
/// written by other producers are accepted and interpreted as UTC.
pub fn parse_index_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
