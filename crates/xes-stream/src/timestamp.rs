//! Default parser for `<date>` attribute values.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};

use crate::traits::TimestampParser;

/// Offset formats tried after RFC 3339, for offsets written without a colon.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Offset-less formats, read as UTC.
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parses RFC 3339 timestamps with some common relaxations.
///
/// Accepted:
/// - RFC 3339 with any fractional precision (`2023-04-28T17:18:20.0747454+02:00`)
/// - offsets without a colon (`+0200`)
/// - a space instead of `T`
/// - timestamps and plain dates without an offset, taken as UTC
#[derive(Debug, Clone, Copy, Default)]
pub struct Rfc3339TimestampParser;

impl TimestampParser for Rfc3339TimestampParser {
    fn parse_timestamp(&self, text: &str) -> Option<DateTime<FixedOffset>> {
        let text = text.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
            return Some(parsed);
        }
        if let Some(parsed) = OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(text, format).ok())
        {
            return Some(parsed);
        }
        let naive = NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .ok()
                    .and_then(|date| date.and_hms_opt(0, 0, 0))
            })?;
        Some(naive.and_utc().fixed_offset())
    }
}
