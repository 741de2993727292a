//! Date helper functions

use chrono::{DateTime, NaiveDate, Utc};

/// Format a date with a strftime or Moment.js style format string
///
/// # Examples
/// ```ignore
/// format_date(&date, "%B %-d, %Y") // -> "January 5, 2024"
/// format_date(&date, "YYYY-MM-DD") // -> "2024-01-05"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    if format.contains('%') {
        date.format(format).to_string()
    } else {
        date.format(&moment_to_chrono_format(format)).to_string()
    }
}

/// Value for a `<time datetime>` attribute
pub fn date_iso(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Midnight UTC of a date, for feeds
pub fn date_utc(date: &NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(0, 0, 0)
        .unwrap_or_default()
        .and_utc()
}

/// RFC 2822 date as used by RSS `pubDate`
pub fn date_rfc2822(date: &NaiveDate) -> String {
    date_utc(date).to_rfc2822()
}

/// Convert Moment.js format to chrono format
fn moment_to_chrono_format(format: &str) -> String {
    let replacements = [
        ("YYYY", "%Y"),
        ("YY", "%y"),
        ("MMMM", "%B"),
        ("MMM", "%b"),
        ("MM", "%m"),
        ("DD", "%d"),
        ("Do", "%-d"),
        ("D", "%-d"),
        ("dddd", "%A"),
        ("ddd", "%a"),
    ];

    let mut result = format.to_string();

    for (from, to) in replacements {
        result = result.replace(from, to);
    }

    result
}
