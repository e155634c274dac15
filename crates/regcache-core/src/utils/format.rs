use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime};

/// Wire format used by the registry for date-time fields
pub const REMOTE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Wire format used by the registry for date-only fields
pub const REMOTE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a date or date-time string as sent by the registry.
///
/// Accepts `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD`, ISO `YYYY-MM-DDTHH:MM:SS` and
/// RFC 3339 (converted to local wall-clock time). Empty strings and the
/// registry's zero dates yield `None`.
pub fn parse_remote_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() || value.starts_with("0000-00-00") {
        return None;
    }

    if let Ok(dt) = NaiveDateTime::parse_from_str(value, REMOTE_DATETIME_FORMAT) {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    NaiveDate::parse_from_str(value, REMOTE_DATE_FORMAT)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

/// Format a date-time the way the registry expects it
pub fn format_remote_datetime(value: &NaiveDateTime) -> String {
    value.format(REMOTE_DATETIME_FORMAT).to_string()
}

/// Format the date part only (YYYY-MM-DD)
pub fn format_date(value: &NaiveDateTime) -> String {
    value.format(REMOTE_DATE_FORMAT).to_string()
}

/// Format an optional date, returning a default if None
pub fn format_optional_date(value: Option<&NaiveDateTime>, default: &str) -> String {
    value.map(format_date).unwrap_or_else(|| default.to_string())
}

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
