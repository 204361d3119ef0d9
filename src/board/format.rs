//! Date parsing and display formatting for card fields.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use crm_common::Record;

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse a backend timestamp. Offsets are folded into UTC; naive timestamps
/// and bare dates are taken as-is.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn record_timestamp(record: &Record, field: &str) -> Option<NaiveDateTime> {
    record.text(field).as_deref().and_then(parse_timestamp)
}

/// 00:00:00.000 of `date`.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// 23:59:59.999 of `date`.
pub fn day_end(date: NaiveDate) -> NaiveDateTime {
    day_start(date) + TimeDelta::days(1) - TimeDelta::milliseconds(1)
}

/// `M/D/YYYY`, or `-` when the field is missing or unparsable.
pub fn display_date(record: &Record, field: &str) -> String {
    match record_timestamp(record, field) {
        Some(ts) => format!("{}/{}/{}", ts.month(), ts.day(), ts.year()),
        None => "-".to_string(),
    }
}

/// US-dollar amount with thousands separators: `$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
