use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::Serialize;

const LOCAL_FORMAT: &str = "%d %b %Y, %I:%M %p";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DisplayedDate {
    pub local: String,
    pub relative: String,
}

/// Viewer offset from a `tz_offset_minutes` query value. Anything outside
/// ±14h falls back to UTC.
pub fn viewer_offset(offset_minutes: Option<i32>) -> FixedOffset {
    offset_minutes
        .filter(|m| m.abs() <= 14 * 60)
        .and_then(|m| FixedOffset::east_opt(m * 60))
        .unwrap_or_else(|| Utc.fix())
}

pub fn display(ts: DateTime<Utc>, offset: FixedOffset, now: DateTime<Utc>) -> DisplayedDate {
    DisplayedDate {
        local: ts.with_timezone(&offset).format(LOCAL_FORMAT).to_string(),
        relative: time_ago(ts, now),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

pub fn time_ago(ts: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let seconds = (now - ts).num_seconds();
    if seconds < 60 {
        return "just now".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return plural(minutes, "minute");
    }

    let hours = minutes / 60;
    if hours < 24 {
        return plural(hours, "hour");
    }

    let days = hours / 24;
    if days < 30 {
        plural(days, "day")
    } else if days < 365 {
        plural(days / 30, "month")
    } else {
        plural(days / 365, "year")
    }
}

/// Parse the timestamp shapes the backend emits: RFC 3339, or a naive
/// `YYYY-MM-DD HH:MM:SS` / `YYYY-MM-DD` taken as UTC.
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
