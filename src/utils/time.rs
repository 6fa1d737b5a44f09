use chrono::{DateTime, Local, NaiveDate, Utc};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Timestamp fragment embedded in export file names.
pub fn file_stamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M").to_string()
}

/// Normalises ISO-ish date strings ("2026-03-01", "2026-03-01T10:00:00Z",
/// "2026-03-01 10:00") to a calendar date by reading the leading `YYYY-MM-DD`.
pub fn date_from_iso(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc).date_naive());
    }
    let head = raw.get(..10)?;
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Unix epoch seconds to a UTC calendar date.
pub fn date_from_epoch(seconds: f64) -> Option<NaiveDate> {
    if !seconds.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp(seconds as i64, 0).map(|dt| dt.date_naive())
}
