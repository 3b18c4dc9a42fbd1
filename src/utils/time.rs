use chrono::{NaiveDate, NaiveTime};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

fn numeric_parts(raw: &str) -> Option<Vec<u32>> {
    let parts: Vec<&str> = raw.trim().split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    parts
        .iter()
        .map(|p| {
            if p.is_empty() || p.len() > 2 || !p.chars().all(|c| c.is_ascii_digit()) {
                None
            } else {
                p.parse().ok()
            }
        })
        .collect()
}

/// `8:5` → `08:05:00`, `08:15` → `08:15:00`. Anything that is not two or three
/// colon-separated numbers is returned trimmed but otherwise unchanged.
pub fn normalize_time(raw: &str) -> String {
    match numeric_parts(raw) {
        Some(parts) => format!(
            "{:02}:{:02}:{:02}",
            parts[0],
            parts[1],
            parts.get(2).copied().unwrap_or(0)
        ),
        None => raw.trim().to_string(),
    }
}

/// `08:15:00` → `08:15`.
pub fn to_minutes(raw: &str) -> String {
    match numeric_parts(raw) {
        Some(parts) => format!("{:02}:{:02}", parts[0], parts[1]),
        None => raw.trim().to_string(),
    }
}

/// Accepts `HH:MM` or `HH:MM:SS`.
pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let parts = numeric_parts(raw)?;
    NaiveTime::from_hms_opt(parts[0], parts[1], parts.get(2).copied().unwrap_or(0))
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

/// Sort key combining date and normalized time: `2026-01-05T08:15:00`.
pub fn sort_key(date: &str, time: &str) -> String {
    format!("{}T{}", date.trim(), normalize_time(time))
}
