use chrono::{DateTime, Local};

pub fn date_time_as_string(dt: Option<DateTime<Local>>, format: Option<&str>) -> String {
    dt.unwrap_or(Local::now())
        .format(format.unwrap_or("%Y%m%d_%H%M%S"))
        .to_string()
}

pub fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Strips one pair of surrounding double quotes, if present.
pub fn strip_quotes(input: &str) -> &str {
    let trimmed = input.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(trimmed)
}

/// Leading `[A-Za-z0-9]` run of a file stem, upper-cased.
pub fn leading_alphanumeric(input: &str) -> Option<String> {
    let prefix: String = input
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if prefix.is_empty() {
        None
    } else {
        Some(prefix.to_uppercase())
    }
}

pub fn placeholder_series_name(code: &str) -> String {
    format!("Series {}", code)
}

pub fn format_percentage(pct: f64) -> String {
    if pct == 0.0 {
        "0%".to_string()
    } else if pct >= 100.0 {
        "100%".to_string()
    } else {
        format!("{:.1}%", pct)
    }
}
