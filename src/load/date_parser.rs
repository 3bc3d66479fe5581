use chrono::NaiveDate;

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Parse the date part of `"YYYY-MM-DD"`, `"YYYY/MM/DD"` or `"MM/DD/YYYY"`,
/// ignoring any trailing time (`" hh:mm:ss"` or `"Thh:mm:ss"`).
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let date_part = raw.trim().split([' ', 'T']).next().unwrap_or("");
    if date_part.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
}
