/// Spellings of a blank value that some exporters write out.
const MISSING_MARKERS: [&str; 3] = ["na", "n/a", "nan"];

/// Parse a numeric cell, tolerating thousands separators (`"1,234,567"`).
/// Empty cells and `NA` / `N/A` / `NaN` (any case) are `None`.
pub fn parse_number(raw: &str) -> Option<Result<f64, std::num::ParseFloatError>> {
    let cleaned = raw.trim().replace(',', "");
    if cleaned.is_empty()
        || MISSING_MARKERS
            .iter()
            .any(|m| cleaned.eq_ignore_ascii_case(m))
    {
        return None;
    }
    Some(cleaned.parse::<f64>())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_handles_separators_and_blanks() {
        assert_eq!(parse_number("1,234.5"), Some(Ok(1234.5)));
        assert_eq!(parse_number("  "), None);
        assert!(matches!(parse_number("lots"), Some(Err(_))));
    }

    #[test]
    fn missing_markers_are_blank() {
        for raw in ["NA", "na", "N/A", "n/a", " NaN ", "nan"] {
            assert_eq!(parse_number(raw), None, "{raw}");
        }
        assert!(matches!(parse_number("NAN1"), Some(Err(_))));
    }
}
