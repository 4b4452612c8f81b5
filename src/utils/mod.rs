//! Utility functions

/// Format a monetary amount as a dollar string with thousands separators,
/// e.g. `1000000` -> `"$1,000,000"`.
pub fn format_budget(amount: i64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, c) in digits.chars().enumerate() {
        if i > 0 && c.is_ascii_digit() && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}", grouped)
}

/// Decode a JSON-encoded string list stored in a text column.
///
/// Columns like `genres` hold text such as `["Drama", "Crime"]`. Text that
/// is missing, does not start with `[`/`{` after trimming, fails to parse,
/// or is not an array of strings decodes to an empty list rather than an
/// error.
pub fn decode_string_list(raw: Option<&str>) -> Vec<String> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let trimmed = raw.trim();
    if !trimmed.starts_with('[') && !trimmed.starts_with('{') {
        return Vec::new();
    }

    serde_json::from_str(trimmed).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_budget() {
        assert_eq!(format_budget(0), "$0");
        assert_eq!(format_budget(999), "$999");
        assert_eq!(format_budget(1000), "$1,000");
        assert_eq!(format_budget(1000000), "$1,000,000");
        assert_eq!(format_budget(25000000), "$25,000,000");
        assert_eq!(format_budget(1234567), "$1,234,567");
    }

    #[test]
    fn test_decode_string_list() {
        assert_eq!(decode_string_list(Some(r#"["Action"]"#)), vec!["Action"]);
        assert_eq!(
            decode_string_list(Some(r#"  ["Drama", "Crime"]  "#)),
            vec!["Drama", "Crime"]
        );
        assert_eq!(decode_string_list(Some("not json")), Vec::<String>::new());
        assert_eq!(decode_string_list(None), Vec::<String>::new());
        assert_eq!(decode_string_list(Some("")), Vec::<String>::new());
    }

    #[test]
    fn test_decode_string_list_malformed_structured() {
        // Looks structured but is broken or not a string array
        assert_eq!(decode_string_list(Some("[broken")), Vec::<String>::new());
        assert_eq!(
            decode_string_list(Some(r#"[{"id": 18}]"#)),
            Vec::<String>::new()
        );
        assert_eq!(
            decode_string_list(Some(r#"{"name": "Drama"}"#)),
            Vec::<String>::new()
        );
    }
}
