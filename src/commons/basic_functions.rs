use serde_json::Value;

/// Normalize an identifier cell read from a table.
///
/// Trims whitespace and collapses integral floating-point spellings
/// ("12.0") to their integer form so that identifiers coming from CSV
/// tables and GeoJSON properties compare equal.
pub fn normalize_id_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.contains('.') {
        if let Ok(v) = trimmed.parse::<f64>() {
            if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                return (v as i64).to_string();
            }
        }
    }
    trimmed.to_string()
}

/// Normalize an identifier property read from a GeoJSON feature.
///
/// Accepts integer-valued JSON numbers and strings; anything else
/// (booleans, arrays, fractional numbers) is rejected.
pub fn normalize_id(value: &Value) -> Option<String> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else {
                n.as_f64().filter(|v| v.fract() == 0.0).map(|v| (v as i64).to_string())
            }
        }
        Value::String(s) => {
            let normalized = normalize_id_str(s);
            if normalized.is_empty() {
                None
            } else {
                Some(normalized)
            }
        }
        _ => None,
    }
}

/// Sentence-case a class slug: underscores become spaces, the first
/// character is uppercased and the rest lowercased.
pub fn sentence_case(slug: &str) -> String {
    let spaced = slug.replace('_', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_id_str() {
        assert_eq!(normalize_id_str(" 42 "), "42");
        assert_eq!(normalize_id_str("42.0"), "42");
        assert_eq!(normalize_id_str("42.5"), "42.5");
        assert_eq!(normalize_id_str("obj_7"), "obj_7");
    }

    #[test]
    fn test_normalize_id() {
        assert_eq!(normalize_id(&json!(42)), Some("42".to_string()));
        assert_eq!(normalize_id(&json!(42.0)), Some("42".to_string()));
        assert_eq!(normalize_id(&json!("42.0")), Some("42".to_string()));
        assert_eq!(normalize_id(&json!(42.5)), None);
        assert_eq!(normalize_id(&json!(true)), None);
        assert_eq!(normalize_id(&json!("")), None);
    }

    #[test]
    fn test_sentence_case() {
        assert_eq!(sentence_case("closed_canopy"), "Closed canopy");
        assert_eq!(sentence_case("Closed canopy"), "Closed canopy");
        assert_eq!(sentence_case("WATER"), "Water");
        assert_eq!(sentence_case(""), "");
    }
}
