//! Cell type inference for CSV fields.

use std::sync::LazyLock;

use dsync_model::CellValue;
use regex::Regex;

/// Plain decimal or scientific notation, optionally negative, surrounding
/// whitespace allowed. Hex, `inf`, `NaN` and leading `+` stay text.
static NUMERIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").expect("Invalid numeric regex")
});

/// Largest magnitude converted to a number (2^53). Longer digit strings,
/// such as account or phone numbers, keep their exact text.
const MAX_EXACT_FLOAT: f64 = 9_007_199_254_740_992.0;

/// Infers a typed cell from a raw CSV field.
///
/// - empty field → `Empty`
/// - `true`/`TRUE`/`false`/`FALSE` → `Bool`
/// - numeric literal within ±2^53 → `Number`
/// - anything else → `Text` (verbatim)
pub fn infer_cell(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Empty;
    }

    match field {
        "true" | "TRUE" => return CellValue::Bool(true),
        "false" | "FALSE" => return CellValue::Bool(false),
        _ => {}
    }

    if NUMERIC_REGEX.is_match(field)
        && let Ok(n) = field.trim().parse::<f64>()
        && n.abs() < MAX_EXACT_FLOAT
    {
        return CellValue::Number(n);
    }

    CellValue::Text(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers() {
        assert_eq!(infer_cell("30"), CellValue::Number(30.0));
        assert_eq!(infer_cell("-2.5"), CellValue::Number(-2.5));
        assert_eq!(infer_cell(".5"), CellValue::Number(0.5));
        assert_eq!(infer_cell("1e3"), CellValue::Number(1000.0));
        assert_eq!(infer_cell(" 42 "), CellValue::Number(42.0));
    }

    #[test]
    fn test_not_numbers() {
        for s in ["1,000", "0x1F", "inf", "NaN", "+5", "12abc", "1.2.3", "98765432109876543210"] {
            assert_eq!(infer_cell(s), CellValue::text(s), "{s}");
        }
    }

    #[test]
    fn test_booleans() {
        assert_eq!(infer_cell("true"), CellValue::Bool(true));
        assert_eq!(infer_cell("FALSE"), CellValue::Bool(false));
        assert_eq!(infer_cell("True"), CellValue::text("True"));
        assert_eq!(infer_cell("yes"), CellValue::text("yes"));
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(infer_cell(""), CellValue::Empty);
        assert_eq!(infer_cell("  "), CellValue::text("  "));
    }
}
