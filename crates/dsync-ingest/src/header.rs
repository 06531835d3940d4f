//! Header normalization.

use std::collections::HashSet;

/// Normalizes raw header cells into unique column names.
///
/// - Values are trimmed.
/// - A blank header becomes `column_<n>` (1-based position).
/// - A repeated header gets a numeric suffix: `a`, `a_1`, `a_2`.
pub fn normalize_headers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: HashSet<String> = HashSet::new();
    let mut headers = Vec::new();

    for (idx, value) in raw.into_iter().enumerate() {
        let trimmed = value.as_ref().trim();
        let base = if trimmed.is_empty() {
            format!("column_{}", idx + 1)
        } else {
            trimmed.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while seen.contains(&name) {
            name = format!("{base}_{suffix}");
            suffix += 1;
        }
        seen.insert(name.clone());
        headers.push(name);
    }

    headers
}
