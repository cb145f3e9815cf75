//! FTS5 match expression construction.

/// Joins tokens into `"t1"* AND "t2"* ...`. Embedded double quotes are stripped rather than
/// rejected. Returns `None` when nothing survives, since an empty expression must never reach
/// the index.
pub fn build_match_expression<S: AsRef<str>>(tokens: &[S]) -> Option<String> {
    let terms: Vec<String> = tokens
        .iter()
        .map(|t| t.as_ref().replace('"', ""))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{}\"*", t))
        .collect();

    if terms.is_empty() {
        None
    } else {
        Some(terms.join(" AND "))
    }
}
