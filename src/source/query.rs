//! Search URL construction.

/// Append the user's search text to a base query URL.
///
/// The base URL is expected to already end in the query parameter that takes
/// the search term (e.g. `...&q=`).  Whitespace inside the search text becomes
/// `+`; nothing else is escaped.  Empty or whitespace-only text returns the
/// base URL unchanged, which asks the API for its default result page.
pub fn build_search_url(base_query_url: &str, search_text: &str) -> String {
    let term = search_text.trim();
    if term.is_empty() {
        return base_query_url.to_string();
    }

    let term: String = term
        .chars()
        .map(|c| if c.is_whitespace() { '+' } else { c })
        .collect();

    format!("{base_query_url}{term}")
}
