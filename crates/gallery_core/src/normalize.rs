use url::Url;

/// Normalizes an image source for duplicate detection.
///
/// Absolute references are parsed, the query is stripped, a single trailing
/// slash is dropped, and the result is lowercased. References that do not
/// parse as absolute URLs (local paths, relative sources) get the same
/// stripping applied to the raw string.
pub fn normalize_source_for_dedupe(raw: &str) -> String {
    let trimmed = raw.trim();
    let without_query = match Url::parse(trimmed) {
        Ok(mut url) => {
            url.set_query(None);
            url.set_fragment(None);
            url.to_string()
        }
        Err(_) => trimmed
            .split(['?', '#'])
            .next()
            .unwrap_or(trimmed)
            .to_string(),
    };
    let stripped = without_query
        .strip_suffix('/')
        .unwrap_or(&without_query);
    stripped.to_lowercase()
}
