//! Query normalization against the prompt catalog.

use std::borrow::Cow;

use vetllm_core::Catalog;

/// Replace a bare prompt keyword with its template.
///
/// The query is trimmed and lower-cased for the lookup only. On an exact
/// keyword match the template text is returned; otherwise the query is
/// returned untouched.
pub fn normalize_query<'a>(catalog: &'a Catalog, query: &'a str) -> Cow<'a, str> {
    let key = query.trim().to_lowercase();
    match catalog.template(&key) {
        Some(template) => {
            tracing::info!(query = %query, template = %template, "Normalizing query");
            Cow::Borrowed(template)
        }
        None => Cow::Borrowed(query),
    }
}
