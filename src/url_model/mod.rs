//! URL modeling for console routes and API links.
//!
//! Decomposes host addresses into [`UrlParts`], converts query parameter maps
//! to and from query strings, and extracts document ids from self links.

mod document;
mod parts;
mod query;

pub use document::document_id;
pub use parts::{UrlError, UrlParts};
pub use query::{decode, encode, DecodedParams, Params, QueryError, QueryParams, QueryValue};

/// Appends `?query` to a route hash when `options` encode to a non-empty query.
///
/// # Examples
///
/// - `hash_with_query("#/hosts", None)` → `"#/hosts"`
/// - `hash_with_query("#/hosts", Some(&[("any", "web")].into_iter().collect()))` → `"#/hosts?any=web"`
pub fn hash_with_query(hash: &str, options: Option<&QueryParams>) -> String {
    let query = options.map(encode).unwrap_or_default();
    if query.is_empty() {
        hash.to_string()
    } else {
        format!("{hash}?{query}")
    }
}
