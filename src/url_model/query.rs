//! Query string codec for console routes.
//!
//! Encoding expands list values into repeated `key=value` pairs. Decoding
//! never rebuilds lists: a repeated key keeps its last value.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left as-is when escaping a key or value; everything else is
/// percent-encoded, so `&`, `=`, `#` and `?` inside values survive a round trip.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A query string that cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// A `%` not followed by two hex digits.
    #[error("malformed percent escape in {component:?}")]
    InvalidEscape { component: String },
    #[error("escaped bytes are not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),
}

/// A query parameter value: one string, or a list emitted as repeated pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl<S: Into<String>> From<Vec<S>> for QueryValue {
    fn from(values: Vec<S>) -> Self {
        QueryValue::Multi(values.into_iter().map(Into::into).collect())
    }
}

/// Insertion-ordered parameter map. Re-inserting a key replaces its value in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Params<V> {
    entries: Vec<(String, V)>,
    /// Key → position in `entries`.
    index: HashMap<String, usize>,
}

/// Parameters to encode.
pub type QueryParams = Params<QueryValue>;

/// Parameters decoded from a query string; `None` for a part without `=`.
pub type DecodedParams = Params<Option<String>>;

impl<V> Default for Params<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V> Params<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, returning the previous value if the key was already present.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<V>) -> Option<V> {
        let value = value.into();
        match self.index.entry(key.into()) {
            Entry::Occupied(slot) => {
                Some(std::mem::replace(&mut self.entries[*slot.get()].1, value))
            }
            Entry::Vacant(slot) => {
                let position = self.entries.len();
                self.entries.push((slot.key().clone(), value));
                slot.insert(position);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DecodedParams {
    /// Decoded value of `key`; `None` when the key is missing or had no `=`.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(|v| v.as_deref())
    }
}

impl<K: Into<String>, V, T: Into<V>> FromIterator<(K, T)> for Params<V> {
    fn from_iter<I: IntoIterator<Item = (K, T)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (key, value) in iter {
            params.insert(key, value);
        }
        params
    }
}

fn escape(component: &str) -> String {
    utf8_percent_encode(component, COMPONENT).to_string()
}

fn unescape(component: &str) -> Result<String, QueryError> {
    let bytes = component.as_bytes();
    let well_formed = bytes
        .iter()
        .enumerate()
        .filter(|&(_, &b)| b == b'%')
        .all(|(i, _)| {
            bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
        });
    if !well_formed {
        return Err(QueryError::InvalidEscape {
            component: component.to_string(),
        });
    }
    Ok(percent_decode_str(component).decode_utf8()?.into_owned())
}

/// Encodes `params` as `key=value` pairs joined by `&`, in insertion order.
///
/// `{a: ["x", "y"], b: "z w"}` → `a=x&a=y&b=z%20w`; an empty map → `""`.
pub fn encode(params: &QueryParams) -> String {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params.iter() {
        let key = escape(key);
        match value {
            QueryValue::Single(v) => pairs.push(format!("{key}={}", escape(v))),
            QueryValue::Multi(values) => {
                pairs.extend(values.iter().map(|v| format!("{key}={}", escape(v))));
            }
        }
    }
    pairs.join("&")
}

/// Decodes a query string (without leading `?`).
///
/// Empty parts are skipped, each part is split on its first `=`, and a part
/// without `=` decodes to `None`. Fails on a `%` not followed by two hex
/// digits and on escapes that do not form valid UTF-8.
pub fn decode(query: &str) -> Result<DecodedParams, QueryError> {
    let mut params = DecodedParams::new();
    for part in query.split('&').filter(|part| !part.is_empty()) {
        let (key, value) = match part.split_once('=') {
            Some((key, value)) => (key, Some(unescape(value)?)),
            None => (part, None),
        };
        params.insert(unescape(key)?, value);
    }
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(encode(&QueryParams::new()), "");
    }

    #[test]
    fn encode_keeps_insertion_order() {
        let params: QueryParams = [("z", "1"), ("a", "2"), ("m", "3")].into_iter().collect();
        assert_eq!(encode(&params), "z=1&a=2&m=3");
    }

    #[test]
    fn encode_repeats_key_for_lists() {
        let mut params = QueryParams::new();
        params.insert("a", vec!["x", "y"]);
        assert_eq!(encode(&params), "a=x&a=y");
    }

    #[test]
    fn encode_escapes_keys_and_values() {
        let mut params = QueryParams::new();
        params.insert("search term", "a&b=c");
        params.insert("name", "café #1");
        assert_eq!(
            encode(&params),
            "search%20term=a%26b%3Dc&name=caf%C3%A9%20%231"
        );
    }

    #[test]
    fn list_decode_keeps_last_value() {
        let decoded = decode("a=x&a=y").unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded.get_str("a"), Some("y"));
    }

    #[test]
    fn scalar_round_trip() {
        let params: QueryParams = [
            ("q", "web server"),
            ("filter", "a&b=c"),
            ("empty", ""),
            ("unicode", "ünïcødé"),
        ]
        .into_iter()
        .collect();

        let decoded = decode(&encode(&params)).unwrap();
        let expected: DecodedParams = params
            .iter()
            .map(|(k, v)| match v {
                QueryValue::Single(s) => (k, Some(s.clone())),
                QueryValue::Multi(_) => unreachable!("scalar params only"),
            })
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn part_without_equals_is_none() {
        let decoded = decode("flag&x=1").unwrap();
        assert_eq!(decoded.get("flag"), Some(&None));
        assert_eq!(decoded.get_str("flag"), None);
        assert_eq!(decoded.get_str("x"), Some("1"));
    }

    #[test]
    fn empty_parts_are_skipped() {
        let decoded = decode("&a=1&&b=2&").unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded.get_str("a"), Some("1"));
        assert_eq!(decoded.get_str("b"), Some("2"));
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn value_splits_on_first_equals_only() {
        let decoded = decode("expr=a=b").unwrap();
        assert_eq!(decoded.get_str("expr"), Some("a=b"));
    }

    #[test]
    fn malformed_escape_is_rejected() {
        for query in ["p=100%zz", "p=50%", "p=%2", "a%g1=1"] {
            assert!(
                matches!(decode(query), Err(QueryError::InvalidEscape { .. })),
                "query: {query}"
            );
        }
    }

    #[test]
    fn invalid_utf8_escape_is_rejected() {
        assert!(matches!(decode("p=%FF"), Err(QueryError::InvalidUtf8(_))));
        assert!(matches!(decode("%C3=x"), Err(QueryError::InvalidUtf8(_))));
        assert_eq!(decode("p=%C3%A9").unwrap().get_str("p"), Some("é"));
    }

    #[test]
    fn large_query_keeps_order_and_last_values() {
        let query: String = (0..20_000)
            .map(|i| format!("k{i}={i}"))
            .chain(std::iter::once("k0=last".to_string()))
            .collect::<Vec<_>>()
            .join("&");
        let decoded = decode(&query).unwrap();
        assert_eq!(decoded.len(), 20_000);
        assert_eq!(decoded.get_str("k0"), Some("last"));
        assert_eq!(decoded.get_str("k19999"), Some("19999"));
        let keys: Vec<&str> = decoded.iter().take(3).map(|(k, _)| k).collect();
        assert_eq!(keys, ["k0", "k1", "k2"]);
    }

    #[test]
    fn reinsert_replaces_in_place() {
        let mut params = QueryParams::new();
        params.insert("a", "1");
        params.insert("b", "2");
        let previous = params.insert("a", "3");
        assert_eq!(previous, Some(QueryValue::Single("1".to_string())));
        assert_eq!(encode(&params), "a=3&b=2");
    }
}
