//! Request header state and header map conversions.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;

/// Header names and values used by the convenience wrappers.
pub mod presets {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const AUTHORIZATION: &str = "authorization";
    pub const LOCATION: &str = "location";

    pub const ANY: &str = "*/*";
    pub const JSON: &str = "application/json";
    pub const JSON_UTF8: &str = "application/json; charset=utf-8";
    pub const HTML: &str = "text/html";
    pub const JAVASCRIPT: &str = "application/javascript";
    pub const JAVASCRIPT_UTF8: &str = "application/javascript; charset=utf-8";
}

/// Mutable request header map of a client.
///
/// Keys are lowercased on insert, removal and lookup. Values are stored as
/// given; they are only checked when a request is built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderState {
    map: BTreeMap<String, String>,
}

impl HeaderState {
    /// Create an empty header state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set one header.
    pub fn set(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.map.insert(name.as_ref().to_lowercase(), value.into());
    }

    /// Merge several headers, replacing existing values.
    pub fn merge<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        for (name, value) in headers {
            self.set(name, value);
        }
    }

    /// Remove one header.
    pub fn remove(&mut self, name: impl AsRef<str>) -> Option<String> {
        self.map.remove(&name.as_ref().to_lowercase())
    }

    /// Remove several headers.
    pub fn remove_all<I, K>(&mut self, names: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for name in names {
            self.remove(name);
        }
    }

    /// Look up a header value.
    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        self.map
            .get(&name.as_ref().to_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Whether `content-type` names a JSON body.
    pub fn is_json(&self) -> bool {
        self.get(presets::CONTENT_TYPE)
            .is_some_and(|ct| ct.to_ascii_lowercase().contains(presets::JSON))
    }

    /// Copy of the current map.
    pub fn snapshot(&self) -> BTreeMap<String, String> {
        self.map.clone()
    }

    /// Convert to a transport header map. Entries the transport rejects are skipped.
    pub fn to_header_map(&self) -> HeaderMap {
        let mut headers = HeaderMap::with_capacity(self.map.len());
        for (name, value) in &self.map {
            match (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                (Ok(name), Ok(value)) => {
                    headers.insert(name, value);
                }
                _ => tracing::warn!(header = %name, "skipping invalid request header"),
            }
        }
        headers
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderState
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut state = Self::new();
        state.merge(iter);
        state
    }
}

/// Flatten response headers into a lowercase-keyed map.
///
/// Repeated headers are joined with `", "`.
pub fn response_headers(headers: &HeaderMap) -> BTreeMap<String, String> {
    let mut map: BTreeMap<String, String> = BTreeMap::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        map.entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_is_json() {
        let mut headers = HeaderState::new();
        assert!(!headers.is_json());

        headers.set("Content-Type", "text/plain");
        assert!(!headers.is_json());

        headers.set("content-type", "Application/JSON; charset=utf-8");
        assert!(headers.is_json());
    }

    #[test]
    fn test_set_lowercases_keys() {
        let mut headers = HeaderState::new();
        headers.merge([("Authorization", "X"), ("ACCEPT", "text/html")]);

        assert_eq!(headers.snapshot().get("authorization").map(String::as_str), Some("X"));
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert_eq!(headers.get("Accept"), Some("text/html"));
        assert!(!headers.snapshot().contains_key("Authorization"));
    }

    #[test]
    fn test_set_replaces_existing_value() {
        let mut headers = HeaderState::new();
        headers.set("accept", "*/*");
        headers.set("Accept", "application/json");
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("accept"), Some("application/json"));
    }

    #[test]
    fn test_remove_all_is_case_insensitive() {
        let mut headers: HeaderState =
            [("content-type", "text/html"), ("accept", "*/*")].into_iter().collect();
        headers.remove_all(["Content-Type", "missing"]);

        assert!(!headers.contains("content-type"));
        assert!(headers.contains("accept"));
    }

    #[test]
    fn test_to_header_map_skips_invalid_entries() {
        let mut headers = HeaderState::new();
        headers.set("x-good", "yes");
        headers.set("bad header", "no");
        headers.set("x-bad-value", "line\nbreak");
        headers.set("authorization", "");

        let map = headers.to_header_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("x-good").unwrap(), "yes");
        assert_eq!(map.get("authorization").unwrap(), "");
    }

    #[test]
    fn test_response_headers_joins_duplicates() {
        let mut map = HeaderMap::new();
        map.append("vary", HeaderValue::from_static("accept"));
        map.append("vary", HeaderValue::from_static("origin"));
        map.insert("content-type", HeaderValue::from_static("text/plain"));

        let flat = response_headers(&map);
        assert_eq!(flat.get("vary").map(String::as_str), Some("accept, origin"));
        assert_eq!(flat.get("content-type").map(String::as_str), Some("text/plain"));
    }

    proptest! {
        #[test]
        fn test_keys_are_always_lowercase(name in "[A-Za-z][A-Za-z0-9-]{0,20}", value in "[ -~]{0,20}") {
            let mut headers = HeaderState::new();
            headers.set(&name, value.clone());
            let lowered = name.to_lowercase();
            prop_assert!(headers.iter().all(|(k, _)| k == lowered));
            prop_assert_eq!(headers.get(name.to_uppercase()), Some(value.as_str()));
        }
    }
}
