//! Client option types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// How response bodies are decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// UTF-8 text.
    #[default]
    #[serde(alias = "")]
    Text,
    /// Raw bytes, for file downloads.
    #[serde(alias = "blob")]
    Binary,
}

impl ResponseType {
    /// Parse from string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "" | "text" => Some(Self::Text),
            "binary" | "blob" => Some(Self::Binary),
            _ => None,
        }
    }
}

/// Per-client options.
///
/// Everything here is fixed once a client is built, except `headers`, which
/// only seeds the client's mutable header state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientOptions {
    /// Dispatch the percent-encoded form of the URL.
    pub encode_uri: bool,
    /// Hard timeout for one attempt (ms).
    pub timeout_ms: u64,
    /// Response body decoding.
    pub response_type: ResponseType,
    /// How many times a timed-out request is retried.
    pub retry: u32,
    /// Delay before each retry (ms).
    pub retry_delay_ms: u64,
    /// Maximum redirect hops followed by `ask`.
    pub max_redirects: u32,
    /// Default request headers.
    pub headers: BTreeMap<String, String>,
    /// Base for resolving relative request URLs.
    pub base_url: Option<String>,
    /// User agent string.
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("authorization".to_string(), String::new());
        headers.insert("accept".to_string(), "*/*".to_string());

        Self {
            encode_uri: false,
            timeout_ms: 8000,
            response_type: ResponseType::default(),
            retry: 3,
            retry_delay_ms: 5500,
            max_redirects: 3,
            headers,
            base_url: None,
            user_agent: format!("brofetch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientOptions {
    /// Attempt timeout as a `Duration`.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Retry delay as a `Duration`.
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}
