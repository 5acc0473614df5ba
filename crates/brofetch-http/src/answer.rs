//! The answer envelope produced for every request attempt.

use crate::form::FormData;
use crate::headers::presets;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    /// Sent verbatim.
    Text(String),
    /// Serialized to JSON text.
    Json(serde_json::Value),
    /// Sent as `multipart/form-data`.
    Form(FormData),
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<FormData> for Payload {
    fn from(form: FormData) -> Self {
        Self::Form(form)
    }
}

/// Decoded response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Text(String),
    Binary(Vec<u8>),
    Json(serde_json::Value),
}

impl Content {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Binary(bytes) => Some(bytes),
            Self::Text(text) => Some(text.as_bytes()),
            Self::Json(_) => None,
        }
    }

    /// Whether the body carries nothing worth decoding.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
            Self::Json(_) => false,
        }
    }
}

/// What was sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestRecord {
    /// Headers as dispatched, after the interceptor ran.
    pub headers: BTreeMap<String, String>,
    pub payload: Option<Payload>,
}

/// What came back.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResponseRecord {
    /// Lowercase-keyed response headers; empty when no response arrived.
    pub headers: BTreeMap<String, String>,
    /// Decoded body; `None` when the attempt failed.
    pub content: Option<Content>,
}

/// Attempt timing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Timing {
    pub req: DateTime<Utc>,
    pub res: DateTime<Utc>,
    /// `res - req` in milliseconds.
    pub duration_ms: i64,
}

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub request_url: String,
    pub request_method: String,
    /// HTTP status, or 400/408 for attempts that got no response.
    pub status: u16,
    pub status_message: String,
    pub https: bool,
    pub req: RequestRecord,
    pub res: ResponseRecord,
    pub time: Timing,
}

impl Answer {
    /// Start an answer whose outcome is not known yet.
    pub(crate) fn pending(
        url: &str,
        method: &reqwest::Method,
        headers: BTreeMap<String, String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            request_url: url.to_string(),
            request_method: method.to_string(),
            status: 0,
            status_message: String::new(),
            https: false,
            req: RequestRecord {
                headers,
                payload: None,
            },
            res: ResponseRecord::default(),
            time: Timing {
                req: now,
                res: now,
                duration_ms: 0,
            },
        }
    }

    /// Stamp the response time and duration.
    pub(crate) fn finish(mut self) -> Self {
        self.time.res = Utc::now();
        self.time.duration_ms = (self.time.res - self.time.req).num_milliseconds();
        self
    }

    /// Close the answer as a failed attempt.
    pub(crate) fn fail(mut self, status: u16, message: impl Into<String>) -> Self {
        self.status = status;
        self.status_message = message.into();
        self.finish()
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 3xx status.
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status)
    }

    /// Attempt timed out.
    pub fn is_timeout(&self) -> bool {
        self.status == 408
    }

    /// The `location` response header.
    pub fn location(&self) -> Option<&str> {
        self.res.headers.get(presets::LOCATION).map(String::as_str)
    }

    /// The response body as text, if it was decoded as text.
    pub fn text(&self) -> Option<&str> {
        self.res.content.as_ref().and_then(Content::as_text)
    }

    /// The response body as JSON, if it was decoded as JSON.
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.res.content.as_ref().and_then(Content::as_json)
    }
}
