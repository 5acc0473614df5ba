//! Content-type presets layered on top of `ask_once`.

use crate::answer::{Answer, Content, Payload};
use crate::client::{ClientError, HttpClient};
use crate::form::FormData;
use crate::headers::presets;
use reqwest::Method;

/// Body accepted by [`HttpClient::ask_json`]: a JSON value, or a string
/// holding JSON text.
#[derive(Debug, Clone, PartialEq)]
pub enum JsonBody {
    Value(serde_json::Value),
    Raw(String),
}

impl JsonBody {
    /// Parse into a JSON value. An empty raw string means "no body".
    pub fn into_value(self) -> Result<Option<serde_json::Value>, ClientError> {
        match self {
            JsonBody::Value(value) => Ok(Some(value)),
            JsonBody::Raw(raw) if raw.is_empty() => Ok(None),
            JsonBody::Raw(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(ClientError::InvalidRequestJson),
        }
    }
}

impl From<serde_json::Value> for JsonBody {
    fn from(value: serde_json::Value) -> Self {
        JsonBody::Value(value)
    }
}

impl From<String> for JsonBody {
    fn from(raw: String) -> Self {
        JsonBody::Raw(raw)
    }
}

impl From<&str> for JsonBody {
    fn from(raw: &str) -> Self {
        JsonBody::Raw(raw.to_string())
    }
}

impl HttpClient {
    /// Send JSON and parse the response as JSON. One attempt, no redirects
    /// or retries.
    ///
    /// Fails before any network call when a string body is not valid JSON,
    /// and after the call when a non-empty response is not valid JSON.
    pub async fn ask_json(
        &mut self,
        url: &str,
        method: Method,
        body: Option<JsonBody>,
    ) -> Result<Answer, ClientError> {
        let payload = match body {
            Some(body) => body.into_value()?.map(Payload::Json),
            None => None,
        };

        self.set_req_headers([
            (presets::ACCEPT, presets::JSON),
            (presets::CONTENT_TYPE, presets::JSON_UTF8),
        ]);

        let mut answer = self.ask_once(url, method, payload.as_ref()).await;
        if let Some(content) = answer.res.content.take() {
            answer.res.content = Some(parse_json_content(answer.status, content)?);
        }
        Ok(answer)
    }

    /// GET an HTML page.
    pub async fn ask_html(&mut self, url: &str) -> Answer {
        self.set_req_headers([
            (presets::ACCEPT, presets::HTML),
            (presets::CONTENT_TYPE, presets::HTML),
        ]);
        self.ask_once(url, Method::GET, None).await
    }

    /// GET a JavaScript file.
    pub async fn ask_js(&mut self, url: &str) -> Answer {
        self.set_req_headers([
            (presets::ACCEPT, presets::JAVASCRIPT),
            (presets::CONTENT_TYPE, presets::JAVASCRIPT_UTF8),
        ]);
        self.ask_once(url, Method::GET, None).await
    }

    /// POST a multipart form. One attempt, no redirects or retries.
    ///
    /// The `content-type` header is dropped so the transport can set the
    /// multipart boundary. A JSON response is decoded; anything else is kept
    /// as it came.
    pub async fn send_form_data(&mut self, url: &str, form: &FormData) -> Answer {
        self.set_req_header(presets::ACCEPT, presets::ANY);
        self.del_req_headers([presets::CONTENT_TYPE]);

        let payload = Payload::Form(form.clone());
        let mut answer = self.ask_once(url, Method::POST, Some(&payload)).await;

        let parsed = match &answer.res.content {
            Some(Content::Text(text)) if !text.is_empty() => {
                Some(serde_json::from_str::<serde_json::Value>(text))
            }
            _ => None,
        };
        match parsed {
            Some(Ok(value)) => answer.res.content = Some(Content::Json(value)),
            Some(Err(e)) => tracing::warn!(url, error = %e, "response content is not JSON"),
            None => {}
        }
        answer
    }
}

fn parse_json_content(status: u16, content: Content) -> Result<Content, ClientError> {
    if content.is_empty() {
        return Ok(content);
    }

    let parsed = match &content {
        Content::Json(_) => None,
        Content::Text(text) => Some(serde_json::from_str::<serde_json::Value>(text)),
        Content::Binary(bytes) => Some(serde_json::from_slice::<serde_json::Value>(bytes)),
    };
    let Some(parsed) = parsed else {
        return Ok(content);
    };

    parsed
        .map(Content::Json)
        .map_err(|source| ClientError::InvalidResponseJson {
            status,
            body: String::from_utf8_lossy(content.as_bytes().unwrap_or_default()).into_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_body_from_value() {
        let body = JsonBody::from(json!({"a": 1}));
        assert_eq!(body.into_value().unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_body_from_valid_string() {
        let body = JsonBody::from(r#"{"a":1}"#);
        assert_eq!(body.into_value().unwrap(), Some(json!({"a": 1})));
    }

    #[test]
    fn test_json_body_invalid_string() {
        let err = JsonBody::from("{bad json").into_value().unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequestJson(_)));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_json_body_empty_string_is_no_body() {
        assert_eq!(JsonBody::from("").into_value().unwrap(), None);
    }

    #[test]
    fn test_parse_json_content() {
        let parsed = parse_json_content(200, Content::Text(r#"{"ok":true}"#.to_string())).unwrap();
        assert_eq!(parsed, Content::Json(json!({"ok": true})));

        let parsed = parse_json_content(200, Content::Binary(b"[1,2]".to_vec())).unwrap();
        assert_eq!(parsed, Content::Json(json!([1, 2])));

        let empty = parse_json_content(204, Content::Text(String::new())).unwrap();
        assert_eq!(empty, Content::Text(String::new()));
    }

    #[test]
    fn test_parse_json_content_error_keeps_body() {
        let err = parse_json_content(502, Content::Text("<html>".to_string())).unwrap_err();
        match err {
            ClientError::InvalidResponseJson { status, body, .. } => {
                assert_eq!(status, 502);
                assert_eq!(body, "<html>");
            }
            other => panic!("expected InvalidResponseJson, got {other:?}"),
        }
    }
}
