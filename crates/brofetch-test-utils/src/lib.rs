//! Test utilities for brofetch crates.

use serde::Serialize;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Responds with the request body and the request's `content-type`.
pub struct EchoBody;

impl Respond for EchoBody {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let content_type = request
            .headers
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("application/octet-stream")
            .to_string();
        ResponseTemplate::new(200).set_body_raw(request.body.clone(), &content_type)
    }
}

/// Responds with the request headers as a JSON object.
pub struct EchoHeaders;

impl Respond for EchoHeaders {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let headers: serde_json::Map<String, serde_json::Value> = request
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    serde_json::Value::String(value.to_str().unwrap_or_default().to_string()),
                )
            })
            .collect();
        ResponseTemplate::new(200).set_body_json(headers)
    }
}

/// HTTP mock server wrapper with convenience methods
pub struct TestHttpServer {
    server: MockServer,
}

impl TestHttpServer {
    /// Start a new mock server
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Get the server URL
    pub fn url(&self) -> String {
        self.server.uri()
    }

    /// Get URL for a specific path
    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.server.uri(), path)
    }

    /// Register any method on `endpoint` returning a text body
    pub async fn text(&self, endpoint: &str, status: u16, body: &str) {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&self.server)
            .await;
    }

    /// Register a GET endpoint that returns JSON
    pub async fn get_json<T: Serialize>(&self, endpoint: &str, response: &T) {
        Mock::given(method("GET"))
            .and(path(endpoint))
            .respond_with(ResponseTemplate::new(200).set_body_json(response))
            .mount(&self.server)
            .await;
    }

    /// Register a POST endpoint that echoes the request body
    pub async fn echo(&self, endpoint: &str) {
        Mock::given(method("POST"))
            .and(path(endpoint))
            .respond_with(EchoBody)
            .mount(&self.server)
            .await;
    }

    /// Register an endpoint that echoes the request headers as JSON
    pub async fn echo_headers(&self, endpoint: &str) {
        Mock::given(path(endpoint))
            .respond_with(EchoHeaders)
            .mount(&self.server)
            .await;
    }

    /// Register a redirect from `endpoint` to `location`
    pub async fn redirect(&self, endpoint: &str, status: u16, location: &str) {
        Mock::given(path(endpoint))
            .respond_with(ResponseTemplate::new(status).insert_header("location", location))
            .mount(&self.server)
            .await;
    }

    /// Register `/{prefix}1` .. `/{prefix}{hops}` each redirecting to the
    /// next, the last one to `final_endpoint`
    pub async fn redirect_chain(&self, prefix: &str, hops: usize, final_endpoint: &str) {
        for hop in 1..=hops {
            let location = if hop == hops {
                final_endpoint.to_string()
            } else {
                format!("/{}{}", prefix, hop + 1)
            };
            self.redirect(&format!("/{}{}", prefix, hop), 302, &location)
                .await;
        }
    }

    /// Register an endpoint with simulated latency
    pub async fn with_latency(&self, endpoint: &str, body: &str, latency: Duration) {
        Mock::given(path(endpoint))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .set_delay(latency),
            )
            .mount(&self.server)
            .await;
    }

    /// Register a sequence of responses
    pub async fn sequence(&self, endpoint: &str, responses: Vec<ResponseTemplate>) {
        for (i, response) in responses.into_iter().enumerate() {
            Mock::given(path(endpoint))
                .respond_with(response)
                .up_to_n_times(1)
                .with_priority(100 - i as u8)
                .mount(&self.server)
                .await;
        }
    }

    /// Number of requests received on `endpoint`
    pub async fn received_count(&self, endpoint: &str) -> usize {
        self.received_requests()
            .await
            .iter()
            .filter(|r| r.url.path() == endpoint)
            .count()
    }

    /// Verify that a request was received
    pub async fn verify_received(&self, endpoint: &str, times: usize) {
        let count = self.received_count(endpoint).await;
        assert_eq!(
            count, times,
            "Expected {} requests to {}, got {}",
            times, endpoint, count
        );
    }

    /// Get all received requests
    pub async fn received_requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }
}
