//! The HTTP client: single attempts and the redirect/retry orchestrator.

use crate::answer::{Answer, Content, Payload};
use crate::form::FormData;
use crate::headers::{presets, response_headers, HeaderState};
use crate::interceptor::Interceptor;
use brofetch_config::{ClientOptions, ResponseType};
use hyper::ext::ReasonPhrase;
use parking_lot::Mutex;
use reqwest::{Client, ClientBuilder, Method};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use url::Url;

/// Every attempt of one `ask` call, in order.
pub type History = Vec<Answer>;

/// Build the transport used by [`HttpClient`].
///
/// Redirects are disabled so that every hop shows up in the history.
pub fn build_transport(options: &ClientOptions) -> Result<Client, ClientError> {
    ClientBuilder::new()
        .user_agent(&options.user_agent)
        .redirect(reqwest::redirect::Policy::none())
        .gzip(true)
        .build()
        .map_err(ClientError::Build)
}

/// Client-side errors. Transport failures are never reported here; they end
/// up in the [`Answer`] status instead.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(#[source] reqwest::Error),

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(#[source] url::ParseError),

    #[error("body string is not valid JSON: {0}")]
    InvalidRequestJson(#[source] serde_json::Error),

    #[error("response content is not valid JSON (status {status}): {source}")]
    InvalidResponseJson {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why an attempt produced no response.
#[derive(Debug, thiserror::Error)]
enum AttemptError {
    #[error("request timed out after {} ms", .0.as_millis())]
    TimedOut(Duration),

    #[error("request aborted")]
    Killed,

    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{0}")]
    Transport(#[source] reqwest::Error),
}

impl From<reqwest::Error> for AttemptError {
    fn from(e: reqwest::Error) -> Self {
        AttemptError::Transport(e)
    }
}

impl AttemptError {
    fn status(&self) -> u16 {
        match self {
            AttemptError::TimedOut(_) => 408,
            AttemptError::Transport(e) if e.is_timeout() => 408,
            _ => 400,
        }
    }
}

struct Completed {
    status: reqwest::StatusCode,
    /// Reason phrase as sent by the server, else the canonical one.
    status_message: String,
    headers: BTreeMap<String, String>,
    content: Content,
}

/// HTTP client with a mutable default header map.
///
/// `ask` and `ask_once` take `&self`, so any number of requests can run
/// concurrently on one client. Changing headers takes `&mut self`; each
/// attempt works on its own copy of the headers taken at dispatch.
pub struct HttpClient {
    inner: Client,
    options: ClientOptions,
    base_url: Option<Url>,
    headers: HeaderState,
    interceptor: Option<Arc<dyn Interceptor>>,
    last_res_headers: Mutex<BTreeMap<String, String>>,
    kill_switch: broadcast::Sender<()>,
}

impl HttpClient {
    /// Create a client with default options.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_options(ClientOptions::default())
    }

    /// Create a client with custom options.
    pub fn with_options(options: ClientOptions) -> Result<Self, ClientError> {
        let inner = build_transport(&options)?;
        let base_url = options
            .base_url
            .as_deref()
            .map(Url::parse)
            .transpose()
            .map_err(ClientError::InvalidBaseUrl)?;
        let headers = options.headers.iter().collect();
        let (kill_switch, _) = broadcast::channel(1);

        Ok(Self {
            inner,
            options,
            base_url,
            headers,
            interceptor: None,
            last_res_headers: Mutex::new(BTreeMap::new()),
            kill_switch,
        })
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /********** HEADERS **********/

    /// Merge headers into the client's header map. Keys are lowercased.
    pub fn set_req_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        self.headers.merge(headers);
    }

    /// Set a single header.
    pub fn set_req_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Delete headers by name.
    pub fn del_req_headers<I, K>(&mut self, names: I)
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.headers.remove_all(names);
    }

    /// Current request headers.
    pub fn get_req_headers(&self) -> BTreeMap<String, String> {
        self.headers.snapshot()
    }

    /// Headers of the most recent response received by this client.
    pub fn get_res_headers(&self) -> BTreeMap<String, String> {
        self.last_res_headers.lock().clone()
    }

    /// Install the hook run before every attempt, replacing any previous one.
    pub fn set_interceptor(&mut self, interceptor: impl Interceptor + 'static) {
        self.interceptor = Some(Arc::new(interceptor));
    }

    /// Remove the interceptor.
    pub fn clear_interceptor(&mut self) {
        self.interceptor = None;
    }

    /// Abort every attempt currently in flight.
    ///
    /// Aborted attempts are answered with status 400 and `request aborted`.
    /// Attempts started afterwards are not affected.
    pub fn kill(&self) {
        let aborted = self.kill_switch.send(()).unwrap_or(0);
        tracing::debug!(aborted, "kill requested");
    }

    /// Build a [`FormData`] from a flat key/value map.
    pub fn object_to_form_data<I, K, V>(&self, fields: I) -> FormData
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<crate::form::FormValue>,
    {
        crate::form::object_to_form_data(fields)
    }

    /********** REQUESTS **********/

    /// Send one request. Redirects and retries are not handled.
    ///
    /// Never fails: a malformed URL, a transport error or an interceptor
    /// error gives status 400, a timeout gives 408. Any received response,
    /// whatever its status, is returned as is.
    pub async fn ask_once(&self, url: &str, method: Method, body: Option<&Payload>) -> Answer {
        let mut kill_rx = self.kill_switch.subscribe();
        let mut headers = self.headers.clone();
        let mut answer = Answer::pending(url, &method, headers.snapshot());

        let target = match self.resolve_url(url) {
            Ok(target) => target,
            Err(e) => {
                tracing::debug!(url, error = %e, "rejecting malformed URL");
                return answer.fail(400, e.to_string());
            }
        };
        if self.options.encode_uri || Url::parse(url).is_err() {
            answer.request_url = target.to_string();
        }
        answer.https = target.scheme() == "https";

        if let Some(interceptor) = &self.interceptor {
            if let Err(e) = interceptor.before_send(&mut headers).await {
                tracing::warn!(url = %target, error = %e, "interceptor failed, request not sent");
                return answer.fail(400, format!("interceptor failed: {e}"));
            }
            answer.req.headers = headers.snapshot();
        }

        let payload = body.filter(|_| method != Method::GET);
        answer.req.payload = payload.cloned();

        tracing::debug!("Making {} request to: {}", method, target);
        let timeout = self.options.timeout();
        let attempt = async {
            let request = self.build_request(target, method, &headers, payload)?;
            self.dispatch(request).await
        };
        let outcome = tokio::select! {
            result = tokio::time::timeout(timeout, attempt) => match result {
                Ok(outcome) => outcome,
                Err(_) => Err(AttemptError::TimedOut(timeout)),
            },
            _ = kill_rx.recv() => Err(AttemptError::Killed),
        };

        match outcome {
            Ok(completed) => {
                tracing::debug!(
                    "{} response: {} {}",
                    answer.request_method,
                    completed.status,
                    answer.request_url
                );
                *self.last_res_headers.lock() = completed.headers.clone();
                answer.status = completed.status.as_u16();
                answer.status_message = completed.status_message;
                answer.res.headers = completed.headers;
                answer.res.content = Some(completed.content);
                answer.finish()
            }
            Err(e) => {
                tracing::debug!(url = %answer.request_url, error = %e, "request failed");
                let status = e.status();
                answer.fail(status, e.to_string())
            }
        }
    }

    /// Send a request, following redirects and retrying timeouts.
    ///
    /// Up to `max_redirects` hops are followed, each `location` resolved
    /// against the URL of the hop that returned it. Afterwards, while the
    /// latest attempt timed out, the original `url` is retried up to `retry`
    /// times, `retry_delay_ms` apart. Exhausting either limit is silent: the
    /// history simply ends on the last 3xx or 408.
    pub async fn ask(&self, url: &str, method: Method, body: Option<&Payload>) -> History {
        let mut history = vec![self.ask_once(url, method.clone(), body).await];
        let mut current = self.resolve_url(url).ok();

        let mut hops = 1;
        while hops <= self.options.max_redirects {
            let Some(latest) = history.last().filter(|a| a.is_redirect()) else {
                break;
            };
            let next = match (current.as_ref(), latest.location()) {
                (Some(base), Some(location)) => match base.join(location) {
                    Ok(next) => next,
                    Err(e) => {
                        tracing::warn!(location, error = %e, "unusable redirect location");
                        break;
                    }
                },
                _ => {
                    tracing::warn!(status = latest.status, "redirect without location");
                    break;
                }
            };

            tracing::info!(hop = hops, from = %latest.request_url, to = %next, "following redirect");
            history.push(self.ask_once(next.as_str(), method.clone(), body).await);
            current = Some(next);
            hops += 1;
        }

        let mut retries = 1;
        while retries <= self.options.retry && history.last().is_some_and(Answer::is_timeout) {
            tracing::info!(attempt = retries, url, "retrying timed out request");
            tokio::time::sleep(self.options.retry_delay()).await;
            history.push(self.ask_once(url, method.clone(), body).await);
            retries += 1;
        }

        history
    }

    fn resolve_url(&self, url: &str) -> Result<Url, url::ParseError> {
        match &self.base_url {
            Some(base) => base.join(url),
            None => Url::parse(url),
        }
    }

    fn build_request(
        &self,
        target: Url,
        method: Method,
        headers: &HeaderState,
        payload: Option<&Payload>,
    ) -> Result<reqwest::RequestBuilder, AttemptError> {
        let mut header_map = headers.to_header_map();
        if matches!(payload, Some(Payload::Form(_))) {
            // The transport supplies the multipart boundary
            header_map.remove(presets::CONTENT_TYPE);
        }

        let request = self.inner.request(method, target).headers(header_map);
        let request = match payload {
            None => request,
            Some(Payload::Form(form)) => request.multipart(form.to_multipart()?),
            // Under a JSON content type, text goes out as a JSON string
            Some(Payload::Text(text)) if headers.is_json() => {
                request.body(serde_json::to_vec(text)?)
            }
            Some(Payload::Text(text)) => request.body(text.clone()),
            Some(Payload::Json(value)) => request.body(serde_json::to_vec(value)?),
        };
        Ok(request)
    }

    async fn dispatch(&self, request: reqwest::RequestBuilder) -> Result<Completed, AttemptError> {
        let response = request.send().await?;
        let status = response.status();
        let status_message = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|reason| String::from_utf8_lossy(reason.as_bytes()).into_owned())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_default();
        let headers = response_headers(response.headers());
        let content = match self.options.response_type {
            ResponseType::Text => Content::Text(response.text().await?),
            ResponseType::Binary => Content::Binary(response.bytes().await?.to_vec()),
        };

        Ok(Completed {
            status,
            status_message,
            headers,
            content,
        })
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("options", &self.options)
            .field("headers", &self.headers)
            .field("interceptor", &self.interceptor.is_some())
            .finish_non_exhaustive()
    }
}
