//! HTTP client for brofetch.
//!
//! Every physical request is described by an [`Answer`] envelope. Transport
//! failures never surface as errors: they become answers with status 400, or
//! 408 when the attempt timed out. [`HttpClient::ask`] adds redirect
//! following and timeout retries on top of [`HttpClient::ask_once`] and
//! returns the whole attempt history.

pub mod answer;
pub mod client;
pub mod form;
pub mod headers;
pub mod interceptor;
mod wrappers;

pub use answer::{Answer, Content, Payload, RequestRecord, ResponseRecord, Timing};
pub use brofetch_config::{ClientOptions, ResponseType};
pub use client::{build_transport, ClientError, History, HttpClient};
pub use form::{object_to_form_data, FormData, FormValue};
pub use headers::{presets, HeaderState};
pub use interceptor::{InterceptError, Interceptor};
pub use reqwest::Method;
pub use wrappers::JsonBody;
