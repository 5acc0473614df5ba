//! Hook run before every physical request.

use crate::headers::HeaderState;
use async_trait::async_trait;

/// Error returned by an interceptor.
pub type InterceptError = Box<dyn std::error::Error + Send + Sync>;

/// Runs before each attempt, typically to inject an auth header.
///
/// The interceptor receives the attempt's own copy of the client headers.
/// Changes apply to that attempt only and are recorded in its answer. An
/// error aborts the attempt: no request is sent and the answer carries
/// status 400.
///
/// Header changes never reach the client itself, so an interceptor that
/// refreshes a token has to cache it in its own state and set it again on
/// every call.
#[async_trait]
pub trait Interceptor: Send + Sync {
    async fn before_send(&self, headers: &mut HeaderState) -> Result<(), InterceptError>;
}

#[async_trait]
impl<F> Interceptor for F
where
    F: Fn(&mut HeaderState) -> Result<(), InterceptError> + Send + Sync,
{
    async fn before_send(&self, headers: &mut HeaderState) -> Result<(), InterceptError> {
        self(headers)
    }
}
