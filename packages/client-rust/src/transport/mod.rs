//! HTTP transport as a tower service stack.
//!
//! - [`http`]: `reqwest`-backed [`HttpTransport`] with cookie jar and proxies
//! - [`trace`]: per-exchange `tracing` span with timing and outcome
//!
//! The pipeline only sees the type-erased [`TransportService`], so tests and
//! embedders can substitute any `tower::Service` with the same signature.

pub mod http;
pub mod trace;

use bytes::Bytes;
use tower::util::BoxCloneService;
use tower::{Service, ServiceBuilder};

pub use self::http::{select_proxy, HttpTransport};
pub use self::trace::TraceLayer;

/// One outbound SOAP request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpExchange {
    pub endpoint: String,
    pub soap_action: String,
    pub body: Bytes,
}

/// The HTTP-level outcome of an exchange. Any status is a reply; only
/// failures with no status at all are [`NetworkError`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    /// Canonical phrase for `status`, never the server's own text: HTTP/2
    /// has none and reqwest does not surface the HTTP/1 one.
    pub reason: String,
    pub body: Bytes,
}

impl HttpReply {
    /// Builds a reply with the canonical reason phrase for `status`.
    #[must_use]
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            reason: canonical_reason(status),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Canonical reason phrase, or `"Unknown"` for unregistered codes.
#[must_use]
pub fn canonical_reason(status: u16) -> String {
    ::http::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

/// The exchange could not complete, so there is no HTTP status to report.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },
    #[error("http exchange failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("transport unavailable: {0}")]
    Unavailable(String),
}

/// Type-erased, cloneable transport.
pub type TransportService = BoxCloneService<HttpExchange, HttpReply, NetworkError>;

/// Wraps `inner` with the trace layer and erases its type.
///
/// Layer order (outermost to innermost):
/// 1. `TraceLayer` -- span per exchange with endpoint, action, status, timing
#[must_use]
pub fn build_transport_stack<S>(inner: S) -> TransportService
where
    S: Service<HttpExchange, Response = HttpReply, Error = NetworkError>
        + Clone
        + Send
        + 'static,
    S::Future: Send + 'static,
{
    BoxCloneService::new(ServiceBuilder::new().layer(TraceLayer).service(inner))
}
