//! Trace middleware for HTTP exchanges.
//!
//! Records exchange duration, HTTP status and outcome on a `soap_exchange`
//! span.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use tower::{Layer, Service};
use tracing::{info_span, Instrument};

use super::{HttpExchange, HttpReply, NetworkError};

// ---------------------------------------------------------------------------
// TraceLayer
// ---------------------------------------------------------------------------

/// Tower layer that instruments each exchange with a `tracing` span.
#[derive(Debug, Clone)]
pub struct TraceLayer;

impl<S> Layer<S> for TraceLayer {
    type Service = TraceService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        TraceService { inner }
    }
}

// ---------------------------------------------------------------------------
// TraceService
// ---------------------------------------------------------------------------

/// Service wrapper that records timing and outcome of each exchange.
#[derive(Debug, Clone)]
pub struct TraceService<S> {
    inner: S,
}

impl<S> Service<HttpExchange> for TraceService<S>
where
    S: Service<HttpExchange, Response = HttpReply, Error = NetworkError> + Send,
    S::Future: Send + 'static,
{
    type Response = HttpReply;
    type Error = NetworkError;
    type Future = Pin<Box<dyn Future<Output = Result<HttpReply, NetworkError>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, exchange: HttpExchange) -> Self::Future {
        let span = info_span!(
            "soap_exchange",
            endpoint = %exchange.endpoint,
            action = %exchange.soap_action,
            status = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            outcome = tracing::field::Empty,
        );
        tracing::debug!(
            parent: &span,
            bytes = exchange.body.len(),
            "sending request"
        );

        let fut = self.inner.call(exchange);

        Box::pin(
            async move {
                let start = Instant::now();
                let result = fut.await;

                #[allow(clippy::cast_possible_truncation)]
                let duration_ms = start.elapsed().as_millis() as u64;
                let outcome = match &result {
                    Ok(reply) if reply.is_success() => "ok",
                    Ok(_) => "http_error",
                    Err(_) => "network_error",
                };

                let current = tracing::Span::current();
                if let Ok(reply) = &result {
                    current.record("status", reply.status);
                }
                current.record("duration_ms", duration_ms);
                current.record("outcome", outcome);

                tracing::info!(duration_ms, outcome, "exchange complete");
                result
            }
            .instrument(span),
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
