//! Invocation pipeline: serialize, exchange, decode, apply fault policy.
//!
//! Inside the pipeline every outcome is data ([`Outcome`]); only the
//! [`FaultPolicy`] adapter at the end decides whether a fault or failed
//! exchange becomes a [`ClientError`] or a [`Response::Status`] pair.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;
use soapline_core::{Binding, Fault, OperationSignature, ReplyBody, Value};
use tower::ServiceExt;

use crate::args::InjectedReply;
use crate::config::FaultPolicy;
use crate::error::ClientError;
use crate::invocation::BoundInvocation;
use crate::transport::{HttpExchange, HttpReply, TransportService};

/// HTTP status reserved for "operation executed but declared a fault".
const FAULT_STATUS: u16 = 500;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// The serialized request most recently handed to transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub endpoint: String,
    /// `SOAPAction` header value, quoted.
    pub action: String,
    pub body: Bytes,
}

impl fmt::Display for OutboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.body))
    }
}

/// Detail carried by a [`Response::Status`] pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Detail {
    Payload(Value),
    Fault(Fault),
}

/// Result of an invocation that did not raise.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// Unwrapped payload; only produced under [`FaultPolicy::Raise`].
    Payload(Option<Value>),
    /// `(status, detail)` pair; always produced under [`FaultPolicy::Return`],
    /// and for a 500 reply without a fault under either policy.
    Status { status: u16, detail: Option<Detail> },
}

impl Response {
    /// The payload, if the call succeeded and carried one.
    #[must_use]
    pub fn into_payload(self) -> Option<Value> {
        match self {
            Response::Payload(payload) => payload,
            Response::Status {
                detail: Some(Detail::Payload(value)),
                ..
            } => Some(value),
            Response::Status { .. } => None,
        }
    }

    #[must_use]
    pub fn fault(&self) -> Option<&Fault> {
        match self {
            Response::Status {
                detail: Some(Detail::Fault(fault)),
                ..
            } => Some(fault),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Outcome and policy
// ---------------------------------------------------------------------------

#[derive(Debug)]
enum Outcome {
    Success { status: u16, payload: Option<Value> },
    Fault { status: u16, fault: Fault },
    /// 500 reply without a decodable fault; never raised.
    ServerError { status: u16 },
    Failed { status: u16, reason: String },
}

impl FaultPolicy {
    fn apply(self, outcome: Outcome) -> Result<Response, ClientError> {
        match (self, outcome) {
            (FaultPolicy::Raise, Outcome::Success { payload, .. }) => Ok(Response::Payload(payload)),
            (FaultPolicy::Raise, Outcome::Fault { fault, .. }) => Err(ClientError::ServiceFault(fault)),
            (_, Outcome::ServerError { status }) => Ok(Response::Status { status, detail: None }),
            (FaultPolicy::Raise, Outcome::Failed { status, reason }) => {
                Err(ClientError::Transport { status, reason })
            }
            (FaultPolicy::Return, Outcome::Success { status, payload }) => Ok(Response::Status {
                status,
                detail: payload.map(Detail::Payload),
            }),
            (FaultPolicy::Return, Outcome::Fault { status, fault }) => Ok(Response::Status {
                status,
                detail: Some(Detail::Fault(fault)),
            }),
            (FaultPolicy::Return, Outcome::Failed { status, .. }) => {
                Ok(Response::Status { status, detail: None })
            }
        }
    }
}

fn quote_action(action: &str) -> String {
    if action.len() >= 2 && action.starts_with('"') && action.ends_with('"') {
        action.to_string()
    } else {
        format!("\"{action}\"")
    }
}

// ---------------------------------------------------------------------------
// InvocationPipeline
// ---------------------------------------------------------------------------

/// Per-client pipeline. Holds the last-sent diagnostic and the transport
/// handle; neither lock is held across an `.await`.
pub struct InvocationPipeline {
    binding: Arc<dyn Binding>,
    transport: Mutex<TransportService>,
    last_sent: Mutex<Option<OutboundMessage>>,
    policy: FaultPolicy,
}

impl fmt::Debug for InvocationPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvocationPipeline")
            .field("policy", &self.policy)
            .field("last_sent", &*self.last_sent.lock())
            .finish_non_exhaustive()
    }
}

impl InvocationPipeline {
    #[must_use]
    pub fn new(binding: Arc<dyn Binding>, transport: TransportService, policy: FaultPolicy) -> Self {
        Self {
            binding,
            transport: Mutex::new(transport),
            last_sent: Mutex::new(None),
            policy,
        }
    }

    #[must_use]
    pub fn policy(&self) -> FaultPolicy {
        self.policy
    }

    #[must_use]
    pub fn last_sent(&self) -> Option<OutboundMessage> {
        self.last_sent.lock().clone()
    }

    /// Runs one invocation. `inject` replaces the network exchange.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Binding`] if the request cannot be serialized or a
    ///   successful reply cannot be decoded.
    /// - [`ClientError::Network`] if the exchange produced no HTTP status.
    /// - [`ClientError::ServiceFault`] and [`ClientError::Transport`] under
    ///   [`FaultPolicy::Raise`] only. A 500 reply without a decodable fault
    ///   is returned as `(500, None)` under either policy.
    pub async fn invoke(
        &self,
        invocation: BoundInvocation,
        inject: Option<InjectedReply>,
    ) -> Result<Response, ClientError> {
        let signature = &invocation.signature;
        let body = self
            .binding
            .serialize(signature, &invocation.values, &invocation.headers)?;
        let message = OutboundMessage {
            endpoint: signature.endpoint().to_string(),
            action: quote_action(signature.action()),
            body: Bytes::from(body),
        };
        tracing::debug!(operation = signature.name(), envelope = %message, "sending");
        *self.last_sent.lock() = Some(message.clone());

        let reply = match inject {
            Some(injected) => {
                tracing::debug!(status = injected.status, "using injected reply");
                HttpReply::new(injected.status, injected.body)
            }
            None => {
                let transport = self.transport.lock().clone();
                let exchange = HttpExchange {
                    endpoint: message.endpoint.clone(),
                    soap_action: message.action.clone(),
                    body: message.body.clone(),
                };
                transport.oneshot(exchange).await.map_err(|err| {
                    tracing::error!(error = %err, sent = %message, "exchange failed");
                    err
                })?
            }
        };

        let outcome = self.interpret(signature, reply)?;
        if !matches!(outcome, Outcome::Success { .. }) {
            tracing::error!(outcome = ?outcome, sent = %message, "call failed");
        }
        self.policy.apply(outcome)
    }

    fn interpret(
        &self,
        signature: &OperationSignature,
        reply: HttpReply,
    ) -> Result<Outcome, ClientError> {
        let status = reply.status;
        tracing::debug!(status, reason = %reply.reason, "reply received");
        let empty = reply.body.iter().all(u8::is_ascii_whitespace);

        if reply.is_success() {
            if empty {
                return Ok(Outcome::Success { status, payload: None });
            }
            return Ok(match self.binding.decode_reply(signature, &reply.body)? {
                ReplyBody::Payload(payload) => Outcome::Success { status, payload },
                ReplyBody::Fault(fault) => Outcome::Fault { status, fault },
            });
        }

        if status == FAULT_STATUS {
            if !empty {
                match self.binding.decode_fault(&reply.body) {
                    Ok(fault) => return Ok(Outcome::Fault { status, fault }),
                    Err(err) => tracing::warn!(error = %err, "undecodable fault body"),
                }
            }
            return Ok(Outcome::ServerError { status });
        }
        Ok(Outcome::Failed {
            status,
            reason: reply.reason,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
