use async_trait::async_trait;
use thiserror::Error;

use crate::description::ServiceDescription;
use crate::signature::OperationSignature;
use crate::types::{Fault, Value};

/// Errors raised by a [`Binding`] while encoding or decoding wire messages.
#[derive(Debug, Error)]
pub enum BindingError {
    #[error("malformed message: {0}")]
    Malformed(String),
    #[error("message has no <{0}> element")]
    MissingElement(&'static str),
    #[error("failed to write message: {0}")]
    Write(#[from] std::fmt::Error),
}

/// A decoded reply body: either the operation's payload or a fault the
/// endpoint reported inside an otherwise successful exchange.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyBody {
    /// `None` when the reply carried no content.
    Payload(Option<Value>),
    Fault(Fault),
}

/// Wire-level message codec. Owns all XML and namespace formatting; callers
/// only supply ordered values and consume decoded payloads.
pub trait Binding: Send + Sync {
    /// Serializes one request. `values` is parallel to `signature.inputs()`;
    /// `None` entries are absent and must not appear in the output.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] if the message cannot be written.
    fn serialize(
        &self,
        signature: &OperationSignature,
        values: &[Option<Value>],
        headers: &[Value],
    ) -> Result<Vec<u8>, BindingError>;

    /// Decodes a successful reply into a payload or a detected fault.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] if the body is not a well-formed reply.
    fn decode_reply(
        &self,
        signature: &OperationSignature,
        body: &[u8],
    ) -> Result<ReplyBody, BindingError>;

    /// Decodes the fault carried by a failed reply.
    ///
    /// # Errors
    ///
    /// Returns [`BindingError`] if the body holds no decodable fault.
    fn decode_fault(&self, body: &[u8]) -> Result<Fault, BindingError>;
}

/// Produces the service description a client is built from.
#[async_trait]
pub trait DescriptionSource: Send + Sync {
    /// Human-readable locator, used in logs and errors.
    fn locator(&self) -> String;

    /// Loads and parses the description.
    async fn load(&self) -> anyhow::Result<ServiceDescription>;
}
