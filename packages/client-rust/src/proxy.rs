//! Caller-facing operation lookup.
//!
//! [`ServiceProxy::operation`] returns a tagged [`OperationHandle`]: a
//! [`BoundCall`] for single-signature operations, an [`OverloadSet`] when the
//! name is shared by several signatures.

use std::sync::Arc;

use soapline_core::{OperationEntry, OperationRegistry, OperationSignature};

use crate::args::CallArguments;
use crate::error::ClientError;
use crate::invocation::BoundInvocation;
use crate::pipeline::{InvocationPipeline, Response};
use crate::resolver;

/// Operation lookup over a read-only registry.
#[derive(Debug, Clone)]
pub struct ServiceProxy {
    registry: Arc<OperationRegistry>,
    pipeline: Arc<InvocationPipeline>,
}

impl ServiceProxy {
    pub(crate) fn new(registry: Arc<OperationRegistry>, pipeline: Arc<InvocationPipeline>) -> Self {
        Self { registry, pipeline }
    }

    /// Looks up `name`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MethodNotFound`] if no operation has that name.
    pub fn operation(&self, name: &str) -> Result<OperationHandle, ClientError> {
        let entry = self.registry.lookup(name)?;
        let pipeline = Arc::clone(&self.pipeline);
        if entry.is_overloaded() {
            return Ok(OperationHandle::Overloaded(OverloadSet {
                entry: entry.clone(),
                pipeline,
            }));
        }
        let signature = entry
            .get(0)
            .cloned()
            .ok_or_else(|| ClientError::MethodNotFound(name.to_string()))?;
        Ok(OperationHandle::Single(BoundCall {
            signature,
            pipeline,
        }))
    }

    /// Operation names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    #[must_use]
    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }
}

/// A call pre-bound to one signature. Arguments bind positionally, then by
/// name, with no name-set check.
#[derive(Debug, Clone)]
pub struct BoundCall {
    signature: Arc<OperationSignature>,
    pipeline: Arc<InvocationPipeline>,
}

impl BoundCall {
    #[must_use]
    pub fn signature(&self) -> &Arc<OperationSignature> {
        &self.signature
    }

    /// Invokes the operation.
    ///
    /// # Errors
    ///
    /// See [`InvocationPipeline::invoke`].
    pub async fn call(&self, args: CallArguments) -> Result<Response, ClientError> {
        let invocation = BoundInvocation::bind(Arc::clone(&self.signature), &args);
        self.pipeline
            .invoke(invocation, args.injected().cloned())
            .await
    }
}

/// Several signatures sharing one name.
#[derive(Debug, Clone)]
pub struct OverloadSet {
    entry: OperationEntry,
    pipeline: Arc<InvocationPipeline>,
}

impl OverloadSet {
    /// Pre-selects the `index`-th signature in declaration order.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::OverloadIndexOutOfRange`] past the last signature.
    pub fn index(&self, index: usize) -> Result<BoundCall, ClientError> {
        let signature = resolver::select(&self.entry, &CallArguments::new(), Some(index))?;
        Ok(BoundCall {
            signature: Arc::clone(signature),
            pipeline: Arc::clone(&self.pipeline),
        })
    }

    /// Resolves a signature from the keyword names and invokes it.
    ///
    /// # Errors
    ///
    /// Overload errors from [`resolver::select`], then those of
    /// [`InvocationPipeline::invoke`].
    pub async fn call(&self, args: CallArguments) -> Result<Response, ClientError> {
        let signature = Arc::clone(resolver::select(&self.entry, &args, None)?);
        let invocation = BoundInvocation::bind(signature, &args);
        self.pipeline
            .invoke(invocation, args.injected().cloned())
            .await
    }

    #[must_use]
    pub fn signatures(&self) -> &[Arc<OperationSignature>] {
        self.entry.signatures()
    }
}

/// Handle returned by [`ServiceProxy::operation`].
#[derive(Debug, Clone)]
pub enum OperationHandle {
    Single(BoundCall),
    Overloaded(OverloadSet),
}

impl OperationHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            OperationHandle::Single(call) => call.signature.name(),
            OperationHandle::Overloaded(set) => set.entry.name(),
        }
    }

    /// Invokes the operation, resolving the overload first when needed.
    ///
    /// # Errors
    ///
    /// See [`BoundCall::call`] and [`OverloadSet::call`].
    pub async fn call(&self, args: CallArguments) -> Result<Response, ClientError> {
        match self {
            OperationHandle::Single(call) => call.call(args).await,
            OperationHandle::Overloaded(set) => set.call(args).await,
        }
    }

    /// Pre-selects a signature by declaration index. A single-signature
    /// handle only accepts index 0.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::OverloadIndexOutOfRange`] past the last signature.
    pub fn index(&self, index: usize) -> Result<BoundCall, ClientError> {
        match self {
            OperationHandle::Single(call) if index == 0 => Ok(call.clone()),
            OperationHandle::Single(call) => Err(ClientError::OverloadIndexOutOfRange {
                name: call.signature.name().to_string(),
                index,
                count: 1,
            }),
            OperationHandle::Overloaded(set) => set.index(index),
        }
    }

    /// Candidate signatures in declaration order.
    #[must_use]
    pub fn signatures(&self) -> &[Arc<OperationSignature>] {
        match self {
            OperationHandle::Single(call) => std::slice::from_ref(&call.signature),
            OperationHandle::Overloaded(set) => set.signatures(),
        }
    }

    /// The bound signature; `None` for an unresolved overload set.
    #[must_use]
    pub fn signature(&self) -> Option<&Arc<OperationSignature>> {
        match self {
            OperationHandle::Single(call) => Some(&call.signature),
            OperationHandle::Overloaded(_) => None,
        }
    }

    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        matches!(self, OperationHandle::Overloaded(_))
    }
}
