use soapline_core::{BindingError, FactoryError, Fault, RegistryError};

use crate::transport::NetworkError;

/// Errors surfaced to callers of the client.
///
/// Resolution and construction errors (`MethodNotFound`, the overload
/// errors, `Factory`) are caller mistakes and always propagate. `ServiceFault`
/// and `Transport` only appear when the client raises faults; otherwise they
/// are returned as a `(status, detail)` pair.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("method not found: '{0}'")]
    MethodNotFound(String),
    #[error("no overload of '{0}' matches the supplied argument names")]
    OverloadedMethodNotMatching(String),
    #[error("overloaded method '{0}' cannot be called with positional arguments")]
    OverloadedMethodWithPositionalArguments(String),
    #[error("overload index {index} out of range for '{name}' ({count} signatures)")]
    OverloadIndexOutOfRange {
        name: String,
        index: usize,
        count: usize,
    },
    #[error(transparent)]
    Factory(#[from] FactoryError),
    #[error("server raised fault: {0}")]
    ServiceFault(Fault),
    #[error("transport failed with HTTP {status}: {reason}")]
    Transport { status: u16, reason: String },
    #[error(transparent)]
    Network(#[from] NetworkError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error("failed to load service description from {locator}: {source}")]
    Description {
        locator: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<RegistryError> for ClientError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::MethodNotFound(name) => ClientError::MethodNotFound(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_errors_name_the_operation() {
        let err = ClientError::OverloadedMethodNotMatching("Disco.Submit".to_string());
        assert!(err.to_string().contains("'Disco.Submit'"));
        let err = ClientError::OverloadedMethodWithPositionalArguments("Disco.Submit".to_string());
        assert!(err.to_string().contains("'Disco.Submit'"));
    }

    #[test]
    fn registry_error_maps_to_method_not_found() {
        let err: ClientError = RegistryError::MethodNotFound("Nope".to_string()).into();
        assert!(matches!(err, ClientError::MethodNotFound(name) if name == "Nope"));
    }
}
