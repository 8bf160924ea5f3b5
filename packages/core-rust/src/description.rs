//! Service description document model.
//!
//! The description is the JSON document a client is constructed from. It
//! lists every declared operation in declaration order (overloads appear as
//! repeated names) and the named types the [`TypeFactory`](crate::TypeFactory)
//! can build.

use serde::{Deserialize, Serialize};

use crate::registry::OperationRegistry;
use crate::schema::{SchemaTree, TypeNode};
use crate::signature::{OperationSignature, ParameterSpec};

/// One declared operation shape as it appears in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationDef {
    pub name: String,
    /// SOAP action; empty when omitted.
    #[serde(default)]
    pub action: Option<String>,
    /// Per-operation endpoint; the service endpoint when omitted.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub inputs: Vec<ParameterSpec>,
    #[serde(default)]
    pub outputs: Vec<ParameterSpec>,
}

/// A parsed service description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceDescription {
    /// Service name.
    pub name: String,
    /// Target namespace of the operation wrappers and types.
    pub namespace: String,
    /// Default endpoint URL for every operation.
    pub endpoint: String,
    #[serde(default)]
    pub operations: Vec<OperationDef>,
    #[serde(default)]
    pub types: Vec<TypeNode>,
}

impl ServiceDescription {
    /// Parses a JSON description.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error if the document does not match the model.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Concrete signatures in declaration order.
    pub fn signatures(&self) -> impl Iterator<Item = OperationSignature> + '_ {
        self.operations.iter().map(|op| {
            OperationSignature::builder(
                op.name.clone(),
                op.endpoint.clone().unwrap_or_else(|| self.endpoint.clone()),
            )
            .action(op.action.clone().unwrap_or_default())
            .inputs(op.inputs.clone())
            .outputs(op.outputs.clone())
            .build()
        })
    }

    /// Builds the read-only registry and schema tree.
    #[must_use]
    pub fn into_parts(self) -> (OperationRegistry, SchemaTree) {
        let registry = OperationRegistry::from_signatures(self.signatures());
        (registry, SchemaTree::new(self.types))
    }
}
