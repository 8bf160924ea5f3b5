use serde::{Deserialize, Serialize};

/// A named, typed parameter. Order within a signature is significant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter (part) name.
    pub name: String,
    /// Declared type reference, e.g. `xsd:int` or a schema type name.
    #[serde(rename = "type")]
    pub type_ref: String,
}

impl ParameterSpec {
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
        }
    }
}

/// One concrete shape of an operation. Immutable once built.
///
/// Several signatures may share a `name`; they are then an overload set and
/// are told apart by their input parameter names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationSignature {
    name: String,
    action: String,
    endpoint: String,
    inputs: Vec<ParameterSpec>,
    outputs: Vec<ParameterSpec>,
}

impl OperationSignature {
    /// Starts a signature for `name` posted to `endpoint`.
    #[must_use]
    pub fn builder(name: impl Into<String>, endpoint: impl Into<String>) -> SignatureBuilder {
        SignatureBuilder {
            signature: OperationSignature {
                name: name.into(),
                action: String::new(),
                endpoint: endpoint.into(),
                inputs: Vec::new(),
                outputs: Vec::new(),
            },
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// SOAP action sent in the `SOAPAction` header.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// URL the request is posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn inputs(&self) -> &[ParameterSpec] {
        &self.inputs
    }

    #[must_use]
    pub fn outputs(&self) -> &[ParameterSpec] {
        &self.outputs
    }

    /// Input parameter names in declaration order.
    pub fn input_names(&self) -> impl Iterator<Item = &str> {
        self.inputs.iter().map(|p| p.name.as_str())
    }
}

/// Builder for [`OperationSignature`].
#[derive(Debug)]
pub struct SignatureBuilder {
    signature: OperationSignature,
}

impl SignatureBuilder {
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.signature.action = action.into();
        self
    }

    #[must_use]
    pub fn input(mut self, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        self.signature.inputs.push(ParameterSpec::new(name, type_ref));
        self
    }

    #[must_use]
    pub fn output(mut self, name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        self.signature.outputs.push(ParameterSpec::new(name, type_ref));
        self
    }

    #[must_use]
    pub fn inputs(mut self, inputs: Vec<ParameterSpec>) -> Self {
        self.signature.inputs = inputs;
        self
    }

    #[must_use]
    pub fn outputs(mut self, outputs: Vec<ParameterSpec>) -> Self {
        self.signature.outputs = outputs;
        self
    }

    #[must_use]
    pub fn build(self) -> OperationSignature {
        self.signature
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_preserves_parameter_order() {
        let sig = OperationSignature::builder("Disco.Submit", "http://localhost/duck")
            .action("urn:Disco.Submit")
            .input("sessionID", "xsd:int")
            .input("errorMessage", "xsd:string")
            .input("assetData", "xsd:string")
            .output("resendList", "xsd:string")
            .build();

        assert_eq!(sig.name(), "Disco.Submit");
        assert_eq!(sig.action(), "urn:Disco.Submit");
        assert_eq!(
            sig.input_names().collect::<Vec<_>>(),
            vec!["sessionID", "errorMessage", "assetData"]
        );
        assert_eq!(sig.outputs().len(), 1);
    }
}
