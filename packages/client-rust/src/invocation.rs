use std::sync::Arc;

use soapline_core::{OperationSignature, Value};

use crate::args::CallArguments;

/// Arguments bound to one signature, ready for serialization.
///
/// `values` is parallel to the signature's inputs and follows their
/// declared order, not the order the caller supplied arguments in. A `None`
/// entry is absent: it was omitted or supplied as null.
#[derive(Debug, Clone)]
pub struct BoundInvocation {
    pub signature: Arc<OperationSignature>,
    pub values: Vec<Option<Value>>,
    pub headers: Vec<Value>,
}

impl BoundInvocation {
    /// Binds `args` against `signature`.
    ///
    /// Positional values fill the leading inputs in order; the remaining
    /// inputs are looked up by name among the keyword arguments. Keywords
    /// naming no declared input are ignored, and positional values past the
    /// last input are dropped.
    #[must_use]
    pub fn bind(signature: Arc<OperationSignature>, args: &CallArguments) -> Self {
        let positional = args.positional();
        let inputs = signature.inputs();
        if positional.len() > inputs.len() {
            tracing::warn!(
                operation = signature.name(),
                supplied = positional.len(),
                declared = inputs.len(),
                "dropping excess positional arguments"
            );
        }
        let values = inputs
            .iter()
            .enumerate()
            .map(|(idx, param)| {
                positional
                    .get(idx)
                    .or_else(|| args.keyword(&param.name))
                    .filter(|value| !value.is_null())
                    .cloned()
            })
            .collect();
        Self {
            values,
            headers: args.headers().to_vec(),
            signature,
        }
    }

    /// Present parameters as `(name, value)` pairs in declared order.
    pub fn present(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.signature
            .inputs()
            .iter()
            .zip(&self.values)
            .filter_map(|(param, value)| value.as_ref().map(|v| (param.name.as_str(), v)))
    }
}
