//! Overload resolution: selects exactly one signature for a call.
//!
//! Single-signature entries bypass matching entirely. For an overload set,
//! positional arguments are rejected outright and keyword names must equal
//! one signature's input-name set exactly; zero or several matches fail.
//! An explicit index skips both checks.

use std::collections::BTreeSet;
use std::sync::Arc;

use soapline_core::{OperationEntry, OperationSignature};

use crate::args::CallArguments;
use crate::error::ClientError;

/// Selects a signature from `entry` by exact input-name set equality.
///
/// # Errors
///
/// Returns [`ClientError::OverloadedMethodNotMatching`] unless exactly one
/// signature's input names equal `provided`.
pub fn resolve<'a>(
    entry: &'a OperationEntry,
    provided: &BTreeSet<&str>,
) -> Result<&'a Arc<OperationSignature>, ClientError> {
    let mut matches = entry.signatures().iter().filter(|signature| {
        signature.inputs().len() == provided.len()
            && signature.input_names().all(|name| provided.contains(name))
    });
    match (matches.next(), matches.next()) {
        (Some(signature), None) => Ok(signature),
        (first, _) => {
            tracing::debug!(
                operation = entry.name(),
                provided = ?provided,
                ambiguous = first.is_some(),
                "no unique overload matches"
            );
            Err(ClientError::OverloadedMethodNotMatching(
                entry.name().to_string(),
            ))
        }
    }
}

/// Picks the signature a call binds against.
///
/// # Errors
///
/// - [`ClientError::OverloadIndexOutOfRange`] when `index` is past the end.
/// - [`ClientError::OverloadedMethodWithPositionalArguments`] when an
///   overload set is called positionally without an index.
/// - [`ClientError::OverloadedMethodNotMatching`] from [`resolve`].
pub fn select<'a>(
    entry: &'a OperationEntry,
    args: &CallArguments,
    index: Option<usize>,
) -> Result<&'a Arc<OperationSignature>, ClientError> {
    if let Some(index) = index {
        return entry
            .get(index)
            .ok_or_else(|| ClientError::OverloadIndexOutOfRange {
                name: entry.name().to_string(),
                index,
                count: entry.len(),
            });
    }
    if !entry.is_overloaded() {
        return entry
            .get(0)
            .ok_or_else(|| ClientError::MethodNotFound(entry.name().to_string()));
    }
    if !args.positional().is_empty() {
        return Err(ClientError::OverloadedMethodWithPositionalArguments(
            entry.name().to_string(),
        ));
    }
    let selected = resolve(entry, &args.keyword_names())?;
    tracing::debug!(
        operation = entry.name(),
        inputs = ?selected.input_names().collect::<Vec<_>>(),
        "overload selected by argument names"
    );
    Ok(selected)
}
