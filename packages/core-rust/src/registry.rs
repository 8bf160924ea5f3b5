//! Operation registry: groups declared signatures by operation name.
//!
//! The registry is built once from the service description and is read-only
//! for the client's lifetime. Declaration order is preserved both across
//! names and within each name's overload set, so index-based selection and
//! listings are deterministic.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::signature::OperationSignature;

/// Errors raised by registry lookups.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("method not found: '{0}'")]
    MethodNotFound(String),
}

/// All signatures sharing one operation name, in declaration order.
#[derive(Debug, Clone)]
pub struct OperationEntry {
    name: String,
    signatures: Vec<Arc<OperationSignature>>,
}

impl OperationEntry {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn signatures(&self) -> &[Arc<OperationSignature>] {
        &self.signatures
    }

    /// The i-th signature in declaration order.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Arc<OperationSignature>> {
        self.signatures.get(index)
    }

    /// More than one signature shares this name.
    #[must_use]
    pub fn is_overloaded(&self) -> bool {
        self.signatures.len() > 1
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// Mapping from operation name to its [`OperationEntry`].
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    entries: Vec<OperationEntry>,
    by_name: HashMap<String, usize>,
}

impl OperationRegistry {
    /// Groups signatures by name. The first occurrence of a name fixes its
    /// position among entries; later signatures append to that entry.
    #[must_use]
    pub fn from_signatures(signatures: impl IntoIterator<Item = OperationSignature>) -> Self {
        let mut entries: Vec<OperationEntry> = Vec::new();
        let mut by_name = HashMap::new();
        for signature in signatures {
            let idx = *by_name
                .entry(signature.name().to_string())
                .or_insert_with(|| {
                    entries.push(OperationEntry {
                        name: signature.name().to_string(),
                        signatures: Vec::new(),
                    });
                    entries.len() - 1
                });
            entries[idx].signatures.push(Arc::new(signature));
        }
        tracing::debug!(operations = entries.len(), "operation registry built");
        Self { entries, by_name }
    }

    /// Looks up the entry for `name`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MethodNotFound`] when no operation has that name.
    pub fn lookup(&self, name: &str) -> Result<&OperationEntry, RegistryError> {
        self.by_name
            .get(name)
            .map(|&idx| &self.entries[idx])
            .ok_or_else(|| RegistryError::MethodNotFound(name.to_string()))
    }

    /// Entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &OperationEntry> {
        self.entries.iter()
    }

    /// Operation names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(OperationEntry::name)
    }

    /// Number of distinct operation names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
