//! Schema-driven construction of caller-facing value objects.
//!
//! [`TypeFactory`] resolves a type name against the [`SchemaTree`] and builds
//! a [`ValueObject`] whose attribute set is fixed by the resolved
//! [`TypeNode`]. Unknown attributes are rejected at construction and on every
//! later assignment, so an object never acquires fields outside its type.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::{SchemaTree, TypeNode, TypeRef};
use crate::types::Value;

/// Errors raised while resolving or building value objects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FactoryError {
    #[error("type not found: '{0}'")]
    TypeNotFound(String),
    #[error("failed to build type '{type_name}': {reason}")]
    Build { type_name: String, reason: String },
    #[error("'{type_name}' has no attribute '{attribute}'")]
    UnknownAttribute { type_name: String, attribute: String },
    #[error("enumeration '{type_name}' literal '{literal}' is read-only")]
    ReadOnlyLiteral { type_name: String, literal: String },
}

/// Whether a [`ValueObject`] mirrors a structured type or an enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObjectKind {
    Structure,
    Enumeration,
}

/// Strict-attribute instance of a schema type.
///
/// For a structure, attributes are the declared field names, initially null
/// (or an empty list for repeated fields, or a nested object for complex
/// fields). For an enumeration, attributes are the literal names and each
/// attribute's value is its own name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueObject {
    type_name: String,
    kind: ObjectKind,
    fields: Vec<(String, Value)>,
}

impl ValueObject {
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    #[must_use]
    pub fn is_enumeration(&self) -> bool {
        self.kind == ObjectKind::Enumeration
    }

    /// Reads an attribute. `None` means the attribute is not declared.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Assigns a declared attribute.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::UnknownAttribute`] if `name` is not declared by the
    ///   object's type.
    /// - [`FactoryError::ReadOnlyLiteral`] if the object is an enumeration;
    ///   each literal always holds its own name.
    ///
    /// The object is left unchanged on error.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FactoryError> {
        let kind = self.kind;
        match self.fields.iter_mut().find(|(k, _)| k == name) {
            Some(_) if kind == ObjectKind::Enumeration => Err(FactoryError::ReadOnlyLiteral {
                type_name: self.type_name.clone(),
                literal: name.to_string(),
            }),
            Some((_, slot)) => {
                *slot = value.into();
                Ok(())
            }
            None => Err(FactoryError::UnknownAttribute {
                type_name: self.type_name.clone(),
                attribute: name.to_string(),
            }),
        }
    }

    /// Attributes in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

/// Builds [`ValueObject`]s for types declared in a [`SchemaTree`].
#[derive(Debug, Clone)]
pub struct TypeFactory {
    schema: Arc<SchemaTree>,
}

impl TypeFactory {
    #[must_use]
    pub fn new(schema: Arc<SchemaTree>) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &SchemaTree {
        &self.schema
    }

    /// Creates an object of type `name` with every attribute at its default.
    ///
    /// # Errors
    ///
    /// See [`TypeFactory::create_with`].
    pub fn create(&self, name: &str) -> Result<ValueObject, FactoryError> {
        self.create_with(name, std::iter::empty::<(String, Value)>())
    }

    /// Creates an object of type `name` and assigns the given attributes.
    ///
    /// # Errors
    ///
    /// - [`FactoryError::TypeNotFound`] if `name` does not resolve.
    /// - [`FactoryError::Build`] if a nested field references an unknown type.
    /// - [`FactoryError::UnknownAttribute`] if a supplied attribute is not declared.
    /// - [`FactoryError::ReadOnlyLiteral`] if any attribute is supplied for an
    ///   enumeration.
    pub fn create_with<I, K, V>(&self, name: &str, fields: I) -> Result<ValueObject, FactoryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.constructor(name)?.build(fields)
    }

    /// Resolves `name` once and returns a reusable constructor for it. This
    /// is the subscript-style entry point: `factory.constructor("T")?.build(..)`
    /// is equivalent to `factory.create_with("T", ..)`.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::TypeNotFound`] if `name` does not resolve.
    pub fn constructor(&self, name: &str) -> Result<Constructor<'_>, FactoryError> {
        let node = self
            .schema
            .resolve(name)
            .ok_or_else(|| FactoryError::TypeNotFound(name.to_string()))?;
        Ok(Constructor {
            factory: self,
            node,
        })
    }

    fn build_node(&self, node: &TypeNode) -> Result<ValueObject, FactoryError> {
        if let TypeNode::Enumeration { name, literals } = node {
            return Ok(ValueObject {
                type_name: name.clone(),
                kind: ObjectKind::Enumeration,
                fields: literals
                    .iter()
                    .map(|lit| (lit.clone(), Value::String(lit.clone())))
                    .collect(),
            });
        }
        let mut stack = Vec::new();
        self.build_structure(node, &mut stack).map_err(|reason| {
            tracing::error!(type_name = node.name(), %reason, "value object construction failed");
            FactoryError::Build {
                type_name: node.name().to_string(),
                reason,
            }
        })
    }

    fn build_structure<'a>(
        &'a self,
        node: &'a TypeNode,
        stack: &mut Vec<&'a str>,
    ) -> Result<ValueObject, String> {
        stack.push(node.name());
        let mut fields = Vec::with_capacity(node.fields().len());
        for field in node.fields() {
            let initial = if field.repeated {
                Value::Array(Vec::new())
            } else {
                match self.schema.lookup_ref(&field.type_ref) {
                    Some(TypeRef::Node(child))
                        if matches!(child, TypeNode::Complex { .. })
                            && !stack.contains(&child.name()) =>
                    {
                        Value::Object(self.build_structure(child, stack)?)
                    }
                    Some(_) => Value::Null,
                    None => {
                        return Err(format!(
                            "field '{}' of '{}' references unknown type '{}'",
                            field.name,
                            node.name(),
                            field.type_ref
                        ))
                    }
                }
            };
            fields.push((field.name.clone(), initial));
        }
        stack.pop();
        Ok(ValueObject {
            type_name: node.name().to_string(),
            kind: ObjectKind::Structure,
            fields,
        })
    }
}

/// A resolved type ready to build objects; see [`TypeFactory::constructor`].
#[derive(Debug, Clone)]
pub struct Constructor<'a> {
    factory: &'a TypeFactory,
    node: &'a TypeNode,
}

impl Constructor<'_> {
    /// The resolved type descriptor.
    #[must_use]
    pub fn node(&self) -> &TypeNode {
        self.node
    }

    /// Builds an object and assigns the given attributes.
    ///
    /// # Errors
    ///
    /// Returns [`FactoryError::Build`], [`FactoryError::UnknownAttribute`] or
    /// [`FactoryError::ReadOnlyLiteral`].
    pub fn build<I, K, V>(&self, fields: I) -> Result<ValueObject, FactoryError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut object = self.factory.build_node(self.node)?;
        for (name, value) in fields {
            object.set(name.as_ref(), value)?;
        }
        Ok(object)
    }
}
