//! Schema tree: named type descriptors resolved from the service description.
//!
//! A [`SchemaTree`] is built once per client and is read-only afterwards. It
//! answers two questions for the [`TypeFactory`](crate::factory::TypeFactory):
//! which [`TypeNode`] a caller-supplied name refers to, and whether a field's
//! type reference points at another node or at a built-in XSD leaf type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Single field definition within a structured type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Name of the field (element name on the wire).
    pub name: String,
    /// Type reference: a node name in the same tree or a built-in XSD type.
    #[serde(rename = "type")]
    pub type_ref: String,
    /// Whether the field may occur more than once (`maxOccurs > 1`).
    #[serde(default)]
    pub repeated: bool,
}

impl FieldDef {
    /// Creates a single-occurrence field.
    #[must_use]
    pub fn new(name: impl Into<String>, type_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_ref: type_ref.into(),
            repeated: false,
        }
    }

    /// Marks the field as repeated.
    #[must_use]
    pub fn repeated(mut self) -> Self {
        self.repeated = true;
        self
    }
}

/// A schema-resolved type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeNode {
    /// Structured type with ordered named fields.
    Complex { name: String, fields: Vec<FieldDef> },
    /// Enumeration with an ordered set of literal names.
    Enumeration { name: String, literals: Vec<String> },
    /// Named restriction of a built-in type. Treated as a leaf.
    Simple {
        name: String,
        #[serde(default)]
        base: Option<String>,
    },
}

impl TypeNode {
    /// Declared name of the type.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            TypeNode::Complex { name, .. }
            | TypeNode::Enumeration { name, .. }
            | TypeNode::Simple { name, .. } => name,
        }
    }

    #[must_use]
    pub fn is_enumeration(&self) -> bool {
        matches!(self, TypeNode::Enumeration { .. })
    }

    /// Declared fields; empty for enumerations and simple types.
    #[must_use]
    pub fn fields(&self) -> &[FieldDef] {
        match self {
            TypeNode::Complex { fields, .. } => fields,
            _ => &[],
        }
    }
}

/// What a field's type reference points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRef<'a> {
    /// A node declared in the tree.
    Node(&'a TypeNode),
    /// A built-in XSD leaf type such as `xsd:string`.
    Builtin(&'a str),
}

/// Read-only collection of [`TypeNode`]s indexed by name.
#[derive(Debug, Clone, Default)]
pub struct SchemaTree {
    nodes: Vec<TypeNode>,
    by_name: HashMap<String, usize>,
}

impl SchemaTree {
    /// Builds the tree. When two nodes share a name the first declared wins.
    #[must_use]
    pub fn new(nodes: Vec<TypeNode>) -> Self {
        let mut by_name = HashMap::with_capacity(nodes.len());
        for (idx, node) in nodes.iter().enumerate() {
            by_name.entry(node.name().to_string()).or_insert(idx);
        }
        Self { nodes, by_name }
    }

    /// Whether `type_ref` names a built-in XSD type. Only the local name
    /// counts, so `xsd:string`, `s:string` and `string` all qualify.
    #[must_use]
    pub fn is_builtin(type_ref: &str) -> bool {
        XSD_BUILTINS.contains(&local_name(type_ref))
    }

    /// Looks up a node by name. Accepts `name`, `prefix:name` and
    /// `{namespace}name`; qualifiers are dropped when the exact form is unknown.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&TypeNode> {
        if let Some(&idx) = self.by_name.get(name) {
            return Some(&self.nodes[idx]);
        }
        let local = local_name(name);
        if local == name {
            return None;
        }
        self.by_name.get(local).map(|&idx| &self.nodes[idx])
    }

    /// Resolves a type name or a dotted path (`Type.field.subfield`) whose
    /// segments after the first walk field type references.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<&TypeNode> {
        if let Some(node) = self.get(path) {
            return Some(node);
        }
        let mut segments = path.split('.');
        let mut current = self.get(segments.next()?)?;
        for segment in segments {
            let field = current.fields().iter().find(|f| f.name == segment)?;
            current = self.get(&field.type_ref)?;
        }
        Some(current)
    }

    /// Classifies a field type reference. `None` means it is neither a
    /// built-in nor a declared node. Declared nodes shadow built-in names.
    #[must_use]
    pub fn lookup_ref<'a>(&'a self, type_ref: &'a str) -> Option<TypeRef<'a>> {
        if let Some(node) = self.get(type_ref) {
            return Some(TypeRef::Node(node));
        }
        Self::is_builtin(type_ref).then_some(TypeRef::Builtin(type_ref))
    }

    /// All nodes in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeNode> {
        self.nodes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Built-in datatypes of XML Schema part 2, plus `anyType`.
const XSD_BUILTINS: &[&str] = &[
    "anyType",
    "anySimpleType",
    "anyURI",
    "base64Binary",
    "boolean",
    "byte",
    "date",
    "dateTime",
    "decimal",
    "double",
    "duration",
    "ENTITIES",
    "ENTITY",
    "float",
    "gDay",
    "gMonth",
    "gMonthDay",
    "gYear",
    "gYearMonth",
    "hexBinary",
    "ID",
    "IDREF",
    "IDREFS",
    "int",
    "integer",
    "language",
    "long",
    "Name",
    "NCName",
    "negativeInteger",
    "NMTOKEN",
    "NMTOKENS",
    "nonNegativeInteger",
    "nonPositiveInteger",
    "normalizedString",
    "NOTATION",
    "positiveInteger",
    "QName",
    "short",
    "string",
    "time",
    "token",
    "unsignedByte",
    "unsignedInt",
    "unsignedLong",
    "unsignedShort",
];

fn local_name(name: &str) -> &str {
    let name = name.rsplit_once('}').map_or(name, |(_, rest)| rest);
    name.rsplit_once(':').map_or(name, |(_, rest)| rest)
}
