//! Soapline Core: operation registry, schema tree, value objects, and the
//! collaborator traits a client is assembled from.

pub mod description;
pub mod factory;
pub mod registry;
pub mod schema;
pub mod signature;
pub mod traits;
pub mod types;

pub use description::{OperationDef, ServiceDescription};
pub use factory::{Constructor, FactoryError, ObjectKind, TypeFactory, ValueObject};
pub use registry::{OperationEntry, OperationRegistry, RegistryError};
pub use schema::{FieldDef, SchemaTree, TypeNode, TypeRef};
pub use signature::{OperationSignature, ParameterSpec, SignatureBuilder};
pub use traits::{Binding, BindingError, DescriptionSource, ReplyBody};
pub use types::{Fault, Value};
