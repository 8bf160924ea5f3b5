//! Soapline Client: overload resolution, the invocation pipeline, the HTTP
//! transport stack, and the literal SOAP binding.
//!
//! ```no_run
//! # async fn run() -> Result<(), soapline_client::ClientError> {
//! use soapline_client::{CallArguments, Client, ClientConfig};
//!
//! let client = Client::connect("duck_service.json", ClientConfig::default()).await?;
//! let reply = client
//!     .operation("Disco.Submit")?
//!     .call(
//!         CallArguments::new()
//!             .kw("sessionID", 1)
//!             .kw("errorMessage", "No error")
//!             .kw("assetData", "Data"),
//!     )
//!     .await?;
//! # let _ = reply;
//! # Ok(())
//! # }
//! ```

pub mod args;
pub mod binding;
pub mod client;
pub mod config;
pub mod description;
pub mod error;
pub mod invocation;
pub mod pipeline;
pub mod proxy;
pub mod resolver;
pub mod transport;

pub use args::{CallArguments, InjectedReply, INJECT_KEY, SOAP_HEADERS_KEY};
pub use binding::LiteralBinding;
pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, FaultPolicy};
pub use description::{source_for, FileDescription, UrlDescription};
pub use error::ClientError;
pub use invocation::BoundInvocation;
pub use pipeline::{Detail, InvocationPipeline, OutboundMessage, Response};
pub use proxy::{BoundCall, OperationHandle, OverloadSet, ServiceProxy};
pub use transport::{HttpExchange, HttpReply, HttpTransport, NetworkError, TransportService};
