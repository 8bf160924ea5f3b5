//! Client entry point.

use std::sync::Arc;

use soapline_core::{
    Binding, DescriptionSource, ServiceDescription, TypeFactory, Value, ValueObject,
};
use tower::Service;

use crate::binding::LiteralBinding;
use crate::config::ClientConfig;
use crate::description::source_for;
use crate::error::ClientError;
use crate::pipeline::{InvocationPipeline, OutboundMessage};
use crate::proxy::{OperationHandle, ServiceProxy};
use crate::transport::{
    build_transport_stack, HttpExchange, HttpReply, HttpTransport, NetworkError, TransportService,
};

/// A client for one described service.
///
/// Cloning is cheap; clones share the registry, schema, cookie jar, and
/// last-sent diagnostic.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    name: String,
    config: ClientConfig,
    service: ServiceProxy,
    factory: TypeFactory,
    pipeline: Arc<InvocationPipeline>,
}

impl Client {
    /// Loads the description at `locator` and builds a client over HTTP.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Description`] if the description cannot be
    /// loaded, or [`ClientError::Network`] if the HTTP client cannot be built.
    pub async fn connect(locator: &str, config: ClientConfig) -> Result<Self, ClientError> {
        let source = source_for(locator);
        Self::load(source.as_ref(), config).await
    }

    /// Builds a client from any [`DescriptionSource`].
    ///
    /// # Errors
    ///
    /// See [`Client::connect`].
    pub async fn load(
        source: &dyn DescriptionSource,
        config: ClientConfig,
    ) -> Result<Self, ClientError> {
        let description = source
            .load()
            .await
            .map_err(|err| ClientError::Description {
                locator: source.locator(),
                source: err,
            })?;
        Self::builder(description).config(config).build()
    }

    #[must_use]
    pub fn builder(description: ServiceDescription) -> ClientBuilder {
        ClientBuilder {
            description,
            config: ClientConfig::default(),
            binding: None,
            transport: None,
        }
    }

    /// Service name from the description.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    #[must_use]
    pub fn service(&self) -> &ServiceProxy {
        &self.inner.service
    }

    /// Shorthand for `client.service().operation(name)`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MethodNotFound`] for an unknown name.
    pub fn operation(&self, name: &str) -> Result<OperationHandle, ClientError> {
        self.inner.service.operation(name)
    }

    #[must_use]
    pub fn factory(&self) -> &TypeFactory {
        &self.inner.factory
    }

    /// Shorthand for `client.factory().create_with(name, fields)`.
    ///
    /// # Errors
    ///
    /// See [`TypeFactory::create_with`].
    pub fn create<I, K, V>(&self, name: &str, fields: I) -> Result<ValueObject, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        Ok(self.inner.factory.create_with(name, fields)?)
    }

    /// The most recently serialized request, if any call has been made.
    #[must_use]
    pub fn last_sent(&self) -> Option<OutboundMessage> {
        self.inner.pipeline.last_sent()
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }
}

/// Assembles a [`Client`] from a description and optional collaborators.
pub struct ClientBuilder {
    description: ServiceDescription,
    config: ClientConfig,
    binding: Option<Arc<dyn Binding>>,
    transport: Option<TransportService>,
}

impl ClientBuilder {
    #[must_use]
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the default [`LiteralBinding`].
    #[must_use]
    pub fn binding(mut self, binding: Arc<dyn Binding>) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Replaces the default [`HttpTransport`]. The trace layer is applied
    /// around `service` as well.
    #[must_use]
    pub fn transport<S>(mut self, service: S) -> Self
    where
        S: Service<HttpExchange, Response = HttpReply, Error = NetworkError>
            + Clone
            + Send
            + 'static,
        S::Future: Send + 'static,
    {
        self.transport = Some(build_transport_stack(service));
        self
    }

    /// # Errors
    ///
    /// Returns [`ClientError::Network`] if the default HTTP transport cannot
    /// be built from the configured proxies.
    pub fn build(self) -> Result<Client, ClientError> {
        let Self {
            description,
            config,
            binding,
            transport,
        } = self;

        let transport = match transport {
            Some(transport) => transport,
            None => build_transport_stack(HttpTransport::new(&config)?),
        };
        let binding =
            binding.unwrap_or_else(|| Arc::new(LiteralBinding::new(description.namespace.clone())));
        let name = description.name.clone();
        let (registry, schema) = description.into_parts();
        tracing::info!(
            service = %name,
            operations = registry.len(),
            types = schema.len(),
            raise_faults = config.raise_faults,
            "client ready"
        );

        let pipeline = Arc::new(InvocationPipeline::new(
            binding,
            transport,
            config.fault_policy(),
        ));
        Ok(Client {
            inner: Arc::new(ClientInner {
                name,
                service: ServiceProxy::new(Arc::new(registry), Arc::clone(&pipeline)),
                factory: TypeFactory::new(Arc::new(schema)),
                pipeline,
                config,
            }),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::CallArguments;
    use crate::pipeline::Response;

    const DOC: &str = r#"{
        "name": "Duck",
        "namespace": "urn:duck",
        "endpoint": "http://localhost/duck",
        "operations": [{"name": "Disco.List", "inputs": [{"name": "SessionID", "type": "xsd:int"}]}],
        "types": [{"kind": "complex", "name": "Pair",
                   "fields": [{"name": "Key", "type": "xsd:string"}]}]
    }"#;

    fn client() -> Client {
        Client::builder(ServiceDescription::from_json_str(DOC).unwrap())
            .transport(tower::service_fn(|_: HttpExchange| async {
                Ok::<_, NetworkError>(HttpReply::new(200, ""))
            }))
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn builder_wires_default_binding() {
        let client = client();
        assert_eq!(client.name(), "Duck");
        assert!(client.last_sent().is_none());
        let response = client
            .operation("Disco.List")
            .unwrap()
            .call(CallArguments::new().arg(5))
            .await
            .unwrap();
        assert_eq!(response, Response::Payload(None));
        let sent = client.last_sent().unwrap().to_string();
        assert!(sent.contains(r#"xmlns:ns0="urn:duck""#));
        assert!(sent.contains(">5</SessionID>"));
    }

    #[test]
    fn create_delegates_to_factory() {
        let pair = client().create("Pair", [("Key", "k")]).unwrap();
        assert_eq!(pair.get("Key"), Some(&Value::from("k")));
        assert!(matches!(
            client().create("Nope", std::iter::empty::<(String, Value)>()),
            Err(ClientError::Factory(_))
        ));
    }

    #[test]
    fn config_defaults_to_raising() {
        assert!(client().config().raise_faults);
    }
}
