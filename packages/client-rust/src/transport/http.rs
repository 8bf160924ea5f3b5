//! `reqwest`-backed transport.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use reqwest::cookie::Jar;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Proxy, Url};
use tower::Service;

use super::{HttpExchange, HttpReply, NetworkError};
use crate::config::ClientConfig;

const SOAP_CONTENT_TYPE: &str = "text/xml";
const SOAP_ACTION: &str = "SOAPAction";

/// Returns the proxy configured for `url`'s scheme, if any.
#[must_use]
pub fn select_proxy<'a>(proxies: &'a HashMap<String, String>, url: &Url) -> Option<&'a str> {
    proxies.get(url.scheme()).map(String::as_str)
}

/// Posts SOAP envelopes over HTTP.
///
/// Cookies set by the endpoint persist for the life of the transport and
/// all its clones.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport routing requests through `config.proxies`.
    ///
    /// # Errors
    ///
    /// Returns [`NetworkError::InvalidEndpoint`] if a proxy URL does not
    /// parse, or [`NetworkError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, NetworkError> {
        for (scheme, proxy) in &config.proxies {
            Url::parse(proxy).map_err(|e| NetworkError::InvalidEndpoint {
                endpoint: proxy.clone(),
                reason: format!("proxy for '{scheme}': {e}"),
            })?;
        }

        let jar = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder().cookie_provider(jar);
        if !config.proxies.is_empty() {
            let proxies = config.proxies.clone();
            builder = builder.proxy(Proxy::custom(move |url| {
                let selected = select_proxy(&proxies, url)?;
                tracing::debug!(url = %url, proxy = selected, "routing through proxy");
                Url::parse(selected).ok()
            }));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

impl Service<HttpExchange> for HttpTransport {
    type Response = HttpReply;
    type Error = NetworkError;
    type Future = Pin<Box<dyn Future<Output = Result<HttpReply, NetworkError>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, exchange: HttpExchange) -> Self::Future {
        let client = self.client.clone();
        Box::pin(async move {
            let url =
                Url::parse(&exchange.endpoint).map_err(|e| NetworkError::InvalidEndpoint {
                    endpoint: exchange.endpoint.clone(),
                    reason: e.to_string(),
                })?;
            tracing::debug!(
                soap_action = %exchange.soap_action,
                content_type = SOAP_CONTENT_TYPE,
                "request headers"
            );
            let response = client
                .post(url)
                .header(SOAP_ACTION, exchange.soap_action)
                .header(CONTENT_TYPE, SOAP_CONTENT_TYPE)
                .body(exchange.body)
                .send()
                .await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?;
            Ok(HttpReply::new(status, body))
        })
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use tower::ServiceExt;

    use super::*;

    fn proxies() -> HashMap<String, String> {
        HashMap::from([("http".to_string(), "http://proxy.local:3128".to_string())])
    }

    #[test]
    fn proxy_selected_by_scheme() {
        let proxies = proxies();
        let http = Url::parse("http://example.com/svc").unwrap();
        let https = Url::parse("https://example.com/svc").unwrap();
        assert_eq!(select_proxy(&proxies, &http), Some("http://proxy.local:3128"));
        assert_eq!(select_proxy(&proxies, &https), None);
    }

    #[test]
    fn invalid_proxy_is_rejected() {
        let config = ClientConfig {
            proxies: HashMap::from([("http".to_string(), "not a url".to_string())]),
            ..ClientConfig::default()
        };
        let err = HttpTransport::new(&config).unwrap_err();
        assert!(matches!(err, NetworkError::InvalidEndpoint { endpoint, .. } if endpoint == "not a url"));
    }

    #[tokio::test]
    async fn invalid_endpoint_fails_without_status() {
        let config = ClientConfig {
            proxies: proxies(),
            ..ClientConfig::default()
        };
        let transport = HttpTransport::new(&config).unwrap();
        let err = transport
            .oneshot(HttpExchange {
                endpoint: "::not-a-url".to_string(),
                soap_action: "\"\"".to_string(),
                body: Bytes::new(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NetworkError::InvalidEndpoint { .. }));
    }
}
