//! Description sources selected by locator.

use std::path::PathBuf;

use anyhow::Context as _;
use async_trait::async_trait;
use soapline_core::{DescriptionSource, ServiceDescription};

/// JSON description read from the local filesystem.
#[derive(Debug, Clone)]
pub struct FileDescription {
    path: PathBuf,
}

impl FileDescription {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DescriptionSource for FileDescription {
    fn locator(&self) -> String {
        format!("file://{}", self.path.display())
    }

    async fn load(&self) -> anyhow::Result<ServiceDescription> {
        let json = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        let description = ServiceDescription::from_json_str(&json)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        tracing::debug!(
            path = %self.path.display(),
            operations = description.operations.len(),
            types = description.types.len(),
            "description loaded"
        );
        Ok(description)
    }
}

/// JSON description fetched with an HTTP GET.
#[derive(Debug, Clone)]
pub struct UrlDescription {
    url: String,
    client: reqwest::Client,
}

impl UrlDescription {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl DescriptionSource for UrlDescription {
    fn locator(&self) -> String {
        self.url.clone()
    }

    async fn load(&self) -> anyhow::Result<ServiceDescription> {
        let json = self
            .client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .with_context(|| format!("fetching {}", self.url))?
            .text()
            .await?;
        let description = ServiceDescription::from_json_str(&json)
            .with_context(|| format!("parsing {}", self.url))?;
        Ok(description)
    }
}

/// Picks a source for `locator`: `http(s)://` URLs are fetched, `file://`
/// URLs and bare paths are read from disk.
#[must_use]
pub fn source_for(locator: &str) -> Box<dyn DescriptionSource> {
    if locator.starts_with("http://") || locator.starts_with("https://") {
        Box::new(UrlDescription::new(locator))
    } else {
        let path = locator.strip_prefix("file://").unwrap_or(locator);
        Box::new(FileDescription::new(path))
    }
}
