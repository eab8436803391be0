use crate::{
    auth::Credentials,
    error::{LandaxError, LandaxResult},
    pagination::{PagingStrategy, MAX_PAGE_SIZE},
};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Client configuration.
///
/// All credential fields and the host are required; `validate` reports the
/// first one that is missing. Everything else has a default.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Service host, e.g. `example.landax.no`
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub credentials: Credentials,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Replaces `https://<url>/` as the service root
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub paging: PagingStrategy,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_api_version() -> String {
    "v20".to_string()
}

fn default_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl ClientConfig {
    pub fn new(url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            url: url.into(),
            credentials,
            api_version: default_api_version(),
            base_url: None,
            paging: PagingStrategy::default(),
            page_size: default_page_size(),
            timeout_secs: None,
        }
    }

    /// Parse a JSON configuration object and validate it
    pub fn from_json_str(json: &str) -> LandaxResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    pub fn with_paging(mut self, paging: PagingStrategy) -> Self {
        self.paging = paging;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    pub fn validate(&self) -> LandaxResult<()> {
        self.credentials.validate()?;

        if self.url.trim().is_empty() && self.base_url.is_none() {
            return Err(LandaxError::MissingField("url"));
        }
        if self.api_version.trim().is_empty() {
            return Err(LandaxError::MissingField("api_version"));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(LandaxError::invalid_param(format!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            )));
        }
        Ok(())
    }

    /// Service root, always ending in `/`
    pub fn root_url(&self) -> LandaxResult<Url> {
        let raw = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}/", self.url.trim_matches('/')),
        };
        let raw = if raw.ends_with('/') { raw } else { format!("{}/", raw) };
        Ok(Url::parse(&raw)?)
    }

    /// `<root>/api/<version>/`
    pub fn api_url(&self) -> LandaxResult<Url> {
        let root = self.root_url()?;
        Ok(root.join(&format!("api/{}/", self.api_version.trim_matches('/')))?)
    }
}
