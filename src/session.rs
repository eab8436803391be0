use crate::{
    auth::{self, Authentication, BearerAuth},
    config::ClientConfig,
    error::LandaxResult,
};
use reqwest::{header::HeaderMap, Client};
use std::fmt;
use url::Url;

/// Authenticated session.
///
/// Built once per client and never mutated. The token is not refreshed;
/// once it expires requests fail with `Unauthorized` and a new client is needed.
#[derive(Clone)]
pub struct Session {
    base_url: Url,
    api_url: Url,
    bearer_token: String,
    headers: HeaderMap,
}

impl Session {
    /// Validate `config`, fetch a token and build the default headers
    pub async fn establish(http: &Client, config: &ClientConfig) -> LandaxResult<Self> {
        config.validate()?;
        let base_url = config.root_url()?;
        let token = auth::request_token(http, &base_url, &config.credentials).await?;
        Self::build(config, token).await
    }

    /// Validate `config` and build a session around an already issued token
    pub async fn from_token(config: &ClientConfig, token: impl Into<String>) -> LandaxResult<Self> {
        config.validate()?;
        Self::build(config, token.into()).await
    }

    async fn build(config: &ClientConfig, bearer_token: String) -> LandaxResult<Self> {
        let mut headers = HeaderMap::new();
        BearerAuth::new(bearer_token.clone())
            .apply_auth(&mut headers)
            .await?;

        Ok(Self {
            base_url: config.root_url()?,
            api_url: config.api_url()?,
            bearer_token,
            headers,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn api_url(&self) -> &Url {
        &self.api_url
    }

    pub fn bearer_token(&self) -> &str {
        &self.bearer_token
    }

    /// Headers sent with every request
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .field("api_url", &self.api_url.as_str())
            .finish_non_exhaustive()
    }
}
