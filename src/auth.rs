use crate::error::{LandaxError, LandaxResult};
use log::{debug, info};
use reqwest::{header::HeaderMap, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Authentication trait for the Landax API
#[async_trait::async_trait]
pub trait Authentication: Send + Sync {
    /// Apply authentication to the request headers
    async fn apply_auth(&self, headers: &mut HeaderMap) -> LandaxResult<()>;
}

/// OAuth password-grant credentials
#[derive(Clone, Default, Deserialize)]
pub struct Credentials {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// Fails on the first required field that is empty
    pub fn validate(&self) -> LandaxResult<()> {
        let fields = [
            ("username", &self.username),
            ("password", &self.password),
            ("client_id", &self.client_id),
            ("client_secret", &self.client_secret),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(LandaxError::MissingField(name));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// Exchange credentials for a bearer token at `<base>/authenticate/token`.
///
/// Any status other than 200 is `AuthRejected`; a body that is not JSON or
/// has no `access_token` is `AuthMalformed`. Nothing is retried.
pub async fn request_token(
    http: &Client,
    base_url: &Url,
    credentials: &Credentials,
) -> LandaxResult<String> {
    let mut url = base_url.join("authenticate/token")?;
    url.query_pairs_mut().append_pair("grant_type", "password");

    info!("Requesting OAuth token for user {}", credentials.username);
    debug!("HTTP POST {}", url);

    let body = TokenRequest {
        client_id: &credentials.client_id,
        client_secret: &credentials.client_secret,
        username: &credentials.username,
        password: &credentials.password,
    };
    let response = http.post(url).json(&body).send().await?;
    let status = response.status();
    let text = response.text().await?;

    if status != StatusCode::OK {
        return Err(LandaxError::AuthRejected {
            status: status.as_u16(),
            body: text,
        });
    }

    match serde_json::from_str::<TokenResponse>(&text) {
        Ok(TokenResponse {
            access_token: Some(token),
        }) => Ok(token),
        _ => Err(LandaxError::AuthMalformed(text)),
    }
}

/// Bearer token authentication
#[derive(Debug, Clone)]
pub struct BearerAuth {
    token: String,
}

impl BearerAuth {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait::async_trait]
impl Authentication for BearerAuth {
    async fn apply_auth(&self, headers: &mut HeaderMap) -> LandaxResult<()> {
        let auth_value = format!("Bearer {}", self.token);
        headers.insert(
            reqwest::header::AUTHORIZATION,
            auth_value
                .parse()
                .map_err(|e| LandaxError::AuthMalformed(format!("Invalid auth header: {}", e)))?,
        );

        Ok(())
    }
}
