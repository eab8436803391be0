use crate::{
    apis::{DocumentApi, RecordApi},
    config::ClientConfig,
    error::{LandaxError, LandaxResult},
    models::ErrorResponse,
    modules::ModuleRegistry,
    pagination::PagingStrategy,
    query::{build_url, QueryParams},
    session::Session,
};
use log::debug;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Main Landax client
#[derive(Clone)]
pub struct LandaxClient {
    client: Client,
    session: Arc<Session>,
    modules: Arc<ModuleRegistry>,
    paging: PagingStrategy,
    page_size: usize,
}

impl LandaxClient {
    /// Authenticate and create a client.
    ///
    /// The configuration is validated by the session before any request.
    pub async fn connect(config: ClientConfig) -> LandaxResult<Self> {
        let client = Self::http_client(&config)?;
        Self::with_client(client, config).await
    }

    /// Create a new client with custom reqwest client
    pub async fn with_client(client: Client, config: ClientConfig) -> LandaxResult<Self> {
        let session = Session::establish(&client, &config).await?;
        Ok(Self::from_parts(client, session, &config))
    }

    /// Create a client around an already issued bearer token.
    /// The identity endpoint is not contacted.
    pub async fn with_token(config: ClientConfig, token: impl Into<String>) -> LandaxResult<Self> {
        let client = Self::http_client(&config)?;
        let session = Session::from_token(&config, token).await?;
        Ok(Self::from_parts(client, session, &config))
    }

    fn http_client(config: &ClientConfig) -> LandaxResult<Client> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }

    fn from_parts(client: Client, session: Session, config: &ClientConfig) -> Self {
        Self {
            client,
            session: Arc::new(session),
            modules: Arc::new(ModuleRegistry::default()),
            paging: config.paging,
            page_size: config.page_size,
        }
    }

    /// Use `registry` to resolve module names in linked uploads
    pub fn with_module_registry(mut self, registry: ModuleRegistry) -> Self {
        self.modules = Arc::new(registry);
        self
    }

    pub fn module_registry(&self) -> &ModuleRegistry {
        &self.modules
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn paging(&self) -> PagingStrategy {
        self.paging
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Get Record API
    pub fn records(&self) -> RecordApi<'_> {
        RecordApi::new(self)
    }

    /// Get Document API
    pub fn documents(&self) -> DocumentApi<'_> {
        DocumentApi::new(self)
    }

    /// Absolute URL for `path` under the api root, with `params` appended
    pub fn url(&self, path: &str, params: &QueryParams) -> LandaxResult<String> {
        let url = self.session.api_url().join(path)?;
        Ok(build_url(url.as_str(), params))
    }

    /// Build a request carrying the session headers
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        debug!("HTTP {} {}", method, url);
        self.client
            .request(method, url)
            .headers(self.session.headers().clone())
    }

    /// Build a request with a JSON body.
    ///
    /// The content type goes on a copy of the session headers; the shared set
    /// is left as it is.
    pub fn json_request<B>(&self, method: Method, url: &str, body: &B) -> LandaxResult<RequestBuilder>
    where
        B: Serialize + ?Sized,
    {
        let mut headers = self.session.headers().clone();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        debug!("HTTP {} {} (json)", method, url);
        Ok(self
            .client
            .request(method, url)
            .headers(headers)
            .body(serde_json::to_vec(body)?))
    }

    /// Send a request and hand back the raw response, whatever its status
    pub async fn send(&self, request: RequestBuilder) -> LandaxResult<Response> {
        let response = request.send().await?;
        debug!("HTTP {} from {}", response.status(), response.url());
        Ok(response)
    }

    /// Execute a request and handle common error cases
    pub async fn execute<T>(&self, request: RequestBuilder) -> LandaxResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let response = self.send(request).await?;
        self.handle_response(response).await
    }

    /// Execute a request and return raw bytes
    pub async fn execute_bytes(&self, request: RequestBuilder) -> LandaxResult<bytes::Bytes> {
        let response = self.send(request).await?;
        let status = response.status();

        if status.is_success() {
            Ok(response.bytes().await?)
        } else {
            self.handle_error_response(status, response).await
        }
    }

    /// Handle response and deserialize JSON
    pub(crate) async fn handle_response<T>(&self, response: Response) -> LandaxResult<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let status = response.status();

        if status.is_success() {
            let json = response.json::<T>().await?;
            Ok(json)
        } else {
            self.handle_error_response(status, response).await
        }
    }

    /// Handle error responses
    async fn handle_error_response<T>(&self, status: StatusCode, response: Response) -> LandaxResult<T> {
        let error_message = match response.json::<ErrorResponse>().await {
            Ok(error_resp) => error_resp
                .into_message()
                .unwrap_or_else(|| format!("HTTP {}", status)),
            Err(_) => format!("HTTP {}", status),
        };

        match status {
            StatusCode::UNAUTHORIZED => Err(LandaxError::Unauthorized(error_message)),
            StatusCode::FORBIDDEN => Err(LandaxError::PermissionDenied(error_message)),
            StatusCode::NOT_FOUND => Err(LandaxError::NotFound(error_message)),
            StatusCode::BAD_REQUEST => Err(LandaxError::BadRequest(error_message)),
            _ => Err(LandaxError::api_error(status.as_u16(), error_message)),
        }
    }
}
