use thiserror::Error;

/// Landax client error types
#[derive(Error, Debug)]
pub enum LandaxError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization/deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing failed: {0}")]
    Url(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Authentication rejected: HTTP {status} - {body}")]
    AuthRejected { status: u16, body: String },

    #[error("Authentication response carried no access token: {0}")]
    AuthMalformed(String),

    #[error("Missing required configuration field: {0}")]
    MissingField(&'static str),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Module {module} (id {module_id}) has no document link field")]
    UnmappedModule { module: String, module_id: u32 },
}

/// Result type for Landax operations
pub type LandaxResult<T> = Result<T, LandaxError>;

impl LandaxError {
    /// Create an API error from a status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// True for failures while acquiring the bearer token
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Self::AuthRejected { .. } | Self::AuthMalformed(_))
    }
}
