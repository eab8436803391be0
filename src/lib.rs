/*
 * Landax client - JSON-over-HTTPS client for the Landax business data API
 */

// Internal modules
mod client;
pub mod models;
mod apis;
mod error;
mod auth;
mod config;
mod modules;
mod pagination;
pub mod query;
mod session;

// Re-export public types and interfaces
pub use client::LandaxClient;
pub use models::*;
pub use apis::*;
pub use error::{LandaxError, LandaxResult};
pub use auth::{Authentication, BearerAuth, Credentials, request_token};
pub use config::ClientConfig;
pub use modules::{ModuleLink, ModuleRegistry};
pub use pagination::{PagingStrategy, MAX_PAGE_SIZE};
pub use query::{build_url, resource_path, QueryParams};
pub use session::Session;

// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        LandaxClient, ClientConfig, Credentials,
        LandaxError, LandaxResult,
        ModuleRegistry, PagingStrategy, QueryParams,
        // Common model types
        Record, RecordId, DocumentOptions, LinkedUploadOutcome,
    };
}
