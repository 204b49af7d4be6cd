//! Rexster Client Library
//!
//! Async HTTP client for the Rexster graph server REST API: vertices, edges,
//! indices, key indices and Gremlin script execution.

mod client;
mod direction;
pub mod scripts;
pub mod transport;
pub mod urls;

pub use client::{Client, Properties};
pub use direction::Direction;
pub use rexster_core::{
    encode, ClientConfig, Comparison, PropertyConstraint, QueryBuilder, QueryError, QueryExpression,
    TypedValue,
};
pub use scripts::ScriptRegistry;
pub use transport::{HttpTransport, RestRequest, Transport};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Server error: {status} - {message}")]
    Server { status: u16, message: String },

    #[error("Invalid response from server")]
    InvalidResponse,

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("\"{0}\" is not a valid direction (only in, out, both allowed)")]
    InvalidDirection(String),

    #[error("Missing URL argument: {0}")]
    MissingUrlArgument(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
