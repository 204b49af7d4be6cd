//! Rexster Core Library
//!
//! This crate provides the request-building pieces shared by the Rexster
//! client and tooling:
//! - Typed values and the typed-literal encoder used in query strings
//! - Composable query expressions with query-parameter and Gremlin output
//! - Client configuration

pub mod config;
pub mod error;
pub mod query;
pub mod value;

// Re-export commonly used types
pub use config::ClientConfig;
pub use error::{QueryError, Result};
pub use query::{Comparison, PropertyConstraint, QueryBuilder, QueryExpression, QueryParameters};
pub use value::{encode, TypedValue};
