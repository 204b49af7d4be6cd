use thiserror::Error;

pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors raised while building or encoding a query.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
