use thiserror::Error;

/// Core error type shared across schemata crates.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A caller supplied an argument the operation cannot act on.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The schema violates internal invariants.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

/// Convenience alias for results returned by schemata crates.
pub type Result<T> = std::result::Result<T, Error>;
