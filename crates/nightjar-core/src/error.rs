//! Error types for nightjar-core

use thiserror::Error;

/// Result type alias using [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in nightjar-core
#[derive(Debug, Error)]
pub enum Error {
    /// A connection-type group label was registered twice
    #[error("Connection group label already registered: {0}")]
    DuplicateGroupLabel(String),
}
