//! Error types for the refresh engine.

use std::path::PathBuf;
use std::time::Duration;

use nightjar_core::HostError;
use thiserror::Error;

/// Result type alias using [`RefreshError`]
pub type Result<T> = std::result::Result<T, RefreshError>;

/// Errors that can terminate a refresh run.
///
/// Transient readiness failures are not represented here; they are consumed
/// by the bounded activate retry and surface only as
/// [`workbook_ready`](crate::RefreshReport::workbook_ready) being false.
#[derive(Debug, Error)]
pub enum RefreshError {
    /// The target workbook path does not exist. Raised before any host
    /// application instance is started.
    #[error("Workbook not found: {0}")]
    WorkbookMissing(PathBuf),

    /// A host operation failed. Not retried by the engine; the host
    /// application is still quit on the way out.
    #[error(transparent)]
    Host(#[from] HostError),

    /// A polled connection's refreshing flag did not clear within the
    /// configured bound. Only raised when
    /// [`poll_timeout`](crate::RefreshOptions::poll_timeout) is set; the
    /// default wait is unbounded.
    #[error("Connection '{name}' still refreshing after {waited:?}")]
    RefreshTimeout {
        /// The connection whose refresh never completed.
        name: String,
        /// How long the engine polled before giving up.
        waited: Duration,
    },
}
