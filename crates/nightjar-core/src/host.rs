//! The host application capability set consumed by the refresh engine.

use std::path::Path;

use thiserror::Error;

use crate::connection::Connection;
use crate::pivot::PivotCache;

/// Result type alias for host operations.
pub type HostResult<T> = std::result::Result<T, HostError>;

/// An error reported by the host application while servicing a request.
#[derive(Debug, Clone, Error)]
#[error("{op} failed: {message}")]
pub struct HostError {
    /// The host operation that failed.
    pub op: String,
    /// Host-reported failure detail.
    pub message: String,
}

impl HostError {
    /// Create a host error for a named operation.
    pub fn new(op: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            op: op.into(),
            message: message.into(),
        }
    }
}

/// A running host spreadsheet application with at most one open workbook.
///
/// This is the seam between the refresh engine and the actual host (Excel
/// over the COM bridge in production, a scripted host in tests). The engine
/// owns the implementing value for the whole session and issues one
/// operation at a time; implementations never need to support concurrent
/// calls. Every operation implicitly targets the session's single open
/// workbook; opening a second workbook in the same session is not part of
/// the contract.
pub trait WorkbookHost {
    /// Show or hide the host UI. Unattended runs hide it.
    fn set_visible(&mut self, visible: bool) -> HostResult<()>;

    /// Enable or suppress interactive alert dialogs. Unattended runs
    /// suppress them; a visible dialog would hang the job forever.
    fn set_display_alerts(&mut self, on: bool) -> HostResult<()>;

    /// Open the workbook at `path`, making it the session's workbook.
    fn open_workbook(&mut self, path: &Path) -> HostResult<()>;

    /// Bring the open workbook to the foreground/active state.
    ///
    /// May fail transiently while the workbook is still loading add-ins or
    /// queries; callers retry.
    fn activate_workbook(&mut self) -> HostResult<()>;

    /// Toggle the workbook's fast-combine mode, trading interactive query
    /// fidelity for batch refresh throughput.
    fn set_fast_combine(&mut self, on: bool) -> HostResult<()>;

    /// Enumerate the workbook's connections, in the host's document order.
    fn connections(&mut self) -> HostResult<Vec<Connection>>;

    /// Trigger a refresh of the named connection.
    fn refresh_connection(&mut self, name: &str) -> HostResult<()>;

    /// Whether the named connection is still refreshing.
    ///
    /// Only meaningful for the OLEDB connection family; the host reports an
    /// error for connections without a live refreshing flag.
    fn connection_refreshing(&mut self, name: &str) -> HostResult<bool>;

    /// Block until all pending asynchronous source queries (OLEDB/OLAP)
    /// across the whole application complete. Safe to call redundantly.
    fn complete_pending_queries(&mut self) -> HostResult<()>;

    /// Enumerate the workbook's pivot caches.
    fn pivot_caches(&mut self) -> HostResult<Vec<PivotCache>>;

    /// Trigger a refresh of the pivot cache at `index`.
    fn refresh_pivot_cache(&mut self, index: u32) -> HostResult<()>;

    /// Enable or disable change-event notifications application-wide.
    fn set_enable_events(&mut self, on: bool) -> HostResult<()>;

    /// Force a full recalculation of the workbook.
    fn calculate(&mut self) -> HostResult<()>;

    /// Save the workbook in place and close it.
    fn save_and_close_workbook(&mut self) -> HostResult<()>;

    /// Quit the host application and release its handle.
    fn quit(&mut self) -> HostResult<()>;
}
