//! Unattended refresh orchestration for workbook connections and pivot
//! caches.
//!
//! The engine drives any [`WorkbookHost`](nightjar_core::WorkbookHost)
//! through the full refresh sequence of a scheduled data-refresh job:
//!
//! 1. Verify the workbook exists, then launch the host hidden with alerts
//!    suppressed.
//! 2. Open the workbook and wait (bounded, best-effort) for it to become
//!    active.
//! 3. Refresh each connection-type group in registry order, polling OLEDB
//!    connections until their refreshing flag clears and draining pending
//!    asynchronous queries after every group.
//! 4. Refresh non-external pivot caches with change events suppressed;
//!    events are restored on every exit path.
//! 5. Force a full recalculation, save and close the workbook, and quit the
//!    host exactly once, on success and failure alike.
//!
//! Everything is single-threaded and blocking: the host supports one
//! operation at a time, and concurrent refreshes against the same workbook
//! would corrupt its state.

mod connections;
mod error;
mod events;
mod options;
mod pivots;
mod session;

pub use connections::refresh_connection_group;
pub use error::{RefreshError, Result};
pub use events::EventScope;
pub use options::RefreshOptions;
pub use pivots::refresh_pivot_caches;
pub use session::{run, RefreshReport};
