//! Host capability model for the nightjar workbook refresh orchestrator.
//!
//! This crate defines what the refresh engine needs from a host spreadsheet
//! application, and nothing else: the [`WorkbookHost`] trait (start/quit is
//! the caller's concern; one open workbook per session), the connection and
//! pivot-cache views the host reports, and the ordered
//! [`ConnectionTypeRegistry`] that determines refresh precedence across
//! connection families.
//!
//! The engine that drives a host through a refresh run lives in
//! `nightjar-engine`; the production Excel host lives in
//! `nightjar-excel-com`.

mod connection;
mod error;
mod host;
mod pivot;
mod registry;

pub use connection::{Connection, ConnectionKind, RefreshDiscipline};
pub use error::{Error, Result};
pub use host::{HostError, HostResult, WorkbookHost};
pub use pivot::{PivotCache, SOURCE_TYPE_EXTERNAL};
pub use registry::ConnectionTypeRegistry;
