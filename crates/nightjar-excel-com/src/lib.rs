//! Native Linux host implementation for Excel refresh automation via a WINE
//! bridge process.
//!
//! This crate spawns a Windows `.exe` under WINE that automates Excel
//! through COM, communicating over JSON-over-stdio, and exposes it to the
//! refresh engine as a [`WorkbookHost`](nightjar_core::WorkbookHost).
//!
//! # Architecture
//!
//! ```text
//! nightjar-engine (native Linux)
//!     └── ExcelHost (this crate)
//!           └── spawns: wine excel-refresh-bridge.exe
//!                 └── COM: Excel.Application
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use nightjar_core::WorkbookHost;
//! use nightjar_excel_com::{BridgeConfig, ExcelHost};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut host = ExcelHost::start(BridgeConfig::default())?;
//!     host.open_workbook(Path::new("reports/daily.xlsx"))?;
//!     host.calculate()?;
//!     host.save_and_close_workbook()?;
//!     host.quit()?;
//!     Ok(())
//! }
//! ```

mod bridge;
mod host;

pub use bridge::{linux_to_wine_path, BridgeClient, BridgeConfig, BridgeError};
pub use host::ExcelHost;
