//! The `WorkbookHost` implementation backed by the WINE bridge.

use std::path::Path;

use excel_refresh_protocol::{Command as BridgeCommand, ResponseData};
use nightjar_core::{Connection, HostError, HostResult, PivotCache, WorkbookHost};

use crate::bridge::{linux_to_wine_path, BridgeClient, BridgeConfig, BridgeError};

/// An Excel instance running under WINE, driven through the refresh bridge.
///
/// Construction spawns the bridge process and creates the Excel.Application
/// COM object; the engine then drives the session through the
/// [`WorkbookHost`] trait. `quit` shuts the bridge down and reaps the
/// subprocess.
pub struct ExcelHost {
    bridge: BridgeClient,
}

impl ExcelHost {
    /// Spawn the bridge and start Excel.
    pub fn start(config: BridgeConfig) -> Result<Self, BridgeError> {
        Ok(Self {
            bridge: BridgeClient::start(config)?,
        })
    }

    fn command(&self, op: &str, command: BridgeCommand) -> HostResult<Option<ResponseData>> {
        self.bridge
            .send(command)
            .map_err(|err| HostError::new(op, err.to_string()))
    }

    fn simple(&self, op: &str, command: BridgeCommand) -> HostResult<()> {
        self.command(op, command).map(drop)
    }
}

impl WorkbookHost for ExcelHost {
    fn set_visible(&mut self, visible: bool) -> HostResult<()> {
        self.simple("SetVisible", BridgeCommand::SetVisible { visible })
    }

    fn set_display_alerts(&mut self, on: bool) -> HostResult<()> {
        self.simple("SetDisplayAlerts", BridgeCommand::SetDisplayAlerts { on })
    }

    fn open_workbook(&mut self, path: &Path) -> HostResult<()> {
        self.simple(
            "OpenWorkbook",
            BridgeCommand::OpenWorkbook {
                path: linux_to_wine_path(path),
            },
        )
    }

    fn activate_workbook(&mut self) -> HostResult<()> {
        self.simple("ActivateWorkbook", BridgeCommand::ActivateWorkbook)
    }

    fn set_fast_combine(&mut self, on: bool) -> HostResult<()> {
        self.simple("SetFastCombine", BridgeCommand::SetFastCombine { on })
    }

    fn connections(&mut self) -> HostResult<Vec<Connection>> {
        match self.command("ListConnections", BridgeCommand::ListConnections)? {
            Some(ResponseData::Connections { connections }) => Ok(connections
                .into_iter()
                .map(|info| Connection {
                    name: info.name,
                    type_code: info.type_code,
                })
                .collect()),
            _ => Err(HostError::new("ListConnections", "unexpected response data")),
        }
    }

    fn refresh_connection(&mut self, name: &str) -> HostResult<()> {
        self.simple(
            "RefreshConnection",
            BridgeCommand::RefreshConnection {
                name: name.to_string(),
            },
        )
    }

    fn connection_refreshing(&mut self, name: &str) -> HostResult<bool> {
        match self.command(
            "ConnectionRefreshing",
            BridgeCommand::ConnectionRefreshing {
                name: name.to_string(),
            },
        )? {
            Some(ResponseData::Flag { value }) => Ok(value),
            _ => Err(HostError::new(
                "ConnectionRefreshing",
                "unexpected response data",
            )),
        }
    }

    fn complete_pending_queries(&mut self) -> HostResult<()> {
        self.simple(
            "CompletePendingQueries",
            BridgeCommand::CompletePendingQueries,
        )
    }

    fn pivot_caches(&mut self) -> HostResult<Vec<PivotCache>> {
        match self.command("ListPivotCaches", BridgeCommand::ListPivotCaches)? {
            Some(ResponseData::PivotCaches { caches }) => Ok(caches
                .into_iter()
                .map(|info| PivotCache {
                    index: info.index,
                    source_type: info.source_type,
                })
                .collect()),
            _ => Err(HostError::new("ListPivotCaches", "unexpected response data")),
        }
    }

    fn refresh_pivot_cache(&mut self, index: u32) -> HostResult<()> {
        self.simple(
            "RefreshPivotCache",
            BridgeCommand::RefreshPivotCache { index },
        )
    }

    fn set_enable_events(&mut self, on: bool) -> HostResult<()> {
        self.simple("SetEnableEvents", BridgeCommand::SetEnableEvents { on })
    }

    fn calculate(&mut self) -> HostResult<()> {
        self.simple("Calculate", BridgeCommand::Calculate)
    }

    fn save_and_close_workbook(&mut self) -> HostResult<()> {
        self.simple("SaveAndCloseWorkbook", BridgeCommand::SaveAndCloseWorkbook)
    }

    fn quit(&mut self) -> HostResult<()> {
        self.bridge
            .shutdown()
            .map_err(|err| HostError::new("Quit", err.to_string()))
    }
}
