//! Shared protocol types for communication between the native Linux client
//! and the Windows COM bridge process running under WINE.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each
//! direction. Each bridge session automates a single Excel instance with at
//! most one open workbook, so commands carry no workbook handles; they all
//! target the session's open workbook.

use serde::{Deserialize, Serialize};

/// A command sent from the Linux client to the WINE bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Initialize COM and create the Excel.Application instance, hidden and
    /// with alerts suppressed.
    Init,

    /// Show or hide the Excel UI.
    SetVisible { visible: bool },

    /// Enable or suppress interactive alert dialogs.
    SetDisplayAlerts { on: bool },

    /// Open the workbook at a file path (Windows path). Becomes the
    /// session's workbook; opening a second workbook is an error.
    OpenWorkbook { path: String },

    /// Bring the open workbook to the foreground. Fails while the workbook
    /// is still loading.
    ActivateWorkbook,

    /// Toggle `Queries.FastCombine` on the open workbook.
    SetFastCombine { on: bool },

    /// List the open workbook's connections (name and type code).
    ListConnections,

    /// Trigger a refresh of the named connection. OLEDB connections are
    /// refreshed through their OLEDBConnection object.
    RefreshConnection { name: String },

    /// Read the named OLEDB connection's live `Refreshing` flag.
    ConnectionRefreshing { name: String },

    /// `Application.CalculateUntilAsyncQueriesDone`: block until all
    /// pending asynchronous source queries complete.
    CompletePendingQueries,

    /// List the open workbook's pivot caches (index and source type).
    ListPivotCaches,

    /// Trigger a refresh of the pivot cache at the given 1-based index.
    RefreshPivotCache { index: u32 },

    /// Toggle `Application.EnableEvents`.
    SetEnableEvents { on: bool },

    /// Force a full recalculation.
    Calculate,

    /// Save the open workbook in place and close it.
    SaveAndCloseWorkbook,

    /// Shut down the bridge: close any open workbook, quit Excel,
    /// uninitialize COM.
    Shutdown,
}

/// A response sent from the WINE bridge back to the Linux client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// The open workbook's connections.
    Connections { connections: Vec<ConnectionInfo> },
    /// The open workbook's pivot caches.
    PivotCaches { caches: Vec<PivotCacheInfo> },
    /// A boolean flag (e.g. a connection's refreshing state).
    Flag { value: bool },
}

/// One workbook connection, as enumerated by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionInfo {
    /// Connection name.
    pub name: String,
    /// Raw `xlConnectionType` code.
    pub type_code: i32,
}

/// One pivot cache, as enumerated by the bridge.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PivotCacheInfo {
    /// 1-based index in the workbook's PivotCaches collection.
    pub index: u32,
    /// Raw `xlPivotTableSourceType` code.
    pub source_type: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_wire_format_is_stable() {
        let request = Request {
            id: 7,
            command: Command::RefreshConnection {
                name: "Query - Orders".to_string(),
            },
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(
            json,
            r#"{"id":7,"cmd":"RefreshConnection","params":{"name":"Query - Orders"}}"#
        );
    }

    #[test]
    fn error_response_round_trip() {
        let line = r#"{"id":3,"status":"error","message":"no workbook open"}"#;
        let response: Response = serde_json::from_str(line).unwrap();
        assert_eq!(response.id, 3);
        match response.result {
            ResponseResult::Error { message } => assert_eq!(message, "no workbook open"),
            other => panic!("expected error result, got {other:?}"),
        }
    }

    #[test]
    fn flag_data_parses_from_ok_response() {
        let line = r#"{"id":4,"status":"ok","data":{"value":true}}"#;
        let response: Response = serde_json::from_str(line).unwrap();
        match response.result {
            ResponseResult::Ok {
                data: Some(ResponseData::Flag { value }),
            } => assert!(value),
            other => panic!("expected flag data, got {other:?}"),
        }
    }
}
