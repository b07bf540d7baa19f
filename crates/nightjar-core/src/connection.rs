//! Workbook connection types and refresh disciplines.

use std::fmt;

/// A named external-data link inside the open workbook.
///
/// Connections are enumerated read-only from the host; the only mutation the
/// orchestrator performs on one is triggering its refresh through the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Connection name as reported by the host (e.g. "Query - Orders").
    pub name: String,
    /// Raw host connection type code. See [`ConnectionKind`].
    pub type_code: i32,
}

impl Connection {
    /// The typed view of this connection's type code.
    pub fn kind(&self) -> ConnectionKind {
        ConnectionKind::from_code(self.type_code)
    }
}

/// Connection type, mirroring the host's `xlConnectionType` enumeration.
///
/// Codes the host may report but this crate has no special handling for are
/// preserved as [`ConnectionKind::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
    /// OLEDB connection (code 1). The only family whose host API exposes a
    /// live `Refreshing` flag.
    Oledb,
    /// ODBC connection (code 2)
    Odbc,
    /// XML map (code 3)
    XmlMap,
    /// Text import (code 4)
    Text,
    /// Web query (code 5)
    Web,
    /// Data feed (code 6)
    DataFeed,
    /// Data-model / Power Pivot connection (code 7)
    Model,
    /// Worksheet-backed range (code 8)
    Worksheet,
    /// Connection with no source (code 9)
    NoSource,
    /// Any other code the host reports
    Unknown(i32),
}

impl ConnectionKind {
    /// Map a raw host type code to a kind.
    pub fn from_code(code: i32) -> Self {
        match code {
            1 => ConnectionKind::Oledb,
            2 => ConnectionKind::Odbc,
            3 => ConnectionKind::XmlMap,
            4 => ConnectionKind::Text,
            5 => ConnectionKind::Web,
            6 => ConnectionKind::DataFeed,
            7 => ConnectionKind::Model,
            8 => ConnectionKind::Worksheet,
            9 => ConnectionKind::NoSource,
            other => ConnectionKind::Unknown(other),
        }
    }

    /// The host's numeric type code for this kind.
    pub fn code(self) -> i32 {
        match self {
            ConnectionKind::Oledb => 1,
            ConnectionKind::Odbc => 2,
            ConnectionKind::XmlMap => 3,
            ConnectionKind::Text => 4,
            ConnectionKind::Web => 5,
            ConnectionKind::DataFeed => 6,
            ConnectionKind::Model => 7,
            ConnectionKind::Worksheet => 8,
            ConnectionKind::NoSource => 9,
            ConnectionKind::Unknown(code) => code,
        }
    }

    /// How a refresh of this connection family is driven to completion.
    ///
    /// OLEDB is the one family with a live refreshing flag; every other kind
    /// is trigger-only and completes synchronously or during the host's
    /// drain of pending asynchronous queries.
    pub fn discipline(self) -> RefreshDiscipline {
        match self {
            ConnectionKind::Oledb => RefreshDiscipline::TriggerAndPoll,
            _ => RefreshDiscipline::TriggerOnly,
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionKind::Oledb => "OLEDB",
            ConnectionKind::Odbc => "ODBC",
            ConnectionKind::XmlMap => "XML map",
            ConnectionKind::Text => "text",
            ConnectionKind::Web => "web",
            ConnectionKind::DataFeed => "data feed",
            ConnectionKind::Model => "model",
            ConnectionKind::Worksheet => "worksheet",
            ConnectionKind::NoSource => "no source",
            ConnectionKind::Unknown(code) => return write!(f, "unknown({code})"),
        };
        f.write_str(name)
    }
}

/// How the refresh of one connection is awaited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDiscipline {
    /// Trigger the refresh, then poll the host's refreshing flag until it
    /// clears before moving on.
    TriggerAndPoll,
    /// Trigger the refresh and move on; completion is covered by the
    /// subsequent pending-query drain.
    TriggerOnly,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trip() {
        for code in 1..=9 {
            assert_eq!(ConnectionKind::from_code(code).code(), code);
        }
        assert_eq!(ConnectionKind::from_code(42), ConnectionKind::Unknown(42));
        assert_eq!(ConnectionKind::Unknown(42).code(), 42);
    }

    #[test]
    fn only_oledb_polls() {
        assert_eq!(
            ConnectionKind::Oledb.discipline(),
            RefreshDiscipline::TriggerAndPoll
        );
        for kind in [
            ConnectionKind::Odbc,
            ConnectionKind::Model,
            ConnectionKind::Worksheet,
            ConnectionKind::Unknown(42),
        ] {
            assert_eq!(kind.discipline(), RefreshDiscipline::TriggerOnly);
        }
    }

    #[test]
    fn connection_kind_from_host_code() {
        let conn = Connection {
            name: "Query - Orders".to_string(),
            type_code: 2,
        };
        assert_eq!(conn.kind(), ConnectionKind::Odbc);
    }
}
