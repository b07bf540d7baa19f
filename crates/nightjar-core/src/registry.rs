//! The connection-type registry: which connection families get refreshed,
//! and in what order.

use std::collections::BTreeMap;

use crate::connection::ConnectionKind;
use crate::error::{Error, Result};

/// An ordered mapping from a human-readable group label to a connection kind.
///
/// Iteration order is the label's natural (lexicographic) sort order, not
/// insertion order, so operators control refresh precedence purely by naming
/// labels, conventionally with a numeric prefix (`1_ODBC`, `2_OLEDB`, ...).
/// ODBC sources then refresh before model sources every run, deterministically.
///
/// Labels are unique; registering a label twice is an error. This is static,
/// versionable configuration, not user input, so there is no further
/// validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTypeRegistry {
    groups: BTreeMap<String, ConnectionKind>,
}

impl ConnectionTypeRegistry {
    /// An empty registry. A refresh run over it touches no connections
    /// (and issues no drain calls, since there are no group passes).
    pub fn empty() -> Self {
        Self {
            groups: BTreeMap::new(),
        }
    }

    /// Register a connection-type group.
    pub fn insert(&mut self, label: impl Into<String>, kind: ConnectionKind) -> Result<()> {
        let label = label.into();
        if self.groups.contains_key(&label) {
            return Err(Error::DuplicateGroupLabel(label));
        }
        self.groups.insert(label, kind);
        Ok(())
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_group(mut self, label: impl Into<String>, kind: ConnectionKind) -> Result<Self> {
        self.insert(label, kind)?;
        Ok(self)
    }

    /// Iterate groups in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ConnectionKind)> {
        self.groups.iter().map(|(label, kind)| (label.as_str(), *kind))
    }

    /// Number of registered groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the registry has no groups.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl Default for ConnectionTypeRegistry {
    /// The standard refresh order: ODBC, then OLEDB, then data-model, then
    /// worksheet-backed connections.
    fn default() -> Self {
        let mut registry = Self::empty();
        // Labels are prefixed to pin the sort order; add more groups as needed.
        registry.insert("1_ODBC", ConnectionKind::Odbc).unwrap();
        registry.insert("2_OLEDB", ConnectionKind::Oledb).unwrap();
        registry.insert("3_MODEL", ConnectionKind::Model).unwrap();
        registry
            .insert("4_WORKSHEET", ConnectionKind::Worksheet)
            .unwrap();
        registry
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn default_registry_order() {
        let registry = ConnectionTypeRegistry::default();
        let groups: Vec<_> = registry.iter().collect();
        assert_eq!(
            groups,
            vec![
                ("1_ODBC", ConnectionKind::Odbc),
                ("2_OLEDB", ConnectionKind::Oledb),
                ("3_MODEL", ConnectionKind::Model),
                ("4_WORKSHEET", ConnectionKind::Worksheet),
            ]
        );
    }

    #[test]
    fn iteration_is_label_order_not_insertion_order() {
        let registry = ConnectionTypeRegistry::empty()
            .with_group("2_OLEDB", ConnectionKind::Oledb)
            .unwrap()
            .with_group("1_ODBC", ConnectionKind::Odbc)
            .unwrap();
        let labels: Vec<_> = registry.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, vec!["1_ODBC", "2_OLEDB"]);
    }

    #[test]
    fn duplicate_label_rejected() {
        let mut registry = ConnectionTypeRegistry::empty();
        registry.insert("1_ODBC", ConnectionKind::Odbc).unwrap();
        let err = registry
            .insert("1_ODBC", ConnectionKind::Oledb)
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateGroupLabel(label) if label == "1_ODBC"));
        // The original entry is untouched.
        assert_eq!(
            registry.iter().collect::<Vec<_>>(),
            vec![("1_ODBC", ConnectionKind::Odbc)]
        );
    }
}
