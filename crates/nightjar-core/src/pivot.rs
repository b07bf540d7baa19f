//! Pivot cache types.

/// Source type code meaning the cache's data originates from a workbook
/// connection (`xlExternal`). Caches with this source type mirror a
/// connection that the connection refresh pass already brought current, so
/// the pivot refresh pass skips them.
pub const SOURCE_TYPE_EXTERNAL: i32 = 2;

/// A cached data snapshot backing one or more pivot tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PivotCache {
    /// The cache's 1-based index in the workbook's cache collection.
    pub index: u32,
    /// Raw host source type code (`xlPivotTableSourceType`).
    pub source_type: i32,
}

impl PivotCache {
    /// Whether this cache is backed by an external connection.
    pub fn is_external(&self) -> bool {
        self.source_type == SOURCE_TYPE_EXTERNAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_detection() {
        let external = PivotCache {
            index: 1,
            source_type: SOURCE_TYPE_EXTERNAL,
        };
        let worksheet_backed = PivotCache {
            index: 2,
            source_type: 1,
        };
        assert!(external.is_external());
        assert!(!worksheet_backed.is_external());
    }
}
