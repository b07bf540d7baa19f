//! Pivot cache refresh driver.

use nightjar_core::WorkbookHost;

use crate::error::Result;

/// Refresh every pivot cache in the open workbook whose data does not come
/// from an external connection.
///
/// External-sourced caches mirror a connection the connection pass already
/// brought current; refreshing them again risks a redundant round trip or a
/// race against the connection's own refresh state. Caches backed by
/// OLAP/model sources may leave asynchronous queries outstanding, so the
/// pass ends with one drain of the host's pending queries.
///
/// Returns the number of caches refreshed.
pub fn refresh_pivot_caches<H: WorkbookHost>(host: &mut H) -> Result<u32> {
    let mut refreshed = 0;
    for cache in host.pivot_caches()? {
        if cache.is_external() {
            tracing::debug!(
                cache = cache.index,
                "skipping externally sourced pivot cache"
            );
            continue;
        }

        host.refresh_pivot_cache(cache.index)?;
        tracing::info!(
            cache = cache.index,
            source_type = cache.source_type,
            "pivot cache refreshed"
        );
        refreshed += 1;
    }

    host.complete_pending_queries()?;
    Ok(refreshed)
}
