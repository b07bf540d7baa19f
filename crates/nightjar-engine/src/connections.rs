//! Connection refresh driver: refreshes one connection family with
//! type-specific completion detection.

use std::thread;
use std::time::Instant;

use nightjar_core::{ConnectionKind, RefreshDiscipline, WorkbookHost};

use crate::error::{RefreshError, Result};
use crate::options::RefreshOptions;

/// Refresh every connection of the given kind in the open workbook.
///
/// Connections are taken in the host's enumeration order. OLEDB connections
/// are polled until their refreshing flag clears; every other kind is
/// trigger-only. After the pass (even one that matched nothing) the host's
/// pending asynchronous queries are drained once, since other in-flight
/// async work may need to settle before the next group runs.
///
/// Returns the number of connections refreshed.
pub fn refresh_connection_group<H: WorkbookHost>(
    host: &mut H,
    kind: ConnectionKind,
    options: &RefreshOptions,
) -> Result<u32> {
    let mut refreshed = 0;
    for connection in host.connections()? {
        if connection.type_code != kind.code() {
            continue;
        }

        host.refresh_connection(&connection.name)?;
        if kind.discipline() == RefreshDiscipline::TriggerAndPoll {
            wait_until_refresh_completes(host, &connection.name, options)?;
        }

        tracing::info!(
            connection = %connection.name,
            type_code = connection.type_code,
            "connection refreshed"
        );
        refreshed += 1;
    }

    host.complete_pending_queries()?;
    Ok(refreshed)
}

/// Poll the host's refreshing flag for `name` until it clears.
///
/// The wait is unbounded unless `options.poll_timeout` is set.
fn wait_until_refresh_completes<H: WorkbookHost>(
    host: &mut H,
    name: &str,
    options: &RefreshOptions,
) -> Result<()> {
    let started = Instant::now();
    while host.connection_refreshing(name)? {
        if let Some(limit) = options.poll_timeout {
            let waited = started.elapsed();
            if waited >= limit {
                return Err(RefreshError::RefreshTimeout {
                    name: name.to_string(),
                    waited,
                });
            }
        }
        thread::sleep(options.poll_interval);
    }
    Ok(())
}
