//! Session lifecycle: open the host and workbook, run the ordered refresh
//! sequence, recalculate, and tear everything down deterministically.

use std::path::Path;
use std::thread;

use nightjar_core::{HostResult, WorkbookHost};

use crate::connections::refresh_connection_group;
use crate::error::{RefreshError, Result};
use crate::events::EventScope;
use crate::options::RefreshOptions;
use crate::pivots::refresh_pivot_caches;

/// Summary of a completed refresh run.
///
/// Success means every requested refresh was issued and confirmed complete;
/// the refreshed workbook itself is the real output. The report lets callers
/// distinguish a clean run from a degraded-but-continued one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshReport {
    /// Whether the workbook became active within the bounded readiness
    /// retry. False means the check was abandoned and the run continued
    /// best-effort.
    pub workbook_ready: bool,
    /// Connections refreshed across all registry groups.
    pub connections_refreshed: u32,
    /// Pivot caches refreshed (externally sourced caches are skipped).
    pub pivot_caches_refreshed: u32,
}

/// Owns the live host for one run and guarantees it is quit exactly once.
///
/// The success path calls [`shutdown`](Self::shutdown) so quit failures
/// propagate; on every other path `Drop` quits best-effort, so an error
/// mid-run never leaves an orphaned host process behind.
struct Session<H: WorkbookHost> {
    host: H,
    quit_issued: bool,
}

impl<H: WorkbookHost> Session<H> {
    fn new(host: H) -> Self {
        Self {
            host,
            quit_issued: false,
        }
    }

    fn host(&mut self) -> &mut H {
        &mut self.host
    }

    fn shutdown(mut self) -> HostResult<()> {
        self.quit_issued = true;
        self.host.quit()
    }
}

impl<H: WorkbookHost> Drop for Session<H> {
    fn drop(&mut self) {
        if self.quit_issued {
            return;
        }
        if let Err(err) = self.host.quit() {
            tracing::debug!(error = %err, "failed to quit host during cleanup");
        }
    }
}

/// Run the full refresh sequence against the workbook at `workbook`.
///
/// `launch` starts the host application; it is only invoked after the
/// workbook path has been verified to exist, so a missing path never spawns
/// a host process. The launched host is quit exactly once whether the run
/// succeeds or fails.
///
/// The sequence: hide UI and suppress alerts, open the workbook, wait for it
/// to become active (bounded, best-effort), enable fast combine, refresh
/// each connection group in registry order, refresh non-external pivot
/// caches with change events suppressed, force a full recalculation, then
/// save, close, and quit.
pub fn run<H, F>(launch: F, workbook: &Path, options: &RefreshOptions) -> Result<RefreshReport>
where
    H: WorkbookHost,
    F: FnOnce() -> HostResult<H>,
{
    if !workbook.exists() {
        return Err(RefreshError::WorkbookMissing(workbook.to_path_buf()));
    }

    let mut session = Session::new(launch()?);
    let report = drive(session.host(), workbook, options)?;
    session.shutdown()?;
    Ok(report)
}

/// The linear refresh sequence, from workbook open through save/close.
/// Teardown is the caller's responsibility.
fn drive<H: WorkbookHost>(
    host: &mut H,
    workbook: &Path,
    options: &RefreshOptions,
) -> Result<RefreshReport> {
    host.set_visible(false)?;
    host.set_display_alerts(false)?;

    tracing::debug!(workbook = %workbook.display(), "opening workbook");
    host.open_workbook(workbook)?;

    let workbook_ready = wait_for_workbook(host, options);
    if !workbook_ready {
        tracing::warn!(
            attempts = options.readiness_attempts,
            "workbook never became active; continuing best-effort"
        );
    }

    if options.fast_combine {
        host.set_fast_combine(true)?;
    }

    let mut connections_refreshed = 0;
    for (label, kind) in options.registry.iter() {
        tracing::debug!(group = label, kind = %kind, "refreshing connection group");
        connections_refreshed += refresh_connection_group(host, kind, options)?;
    }

    let pivot_caches_refreshed = {
        let mut scope = EventScope::disable(host)?;
        let refreshed = refresh_pivot_caches(scope.host())?;
        scope.restore()?;
        refreshed
    };

    host.calculate()?;
    host.save_and_close_workbook()?;

    Ok(RefreshReport {
        workbook_ready,
        connections_refreshed,
        pivot_caches_refreshed,
    })
}

/// Try to bring the workbook to the active state, retrying at a fixed
/// interval. Newly opened workbooks can be transiently unready while add-ins
/// and queries load; after the configured attempts are exhausted the check
/// is abandoned and the run proceeds anyway.
fn wait_for_workbook<H: WorkbookHost>(host: &mut H, options: &RefreshOptions) -> bool {
    for attempt in 1..=options.readiness_attempts {
        match host.activate_workbook() {
            Ok(()) => return true,
            Err(err) => {
                tracing::debug!(attempt, error = %err, "workbook not ready yet");
                if attempt < options.readiness_attempts {
                    thread::sleep(options.readiness_interval);
                }
            }
        }
    }
    false
}
