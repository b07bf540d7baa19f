//! Scoped suppression of host change-event notifications.

use nightjar_core::{HostResult, WorkbookHost};

/// Disables change-event notifications for the lifetime of the scope.
///
/// Suppressing events keeps dependent macros and recalculations from firing
/// mid-refresh. Notifications must come back on every exit path (a workbook
/// left "silent" would break subsequent operations), so re-enabling happens
/// in `Drop` unless [`restore`](Self::restore) already ran. On the success
/// path, call `restore` so a re-enable failure is reported instead of
/// swallowed during unwinding.
pub struct EventScope<'a, H: WorkbookHost> {
    host: &'a mut H,
    restored: bool,
}

impl<'a, H: WorkbookHost> EventScope<'a, H> {
    /// Disable change events, returning the guard that re-enables them.
    pub fn disable(host: &'a mut H) -> HostResult<Self> {
        host.set_enable_events(false)?;
        Ok(Self {
            host,
            restored: false,
        })
    }

    /// Access the host while events are suppressed.
    pub fn host(&mut self) -> &mut H {
        self.host
    }

    /// Re-enable change events, consuming the scope.
    pub fn restore(mut self) -> HostResult<()> {
        self.restored = true;
        self.host.set_enable_events(true)
    }
}

impl<H: WorkbookHost> Drop for EventScope<'_, H> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(err) = self.host.set_enable_events(true) {
            tracing::debug!(error = %err, "failed to re-enable change events during cleanup");
        }
    }
}
