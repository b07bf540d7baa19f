//! Refresh run configuration.

use std::time::Duration;

use nightjar_core::ConnectionTypeRegistry;

/// Configuration for one refresh run.
pub struct RefreshOptions {
    /// Which connection families to refresh, and in what order.
    pub registry: ConnectionTypeRegistry,

    /// Interval between polls of an OLEDB connection's refreshing flag.
    pub poll_interval: Duration,

    /// Upper bound on how long to poll one connection's refreshing flag.
    ///
    /// `None` (the default) waits indefinitely: the job must not proceed
    /// with partial data. When set, expiry raises
    /// [`RefreshError::RefreshTimeout`](crate::RefreshError::RefreshTimeout).
    pub poll_timeout: Option<Duration>,

    /// Maximum number of workbook activation attempts before giving up on
    /// the readiness check and continuing best-effort.
    pub readiness_attempts: u32,

    /// Interval between workbook activation attempts.
    pub readiness_interval: Duration,

    /// Whether to enable the host's fast-combine mode before refreshing.
    pub fast_combine: bool,
}

impl Default for RefreshOptions {
    fn default() -> Self {
        Self {
            registry: ConnectionTypeRegistry::default(),
            poll_interval: Duration::from_secs(1),
            poll_timeout: None,
            readiness_attempts: 10,
            readiness_interval: Duration::from_secs(1),
            fast_combine: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_unattended_job_settings() {
        let options = RefreshOptions::default();
        assert_eq!(options.poll_interval, Duration::from_secs(1));
        assert_eq!(options.poll_timeout, None);
        assert_eq!(options.readiness_attempts, 10);
        assert_eq!(options.registry.len(), 4);
        assert!(options.fast_combine);
    }
}
