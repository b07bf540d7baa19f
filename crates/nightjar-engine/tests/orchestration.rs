//! Orchestration tests driving the engine against a scripted in-memory host
//! that records every call it receives.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use nightjar_core::{
    Connection, ConnectionKind, ConnectionTypeRegistry, HostError, HostResult, PivotCache,
    WorkbookHost, SOURCE_TYPE_EXTERNAL,
};
use nightjar_engine::{run, RefreshError, RefreshOptions};
use pretty_assertions::assert_eq;

/// One host operation, as observed by the scripted host.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    SetVisible(bool),
    SetDisplayAlerts(bool),
    OpenWorkbook(PathBuf),
    ActivateWorkbook,
    SetFastCombine(bool),
    ListConnections,
    RefreshConnection(String),
    ConnectionRefreshing(String),
    CompletePendingQueries,
    ListPivotCaches,
    RefreshPivotCache(u32),
    SetEnableEvents(bool),
    Calculate,
    SaveAndCloseWorkbook,
    Quit,
}

/// In-memory host: serves a fixed set of connections and caches, records
/// every call, and injects failures where a test asks for them.
#[derive(Default)]
struct ScriptedHost {
    calls: Rc<RefCell<Vec<Call>>>,
    connections: Vec<Connection>,
    caches: Vec<PivotCache>,
    /// Per-connection count of polls that still report "refreshing".
    refreshing_polls: HashMap<String, u32>,
    /// Number of leading activate attempts that fail transiently.
    activate_failures: u32,
    fail_open: bool,
    fail_pivot_refresh: bool,
}

impl ScriptedHost {
    fn new() -> Self {
        Self::default()
    }

    /// Shared handle to the call log, usable after `run` consumed the host.
    fn call_log(&self) -> Rc<RefCell<Vec<Call>>> {
        Rc::clone(&self.calls)
    }

    fn with_connection(mut self, name: &str, kind: ConnectionKind) -> Self {
        self.connections.push(Connection {
            name: name.to_string(),
            type_code: kind.code(),
        });
        self
    }

    fn with_cache(mut self, index: u32, source_type: i32) -> Self {
        self.caches.push(PivotCache { index, source_type });
        self
    }

    /// The named connection reports "refreshing" for `polls` polls.
    fn refreshing_for(mut self, name: &str, polls: u32) -> Self {
        self.refreshing_polls.insert(name.to_string(), polls);
        self
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }
}

impl WorkbookHost for ScriptedHost {
    fn set_visible(&mut self, visible: bool) -> HostResult<()> {
        self.record(Call::SetVisible(visible));
        Ok(())
    }

    fn set_display_alerts(&mut self, on: bool) -> HostResult<()> {
        self.record(Call::SetDisplayAlerts(on));
        Ok(())
    }

    fn open_workbook(&mut self, path: &Path) -> HostResult<()> {
        self.record(Call::OpenWorkbook(path.to_path_buf()));
        if self.fail_open {
            return Err(HostError::new("OpenWorkbook", "scripted failure"));
        }
        Ok(())
    }

    fn activate_workbook(&mut self) -> HostResult<()> {
        self.record(Call::ActivateWorkbook);
        if self.activate_failures > 0 {
            self.activate_failures -= 1;
            return Err(HostError::new("ActivateWorkbook", "not ready yet"));
        }
        Ok(())
    }

    fn set_fast_combine(&mut self, on: bool) -> HostResult<()> {
        self.record(Call::SetFastCombine(on));
        Ok(())
    }

    fn connections(&mut self) -> HostResult<Vec<Connection>> {
        self.record(Call::ListConnections);
        Ok(self.connections.clone())
    }

    fn refresh_connection(&mut self, name: &str) -> HostResult<()> {
        self.record(Call::RefreshConnection(name.to_string()));
        Ok(())
    }

    fn connection_refreshing(&mut self, name: &str) -> HostResult<bool> {
        self.record(Call::ConnectionRefreshing(name.to_string()));
        if let Some(polls) = self.refreshing_polls.get_mut(name) {
            if *polls > 0 {
                *polls -= 1;
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn complete_pending_queries(&mut self) -> HostResult<()> {
        self.record(Call::CompletePendingQueries);
        Ok(())
    }

    fn pivot_caches(&mut self) -> HostResult<Vec<PivotCache>> {
        self.record(Call::ListPivotCaches);
        Ok(self.caches.clone())
    }

    fn refresh_pivot_cache(&mut self, index: u32) -> HostResult<()> {
        self.record(Call::RefreshPivotCache(index));
        if self.fail_pivot_refresh {
            return Err(HostError::new("RefreshPivotCache", "scripted failure"));
        }
        Ok(())
    }

    fn set_enable_events(&mut self, on: bool) -> HostResult<()> {
        self.record(Call::SetEnableEvents(on));
        Ok(())
    }

    fn calculate(&mut self) -> HostResult<()> {
        self.record(Call::Calculate);
        Ok(())
    }

    fn save_and_close_workbook(&mut self) -> HostResult<()> {
        self.record(Call::SaveAndCloseWorkbook);
        Ok(())
    }

    fn quit(&mut self) -> HostResult<()> {
        self.record(Call::Quit);
        Ok(())
    }
}

/// Options with zero sleep intervals so tests never actually wait.
fn fast_options(registry: ConnectionTypeRegistry) -> RefreshOptions {
    RefreshOptions {
        registry,
        poll_interval: Duration::ZERO,
        readiness_interval: Duration::ZERO,
        ..Default::default()
    }
}

/// A workbook file that exists on disk for the duration of a test.
fn workbook_fixture() -> tempfile::NamedTempFile {
    tempfile::Builder::new()
        .suffix(".xlsx")
        .tempfile()
        .expect("create workbook fixture")
}

fn refresh_order(calls: &[Call]) -> Vec<String> {
    calls
        .iter()
        .filter_map(|call| match call {
            Call::RefreshConnection(name) => Some(name.clone()),
            _ => None,
        })
        .collect()
}

fn count(calls: &[Call], wanted: &Call) -> usize {
    calls.iter().filter(|call| *call == wanted).count()
}

#[test]
fn full_run_issues_host_calls_in_order() {
    // Scenario: ODBC "Orders" refreshes before OLEDB "Sales"; "Sales" is
    // polled until its refreshing flag clears; each group pass and the
    // pivot pass end with a drain.
    let registry = ConnectionTypeRegistry::empty()
        .with_group("1_ODBC", ConnectionKind::Odbc)
        .unwrap()
        .with_group("2_OLEDB", ConnectionKind::Oledb)
        .unwrap();

    let host = ScriptedHost::new()
        .with_connection("Orders", ConnectionKind::Odbc)
        .with_connection("Sales", ConnectionKind::Oledb)
        .refreshing_for("Sales", 2)
        .with_cache(5, 1);
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report = run(|| Ok(host), workbook.path(), &fast_options(registry)).expect("run succeeds");

    assert!(report.workbook_ready);
    assert_eq!(report.connections_refreshed, 2);
    assert_eq!(report.pivot_caches_refreshed, 1);

    let expected = vec![
        Call::SetVisible(false),
        Call::SetDisplayAlerts(false),
        Call::OpenWorkbook(workbook.path().to_path_buf()),
        Call::ActivateWorkbook,
        Call::SetFastCombine(true),
        // Group 1_ODBC
        Call::ListConnections,
        Call::RefreshConnection("Orders".to_string()),
        Call::CompletePendingQueries,
        // Group 2_OLEDB
        Call::ListConnections,
        Call::RefreshConnection("Sales".to_string()),
        Call::ConnectionRefreshing("Sales".to_string()),
        Call::ConnectionRefreshing("Sales".to_string()),
        Call::ConnectionRefreshing("Sales".to_string()),
        Call::CompletePendingQueries,
        // Pivot pass, events suppressed
        Call::SetEnableEvents(false),
        Call::ListPivotCaches,
        Call::RefreshPivotCache(5),
        Call::CompletePendingQueries,
        Call::SetEnableEvents(true),
        // Wrap-up
        Call::Calculate,
        Call::SaveAndCloseWorkbook,
        Call::Quit,
    ];
    assert_eq!(*calls.borrow(), expected);
}

#[test]
fn groups_refresh_in_lexicographic_label_order() {
    // "10_WEB" sorts before "2_OLEDB": label order is textual, so
    // operators control precedence purely by naming.
    let registry = ConnectionTypeRegistry::empty()
        .with_group("2_OLEDB", ConnectionKind::Oledb)
        .unwrap()
        .with_group("10_WEB", ConnectionKind::Web)
        .unwrap();

    let host = ScriptedHost::new()
        .with_connection("Sales", ConnectionKind::Oledb)
        .with_connection("Feed", ConnectionKind::Web);
    let calls = host.call_log();

    let workbook = workbook_fixture();
    run(|| Ok(host), workbook.path(), &fast_options(registry)).expect("run succeeds");

    assert_eq!(refresh_order(&calls.borrow()), vec!["Feed", "Sales"]);
}

#[test]
fn only_matching_connections_touched_per_group() {
    let registry = ConnectionTypeRegistry::empty()
        .with_group("1_ODBC", ConnectionKind::Odbc)
        .unwrap();

    let host = ScriptedHost::new()
        .with_connection("Orders", ConnectionKind::Odbc)
        .with_connection("Sales", ConnectionKind::Oledb)
        .with_connection("Budget", ConnectionKind::Model);
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report =
        run(|| Ok(host), workbook.path(), &fast_options(registry)).expect("run succeeds");

    assert_eq!(report.connections_refreshed, 1);
    assert_eq!(refresh_order(&calls.borrow()), vec!["Orders"]);
}

#[test]
fn drain_runs_once_per_group_pass_and_once_after_pivot_pass() {
    let registry = ConnectionTypeRegistry::empty()
        .with_group("1_ODBC", ConnectionKind::Odbc)
        .unwrap()
        .with_group("2_OLEDB", ConnectionKind::Oledb)
        .unwrap()
        .with_group("3_MODEL", ConnectionKind::Model)
        .unwrap();

    // No connections and no caches match anything: the drain still runs
    // after every pass, because unrelated async work may need settling.
    let host = ScriptedHost::new();
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report =
        run(|| Ok(host), workbook.path(), &fast_options(registry)).expect("run succeeds");

    assert_eq!(report.connections_refreshed, 0);
    assert_eq!(report.pivot_caches_refreshed, 0);
    assert_eq!(count(&calls.borrow(), &Call::CompletePendingQueries), 4);
}

#[test]
fn external_pivot_caches_never_refreshed() {
    let host = ScriptedHost::new()
        .with_cache(1, SOURCE_TYPE_EXTERNAL)
        .with_cache(2, 5);
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report = run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    )
    .expect("run succeeds");

    assert_eq!(report.pivot_caches_refreshed, 1);
    let calls = calls.borrow();
    assert_eq!(count(&calls, &Call::RefreshPivotCache(1)), 0);
    assert_eq!(count(&calls, &Call::RefreshPivotCache(2)), 1);
}

#[test]
fn events_reenabled_when_pivot_refresh_fails() {
    let mut host = ScriptedHost::new().with_cache(3, 1);
    host.fail_pivot_refresh = true;
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let result = run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    );
    assert!(matches!(result, Err(RefreshError::Host(_))));

    let calls = calls.borrow();
    // Events go off, the cache refresh fails, and events still come back on
    // before the host is quit. No recalculation or save happens.
    let tail: Vec<_> = calls
        .iter()
        .skip_while(|call| **call != Call::SetEnableEvents(false))
        .cloned()
        .collect();
    assert_eq!(
        tail,
        vec![
            Call::SetEnableEvents(false),
            Call::ListPivotCaches,
            Call::RefreshPivotCache(3),
            Call::SetEnableEvents(true),
            Call::Quit,
        ]
    );
    assert_eq!(count(&calls, &Call::Calculate), 0);
    assert_eq!(count(&calls, &Call::SaveAndCloseWorkbook), 0);
    assert_eq!(count(&calls, &Call::Quit), 1);
}

#[test]
fn host_quit_exactly_once_on_success() {
    let host = ScriptedHost::new();
    let calls = host.call_log();

    let workbook = workbook_fixture();
    run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    )
    .expect("run succeeds");

    assert_eq!(count(&calls.borrow(), &Call::Quit), 1);
}

#[test]
fn host_quit_exactly_once_when_open_fails() {
    let mut host = ScriptedHost::new();
    host.fail_open = true;
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let result = run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    );
    assert!(matches!(result, Err(RefreshError::Host(_))));

    let calls = calls.borrow();
    assert_eq!(count(&calls, &Call::Quit), 1);
    // The run never got as far as the readiness check.
    assert_eq!(count(&calls, &Call::ActivateWorkbook), 0);
}

#[test]
fn readiness_retry_is_bounded_and_degrades_to_continuation() {
    let mut host = ScriptedHost::new();
    host.activate_failures = u32::MAX;
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report = run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    )
    .expect("readiness exhaustion is not fatal");

    assert!(!report.workbook_ready);
    let calls = calls.borrow();
    assert_eq!(count(&calls, &Call::ActivateWorkbook), 10);
    // The run carried on regardless.
    assert_eq!(count(&calls, &Call::SaveAndCloseWorkbook), 1);
}

#[test]
fn readiness_recovers_after_transient_failures() {
    let mut host = ScriptedHost::new();
    host.activate_failures = 3;
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let report = run(
        || Ok(host),
        workbook.path(),
        &fast_options(ConnectionTypeRegistry::empty()),
    )
    .expect("run succeeds");

    assert!(report.workbook_ready);
    assert_eq!(count(&calls.borrow(), &Call::ActivateWorkbook), 4);
}

#[test]
fn missing_workbook_fails_before_any_host_is_launched() {
    let launched = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&launched);

    let result = run(
        move || {
            *flag.borrow_mut() = true;
            Ok(ScriptedHost::new())
        },
        Path::new("/no/such/report.xlsx"),
        &fast_options(ConnectionTypeRegistry::empty()),
    );

    assert!(matches!(result, Err(RefreshError::WorkbookMissing(_))));
    assert!(!*launched.borrow(), "host must not be started");
}

#[test]
fn configured_poll_bound_maps_to_refresh_timeout() {
    let registry = ConnectionTypeRegistry::empty()
        .with_group("2_OLEDB", ConnectionKind::Oledb)
        .unwrap();

    let host = ScriptedHost::new()
        .with_connection("Sales", ConnectionKind::Oledb)
        .refreshing_for("Sales", u32::MAX);
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let mut options = fast_options(registry);
    options.poll_timeout = Some(Duration::ZERO);

    let result = run(|| Ok(host), workbook.path(), &options);
    assert!(
        matches!(result, Err(RefreshError::RefreshTimeout { ref name, .. }) if name == "Sales")
    );
    // Teardown still released the host.
    assert_eq!(count(&calls.borrow(), &Call::Quit), 1);
}

#[test]
fn fast_combine_can_be_disabled() {
    let host = ScriptedHost::new();
    let calls = host.call_log();

    let workbook = workbook_fixture();
    let mut options = fast_options(ConnectionTypeRegistry::empty());
    options.fast_combine = false;

    run(|| Ok(host), workbook.path(), &options).expect("run succeeds");

    assert_eq!(count(&calls.borrow(), &Call::SetFastCombine(true)), 0);
}
