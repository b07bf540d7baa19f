//! Excel-specific refresh automation built on top of the generic IDispatch
//! wrapper.

#![cfg(windows)]

use excel_refresh_protocol::{ConnectionInfo, PivotCacheInfo};

use crate::dispatch::{variant_bool, variant_i32, variant_str, DispatchObject};

/// xlConnectionType code for OLEDB connections, the one family refreshed
/// through its OLEDBConnection object, which carries the live Refreshing
/// flag.
const XL_CONNECTION_TYPE_OLEDB: i32 = 1;

/// Manages an Excel.Application COM instance and its single open workbook.
pub struct ExcelApp {
    app: DispatchObject,
    workbook: Option<DispatchObject>,
}

impl ExcelApp {
    /// Create a new Excel.Application instance via COM, hidden and with
    /// alerts suppressed. A visible dialog would hang the unattended job.
    pub fn new() -> Result<Self, String> {
        let app = DispatchObject::create_from_progid("Excel.Application")?;

        app.set_property("Visible", variant_bool(false))?;
        app.set_property("DisplayAlerts", variant_bool(false))?;

        Ok(Self {
            app,
            workbook: None,
        })
    }

    fn workbook(&self) -> Result<&DispatchObject, String> {
        self.workbook
            .as_ref()
            .ok_or_else(|| String::from("No workbook is open"))
    }

    pub fn set_visible(&self, visible: bool) -> Result<(), String> {
        self.app.set_property("Visible", variant_bool(visible))
    }

    pub fn set_display_alerts(&self, on: bool) -> Result<(), String> {
        self.app.set_property("DisplayAlerts", variant_bool(on))
    }

    /// Open the workbook at `path` (Windows path), making it the session's
    /// workbook. One workbook per session.
    pub fn open_workbook(&mut self, path: &str) -> Result<(), String> {
        if self.workbook.is_some() {
            return Err(String::from("A workbook is already open in this session"));
        }
        let workbooks = self.app.get_child("Workbooks")?;
        let wb = workbooks.invoke_child("Open", &[variant_str(path)])?;
        self.workbook = Some(wb);
        Ok(())
    }

    /// Bring the open workbook to the foreground. Raises a COM exception
    /// while the workbook is still loading add-ins or queries.
    pub fn activate_workbook(&self) -> Result<(), String> {
        self.workbook()?.invoke_method("Activate", &[])?;
        Ok(())
    }

    /// Toggle `Queries.FastCombine` for silent batch refreshes (paired with
    /// DisplayAlerts = False).
    pub fn set_fast_combine(&self, on: bool) -> Result<(), String> {
        self.workbook()?
            .get_child("Queries")?
            .set_property("FastCombine", variant_bool(on))
    }

    /// Enumerate the workbook's connections in collection order.
    pub fn list_connections(&self) -> Result<Vec<ConnectionInfo>, String> {
        let connections = self.workbook()?.get_child("Connections")?;
        let count = connections.get_i32("Count")?;

        let mut out = Vec::with_capacity(count.max(0) as usize);
        for i in 1..=count {
            let item = connections.get_indexed("Item", &variant_i32(i))?;
            out.push(ConnectionInfo {
                name: item.get_string("Name")?,
                type_code: item.get_i32("Type")?,
            });
        }
        Ok(out)
    }

    fn connection_by_name(&self, name: &str) -> Result<DispatchObject, String> {
        let connections = self.workbook()?.get_child("Connections")?;
        connections.get_indexed("Item", &variant_str(name))
    }

    /// Trigger a refresh of the named connection.
    pub fn refresh_connection(&self, name: &str) -> Result<(), String> {
        let connection = self.connection_by_name(name)?;
        if connection.get_i32("Type")? == XL_CONNECTION_TYPE_OLEDB {
            connection
                .get_child("OLEDBConnection")?
                .invoke_method("Refresh", &[])?;
        } else {
            connection.invoke_method("Refresh", &[])?;
        }
        Ok(())
    }

    /// Read the named OLEDB connection's live `Refreshing` flag. Errors for
    /// connection families without an OLEDBConnection object.
    pub fn connection_refreshing(&self, name: &str) -> Result<bool, String> {
        self.connection_by_name(name)?
            .get_child("OLEDBConnection")?
            .get_bool("Refreshing")
    }

    /// Block until all pending asynchronous OLEDB/OLAP queries complete.
    pub fn complete_pending_queries(&self) -> Result<(), String> {
        self.app
            .invoke_method("CalculateUntilAsyncQueriesDone", &[])?;
        Ok(())
    }

    /// Enumerate the workbook's pivot caches. `PivotCaches` is a method on
    /// the workbook, not a property.
    pub fn list_pivot_caches(&self) -> Result<Vec<PivotCacheInfo>, String> {
        let caches = self.workbook()?.invoke_child("PivotCaches", &[])?;
        let count = caches.get_i32("Count")?;

        let mut out = Vec::with_capacity(count.max(0) as usize);
        for i in 1..=count {
            let item = caches.get_indexed("Item", &variant_i32(i))?;
            out.push(PivotCacheInfo {
                index: i as u32,
                source_type: item.get_i32("SourceType")?,
            });
        }
        Ok(out)
    }

    /// Trigger a refresh of the pivot cache at a 1-based index.
    pub fn refresh_pivot_cache(&self, index: u32) -> Result<(), String> {
        let caches = self.workbook()?.invoke_child("PivotCaches", &[])?;
        caches
            .get_indexed("Item", &variant_i32(index as i32))?
            .invoke_method("Refresh", &[])?;
        Ok(())
    }

    pub fn set_enable_events(&self, on: bool) -> Result<(), String> {
        self.app.set_property("EnableEvents", variant_bool(on))
    }

    /// Force a full recalculation.
    pub fn calculate(&self) -> Result<(), String> {
        self.app.invoke_method("Calculate", &[])?;
        Ok(())
    }

    /// Save the open workbook in place and close it
    /// (`Close(SaveChanges:=True)`).
    pub fn save_and_close_workbook(&mut self) -> Result<(), String> {
        let wb = self
            .workbook
            .take()
            .ok_or_else(|| String::from("No workbook is open"))?;
        wb.invoke_method("Close", &[variant_bool(true)])?;
        Ok(())
    }

    /// Shut down: discard any workbook left open by a failed run, then quit
    /// Excel.
    pub fn shutdown(mut self) -> Result<(), String> {
        if let Some(wb) = self.workbook.take() {
            let _ = wb.invoke_method("Close", &[variant_bool(false)]);
        }
        self.app.invoke_method("Quit", &[])?;
        Ok(())
    }
}
