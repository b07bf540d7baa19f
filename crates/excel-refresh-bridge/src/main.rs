//! Excel refresh bridge — a Windows process that automates Excel via COM,
//! controlled by JSON commands over stdin/stdout.
//!
//! Designed to be cross-compiled from Linux and run under WINE.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! - Reads `Request` objects from stdin
//! - Writes `Response` objects to stdout
//! - Diagnostic/log messages go to stderr (never stdout)

#[cfg(windows)]
mod dispatch;
#[cfg(windows)]
mod excel;

#[cfg(not(windows))]
fn main() {
    eprintln!("excel-refresh-bridge must be compiled for Windows (--target x86_64-pc-windows-gnu)");
    eprintln!("and run under WINE on Linux.");
    std::process::exit(1);
}

#[cfg(windows)]
fn main() {
    use std::io::{self, BufRead, Write};

    use excel_refresh_protocol::*;

    // Use stderr for all diagnostic output so stdout stays clean for protocol
    eprintln!("[excel-refresh-bridge] Starting up...");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mut excel: Option<excel::ExcelApp> = None;

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("[excel-refresh-bridge] stdin read error: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let request: Request = match serde_json::from_str(line) {
            Ok(r) => r,
            Err(e) => {
                eprintln!("[excel-refresh-bridge] JSON parse error: {e}");
                eprintln!("[excel-refresh-bridge] Line was: {line}");
                // Send an error response with id=0 since we couldn't parse the request
                let resp = Response {
                    id: 0,
                    result: ResponseResult::Error {
                        message: format!("JSON parse error: {e}"),
                    },
                };
                let _ = writeln!(out, "{}", serde_json::to_string(&resp).unwrap());
                let _ = out.flush();
                continue;
            }
        };

        let response = handle_command(&mut excel, &request);
        let json = serde_json::to_string(&response).unwrap();
        let _ = writeln!(out, "{json}");
        let _ = out.flush();

        // If it was a shutdown command and it succeeded, exit
        if matches!(request.command, Command::Shutdown) {
            if matches!(response.result, ResponseResult::Ok { .. }) {
                eprintln!("[excel-refresh-bridge] Shutdown complete, exiting.");
                break;
            }
        }
    }

    // If Excel is still running when stdin closes, try to clean up rather
    // than leave an orphaned background process.
    if let Some(app) = excel {
        eprintln!("[excel-refresh-bridge] stdin closed, shutting down Excel...");
        let _ = app.shutdown();
    }

    eprintln!("[excel-refresh-bridge] Process exiting.");
}

#[cfg(windows)]
fn handle_command(
    excel: &mut Option<excel::ExcelApp>,
    request: &excel_refresh_protocol::Request,
) -> excel_refresh_protocol::Response {
    use excel_refresh_protocol::*;

    let id = request.id;

    let result = match &request.command {
        Command::Init => init_com_and_excel(excel),
        Command::SetVisible { visible } => with_excel(excel, |app| {
            app.set_visible(*visible)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::SetDisplayAlerts { on } => with_excel(excel, |app| {
            app.set_display_alerts(*on)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::OpenWorkbook { path } => with_excel(excel, |app| {
            app.open_workbook(path)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::ActivateWorkbook => with_excel(excel, |app| {
            app.activate_workbook()?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::SetFastCombine { on } => with_excel(excel, |app| {
            app.set_fast_combine(*on)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::ListConnections => with_excel(excel, |app| {
            let connections = app.list_connections()?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::Connections { connections }),
            })
        }),
        Command::RefreshConnection { name } => with_excel(excel, |app| {
            app.refresh_connection(name)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::ConnectionRefreshing { name } => with_excel(excel, |app| {
            let value = app.connection_refreshing(name)?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::Flag { value }),
            })
        }),
        Command::CompletePendingQueries => with_excel(excel, |app| {
            app.complete_pending_queries()?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::ListPivotCaches => with_excel(excel, |app| {
            let caches = app.list_pivot_caches()?;
            Ok(ResponseResult::Ok {
                data: Some(ResponseData::PivotCaches { caches }),
            })
        }),
        Command::RefreshPivotCache { index } => with_excel(excel, |app| {
            app.refresh_pivot_cache(*index)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::SetEnableEvents { on } => with_excel(excel, |app| {
            app.set_enable_events(*on)?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::Calculate => with_excel(excel, |app| {
            app.calculate()?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::SaveAndCloseWorkbook => with_excel(excel, |app| {
            app.save_and_close_workbook()?;
            Ok(ResponseResult::Ok { data: None })
        }),
        Command::Shutdown => match excel.take() {
            Some(app) => match app.shutdown() {
                Ok(()) => {
                    uninit_com();
                    ResponseResult::Ok { data: None }
                }
                Err(e) => ResponseResult::Error {
                    message: format!("Shutdown failed: {e}"),
                },
            },
            None => ResponseResult::Ok { data: None },
        },
    };

    Response { id, result }
}

#[cfg(windows)]
fn init_com_and_excel(
    excel: &mut Option<excel::ExcelApp>,
) -> excel_refresh_protocol::ResponseResult {
    use excel_refresh_protocol::ResponseResult;
    use windows::Win32::System::Com::{CoInitializeEx, COINIT_APARTMENTTHREADED};

    if excel.is_some() {
        return ResponseResult::Ok { data: None }; // Already initialized
    }

    // Initialize COM in Single-Threaded Apartment mode (required by Excel)
    unsafe {
        let hr = CoInitializeEx(None, COINIT_APARTMENTTHREADED);
        if let Err(e) = hr.ok() {
            return ResponseResult::Error {
                message: format!("CoInitializeEx failed: {e}"),
            };
        }
    }

    eprintln!("[excel-refresh-bridge] COM initialized (STA)");

    match excel::ExcelApp::new() {
        Ok(app) => {
            eprintln!("[excel-refresh-bridge] Excel.Application created successfully");
            *excel = Some(app);
            ResponseResult::Ok { data: None }
        }
        Err(e) => ResponseResult::Error {
            message: format!("Failed to create Excel.Application: {e}"),
        },
    }
}

#[cfg(windows)]
fn uninit_com() {
    unsafe {
        windows::Win32::System::Com::CoUninitialize();
    }
    eprintln!("[excel-refresh-bridge] COM uninitialized");
}

#[cfg(windows)]
fn with_excel(
    excel: &mut Option<excel::ExcelApp>,
    f: impl FnOnce(&mut excel::ExcelApp) -> Result<excel_refresh_protocol::ResponseResult, String>,
) -> excel_refresh_protocol::ResponseResult {
    match excel.as_mut() {
        Some(app) => match f(app) {
            Ok(r) => r,
            Err(e) => excel_refresh_protocol::ResponseResult::Error { message: e },
        },
        None => excel_refresh_protocol::ResponseResult::Error {
            message: "Excel not initialized. Send 'Init' command first.".to_string(),
        },
    }
}
