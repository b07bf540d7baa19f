//! Nightjar CLI - unattended workbook refresh

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use nightjar_core::HostError;
use nightjar_engine::{RefreshOptions, RefreshReport};
use nightjar_excel_com::{BridgeConfig, ExcelHost};

#[derive(Parser)]
#[command(name = "nightjar")]
#[command(
    author,
    version,
    about = "Refresh a workbook's external data connections and pivot caches, recalculate, and save in place"
)]
struct Cli {
    /// Workbook to refresh (saved in place)
    workbook: PathBuf,

    /// Seconds between polls of an OLEDB connection's refreshing flag
    #[arg(long, default_value = "1")]
    poll_interval: u64,

    /// Give up on one connection's refresh after this many seconds
    /// (default: wait indefinitely)
    #[arg(long)]
    poll_timeout: Option<u64>,

    /// Workbook activation attempts before continuing best-effort
    #[arg(long, default_value = "10")]
    readiness_attempts: u32,

    /// Seconds between activation attempts
    #[arg(long, default_value = "1")]
    readiness_interval: u64,

    /// Leave the workbook's fast-combine query mode untouched
    #[arg(long)]
    no_fast_combine: bool,

    /// Path to the excel-refresh-bridge.exe Windows executable
    #[arg(long)]
    bridge_exe: Option<PathBuf>,

    /// Path to the WINE executable
    #[arg(long, default_value = "wine")]
    wine: PathBuf,

    /// WINEPREFIX for isolating the WINE environment
    #[arg(long)]
    wine_prefix: Option<PathBuf>,

    /// Verbose logging (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = RefreshOptions {
        poll_interval: Duration::from_secs(cli.poll_interval),
        poll_timeout: cli.poll_timeout.map(Duration::from_secs),
        readiness_attempts: cli.readiness_attempts,
        readiness_interval: Duration::from_secs(cli.readiness_interval),
        fast_combine: !cli.no_fast_combine,
        ..Default::default()
    };

    let bridge_config = BridgeConfig {
        bridge_exe_path: cli.bridge_exe,
        wine_path: cli.wine,
        wine_prefix: cli.wine_prefix,
    };

    // The host is launched lazily so a missing workbook path fails before
    // any Excel process is started.
    let report = nightjar_engine::run(
        move || {
            ExcelHost::start(bridge_config)
                .map_err(|e| HostError::new("StartExcel", e.to_string()))
        },
        &cli.workbook,
        &options,
    )
    .with_context(|| format!("Failed to refresh '{}'", cli.workbook.display()))?;

    print_report(&cli.workbook, &report);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_report(workbook: &PathBuf, report: &RefreshReport) {
    println!("Refreshed '{}'", workbook.display());
    println!("  Connections refreshed: {}", report.connections_refreshed);
    println!("  Pivot caches refreshed: {}", report.pivot_caches_refreshed);
    if !report.workbook_ready {
        println!("  Note: workbook never reported ready; refresh ran best-effort");
    }
}
