//! Nginx UI access-log analyzer.
//!
//! Finds the newest `nginx-access-ui.log-YYYYMMDD` (plain or `.gz`) in the
//! configured log directory, aggregates per-URL timing stats in a single
//! streaming pass, and renders a top-N HTML report named after the log's
//! date. Re-running against an already-reported log is a cheap no-op.

mod config;
mod discovery;
mod pipeline;
mod report;
mod runner;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use config::Config;
use runner::RunOutcome;

#[derive(Parser)]
#[command(
    name = "logreport",
    version,
    about = "Nginx access-log analyzer — top-N slowest-URL HTML reports"
)]
struct Cli {
    /// JSON config file merged over built-in defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory scanned for input logs (overrides config)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Directory holding the template and receiving reports (overrides config)
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Maximum number of rows in the rendered report (overrides config)
    #[arg(long)]
    report_size: Option<usize>,

    /// Append process logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // The non-blocking writer guard must live until the process exits.
    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("logreport: failed to initialize logging: {:#}", e);
            std::process::exit(1);
        }
    };

    // Every failure ends up here: logged with full context, clean exit.
    if let Err(e) = try_main(&cli) {
        tracing::error!("Run failed: {:#}", e);
        std::process::exit(1);
    }
}

fn try_main(cli: &Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref())?.with_overrides(
        cli.log_dir.as_deref(),
        cli.report_dir.as_deref(),
        cli.report_size,
    );

    match runner::run(&config)? {
        RunOutcome::Reported(path) => {
            tracing::info!("OK — report at {}", path.display());
        }
        // Both no-ops already logged their reason in the runner.
        RunOutcome::AlreadyReported(_) | RunOutcome::NoLog => {}
    }
    Ok(())
}

/// Log to stderr by default, or append to `log_file` when given
/// (the analyzer's own trace, distinct from the logs it analyzes).
fn init_tracing(
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    // RUST_LOG, when set, replaces the default entirely so it can also
    // lower verbosity.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("logreport=info"));

    match log_file {
        Some(path) => {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let name = path
                .file_name()
                .with_context(|| format!("log file path {} has no file name", path.display()))?;
            let appender =
                tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name);
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            tracing_subscriber::fmt()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_env_filter(filter)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
            Ok(None)
        }
    }
}
