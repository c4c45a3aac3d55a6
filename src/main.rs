use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;

use mrctl::cli::Cli;
use mrctl::commands::{dispatch, Command};
use mrctl::config::{LoggingConfig, Settings};

/// Main entry point for mrctl
///
/// Loads settings, sets up logging, then runs the requested subcommand against
/// the configured registry. Entity dumps and rendered resources go to stdout,
/// diagnostics to stderr or the configured log file.
///
/// # Exit status
/// 0 on success, 1 when configuration, connection or the command itself fails
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load settings first
    let settings = match Settings::load(&cli.config, &cli.overrides()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: failed to load configuration from {}: {}", cli.config.display(), e);
            return ExitCode::FAILURE;
        }
    };

    // Keep the guard alive until exit so buffered log lines are flushed
    let _guard = init_logging(&settings.logging);
    info!("Registry endpoint: {}", settings.registry.address());

    match run(cli.command.into(), &settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, settings: &Settings) -> anyhow::Result<()> {
    let name = match &command {
        Command::Register(_) => "register",
        Command::Get(_) => "get",
        Command::CreateInference(_) => "create-inference",
        Command::Reconcile => "reconcile",
    };

    let mut stdout = std::io::stdout();
    dispatch(command, &settings.registry, &mut stdout)
        .await
        .with_context(|| format!("{} failed", name))
}

fn init_logging(logging: &LoggingConfig) -> WorkerGuard {
    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let (writer, guard) = match &logging.file {
        Some(dir) => tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, dir, "mrctl")),
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        // Disable ANSI colors for log files
        .with_ansi(logging.file.is_none())
        .with_target(false)
        .init();

    guard
}
