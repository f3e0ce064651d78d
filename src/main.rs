//! Library Manager - command-line entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use library_manager::{
    cli::{self, Cli},
    config::{AppConfig, LoggingConfig},
    Library,
};

fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let args = Cli::parse();

    let mut config = AppConfig::load()?;
    if let Some(dir) = args.data_dir.clone() {
        config.storage.data_dir = dir;
    }

    let _guard = init_tracing(&config.logging);

    tracing::debug!("Starting Library Manager v{}", env!("CARGO_PKG_VERSION"));

    let mut library = Library::open(&config);
    cli::run(&mut library, args.command, args.json)
}

/// Console output goes to stderr so stdout stays parseable with `--json`.
/// With `logging.directory` set, a daily-rotated file receives the same events.
fn init_tracing(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let filter = || {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| format!("library_manager={}", logging.level).into())
    };

    let console = if logging.format == "json" {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter())
            .boxed()
    };

    let (file, guard) = match &logging.directory {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "library-manager.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(filter());
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}
