use agenda_gastos::args::{Args, Command};
use agenda_gastos::dashboard::{self, DashboardState};
use agenda_gastos::store::{LedgerStore, MatrixStore};
use agenda_gastos::{Config, Result};
use clap::Parser;
use std::process::ExitCode;
use tracing::{debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn main_inner(args: Args) -> Result<()> {
    let home = args.common().agenda_home().path();

    match args.command() {
        Command::Init => {
            let config = Config::init(home)?;
            info!("Configuration created at {}", config.config_path().display());
        }

        Command::Serve(serve_args) => {
            let config = Config::load(home)?;
            let backup = config.backup();
            let state = DashboardState {
                ledger: LedgerStore::new(config.ledger_path(), backup.clone()),
                matrix: MatrixStore::new(config.matrix_path(), backup),
            };
            let listen = serve_args.listen().unwrap_or_else(|| config.listen());
            dashboard::serve(state, listen).await?;
        }
    }
    Ok(())
}

/// Initializes the tracing subscriber.
fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for this
            // crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
