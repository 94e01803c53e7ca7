//! These structs provide the CLI interface for the agenda dashboard.

use clap::{Parser, Subcommand};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing_subscriber::filter::LevelFilter;

/// agenda: an expense ledger served to a web dashboard.
///
/// Expenses are recorded into CSV tables inside a data directory and served
/// as JSON and CSV to a browser dashboard. Run `agenda init` once to create
/// the data directory, then `agenda serve` to start the dashboard.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    #[command(subcommand)]
    command: Command,
}

impl Args {
    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create the data directory and write the default configuration file.
    Init,
    /// Serve the dashboard API.
    Serve(ServeArgs),
}

/// Arguments common to all subcommands.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The directory where ledger data and configuration are held.
    /// Defaults to ~/agenda
    #[arg(long, env = "AGENDA_HOME", default_value_t = default_agenda_home())]
    agenda_home: DisplayPath,
}

impl Common {
    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn agenda_home(&self) -> &DisplayPath {
        &self.agenda_home
    }
}

/// Args for the `agenda serve` command.
#[derive(Debug, Parser, Clone)]
pub struct ServeArgs {
    /// Address to bind, e.g. 127.0.0.1:3000. Overrides the configured value.
    #[arg(long)]
    listen: Option<String>,
}

impl ServeArgs {
    pub fn listen(&self) -> Option<&str> {
        self.listen.as_deref()
    }
}

/// A `PathBuf` that implements `Display` so clap can show it as a default
/// value.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DisplayPath(PathBuf);

impl DisplayPath {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl Display for DisplayPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl FromStr for DisplayPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(DisplayPath(PathBuf::from(s)))
    }
}

impl From<PathBuf> for DisplayPath {
    fn from(path: PathBuf) -> Self {
        DisplayPath(path)
    }
}

impl Deref for DisplayPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn default_agenda_home() -> DisplayPath {
    dirs::home_dir().unwrap_or_default().join("agenda").into()
}
