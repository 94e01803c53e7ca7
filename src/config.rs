//! Configuration file handling for the agenda dashboard.
//!
//! The configuration file is stored at `$AGENDA_HOME/config.json` and names
//! the ledger files, the backup rotation depth and the listen address. The
//! CSV tables and the `.backups/` directory live next to it.

use crate::backup::Backup;
use crate::{fs, Result};
use anyhow::{bail, ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "agenda";
const CONFIG_VERSION: u8 = 1;
const BACKUPS: &str = ".backups";
const CONFIG_JSON: &str = "config.json";
const GASTOS_CSV: &str = "gastos.csv";
const DESPESAS_CSV: &str = "despesas.csv";
const BACKUP_COPIES: u32 = 5;
const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

/// The `Config` object represents the configuration of the app: the data
/// directory plus the settings loaded from `config.json` inside it.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the data directory, its `.backups/` subdirectory and an
    /// initial `config.json` with default settings. Fails if a config file
    /// already exists, so a re-run cannot clobber edited settings.
    pub fn init(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        fs::create_dir_all(&maybe_relative).context("Unable to create the agenda home directory")?;
        let root = canonicalize(&maybe_relative)?;

        let backups = root.join(BACKUPS);
        fs::create_dir_all(&backups)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.is_file() {
            bail!("A config file already exists at {}", config_path.display());
        }
        let config_file = ConfigFile::default();
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            backups,
            config_path,
            config_file,
        })
    }

    /// Loads an existing data directory: validates that the directory, the
    /// config file and the backups directory exist, then reads the settings.
    pub fn load(agenda_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = agenda_home.into();
        let root = canonicalize(&maybe_relative)
            .context("Agenda home is missing; run `agenda init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display());
        }
        let config_file = ConfigFile::load(&config_path)?;

        let config = Self {
            backups: root.join(BACKUPS),
            root,
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            );
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    /// Path of the flat ledger file.
    pub fn ledger_path(&self) -> PathBuf {
        self.root.join(&self.config_file.ledger_file)
    }

    /// Path of the category × month matrix file.
    pub fn matrix_path(&self) -> PathBuf {
        self.root.join(&self.config_file.matrix_file)
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn listen(&self) -> &str {
        &self.config_file.listen
    }

    /// Creates a `Backup` instance for the stores.
    pub fn backup(&self) -> Backup {
        Backup::new(self.backups.clone(), self.backup_copies())
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("Unable to canonicalize the path {}", path.display()))
}

/// Serialization format of the configuration file.
///
/// Example:
/// ```json
/// {
///   "app_name": "agenda",
///   "config_version": 1,
///   "ledger_file": "gastos.csv",
///   "matrix_file": "despesas.csv",
///   "backup_copies": 5,
///   "listen": "127.0.0.1:3000"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "agenda"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// File name of the flat ledger, relative to the home directory
    ledger_file: String,

    /// File name of the month matrix, relative to the home directory
    matrix_file: String,

    /// Number of backup copies to keep per ledger file
    backup_copies: u32,

    /// Address the dashboard binds to
    listen: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            ledger_file: GASTOS_CSV.to_string(),
            matrix_file: DESPESAS_CSV.to_string(),
            backup_copies: BACKUP_COPIES,
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        Ok(config)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        std::fs::write(path, data)
            .with_context(|| format!("Unable to write config file at {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("agenda_home");

        let created = Config::init(&home).unwrap();
        assert!(created.backups().is_dir());
        assert!(created.config_path().is_file());

        let loaded = Config::load(&home).unwrap();
        assert_eq!(loaded.ledger_path().file_name().unwrap(), GASTOS_CSV);
        assert_eq!(loaded.matrix_path().file_name().unwrap(), DESPESAS_CSV);
        assert_eq!(loaded.backup_copies(), BACKUP_COPIES);
        assert_eq!(loaded.listen(), DEFAULT_LISTEN);
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        Config::init(dir.path()).unwrap();
        assert!(Config::init(dir.path()).is_err());
    }

    #[test]
    fn test_load_missing_home_fails() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path().join("nope")).is_err());
    }

    #[test]
    fn test_load_invalid_app_name_fails() {
        let dir = TempDir::new().unwrap();
        Config::init(dir.path()).unwrap();

        let config_path = dir.path().join(CONFIG_JSON);
        let content = std::fs::read_to_string(&config_path)
            .unwrap()
            .replace("\"agenda\"", "\"other_app\"");
        std::fs::write(&config_path, content).unwrap();

        let result = Config::load(dir.path());
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid app_name"));
    }
}
