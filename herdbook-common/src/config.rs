//! Configuration loading and root folder resolution
//!
//! Each setting is taken from the first source that provides it:
//! 1. Command-line argument
//! 2. Environment variable (`HERDBOOK_ROOT_FOLDER`, `HERDBOOK_PORT`)
//! 3. TOML config file (`~/.config/herdbook/config.toml` by default)
//! 4. Compiled default
//!
//! A missing or broken config file never stops startup: it is logged and
//! the compiled defaults are used instead.

use crate::db::DATABASE_FILE_NAME;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const ROOT_FOLDER_ENV: &str = "HERDBOOK_ROOT_FOLDER";
pub const PORT_ENV: &str = "HERDBOOK_PORT";

pub const DEFAULT_PORT: u16 = 5780;
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Contents of the TOML config file; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    #[serde(default)]
    pub port: Option<u16>,

    #[serde(default)]
    pub bind_address: Option<String>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
    /// trace, debug, info, warn or error
    #[serde(default)]
    pub level: Option<String>,
}

/// Values used when no other source sets them
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            port: DEFAULT_PORT,
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// OS data directory, e.g. `~/.local/share/herdbook` on Linux
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::data_dir)
        .map(|d| d.join("herdbook"))
        .unwrap_or_else(|| PathBuf::from("./herdbook_data"))
}

/// Default location of the TOML config file
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("herdbook").join("config.toml"))
}

pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub port: Option<u16>,
    pub bind_address: Option<String>,
    pub log_level: Option<String>,
    /// Alternative config file instead of [`default_config_path`]
    pub config_file: Option<PathBuf>,
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub root_folder: PathBuf,
    pub port: u16,
    pub bind_address: String,
    pub log_level: String,
}

impl AppConfig {
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join(DATABASE_FILE_NAME)
    }

    /// `bind_address:port`
    pub fn listen_address(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Merge command line, environment, config file and defaults
pub fn resolve(cli: &CliOverrides) -> AppConfig {
    let toml = read_config_file(cli.config_file.clone().or_else(default_config_path));
    resolve_with(cli, toml, CompiledDefaults::for_current_platform())
}

fn read_config_file(path: Option<PathBuf>) -> TomlConfig {
    let Some(path) = path else {
        warn!("Could not determine config directory, using defaults");
        return TomlConfig::default();
    };

    if !path.exists() {
        debug!(path = %path.display(), "No config file, using defaults");
        return TomlConfig::default();
    }

    match load_toml_config(&path) {
        Ok(config) => {
            info!(path = %path.display(), "Loaded config file");
            config
        }
        Err(e) => {
            warn!(error = %e, "Ignoring unreadable config file, using defaults");
            TomlConfig::default()
        }
    }
}

fn env_port() -> Option<u16> {
    let value = std::env::var(PORT_ENV).ok()?;
    match value.trim().parse() {
        Ok(port) => Some(port),
        Err(_) => {
            warn!(value = %value, "Ignoring invalid {}", PORT_ENV);
            None
        }
    }
}

/// Priority merge over explicit sources
pub fn resolve_with(cli: &CliOverrides, toml: TomlConfig, defaults: CompiledDefaults) -> AppConfig {
    let root_folder = cli
        .root_folder
        .clone()
        .or_else(|| std::env::var_os(ROOT_FOLDER_ENV).map(PathBuf::from))
        .or(toml.root_folder)
        .unwrap_or(defaults.root_folder);

    let port = cli.port.or_else(env_port).or(toml.port).unwrap_or(defaults.port);

    let bind_address = cli
        .bind_address
        .clone()
        .or(toml.bind_address)
        .unwrap_or(defaults.bind_address);

    let log_level = cli
        .log_level
        .clone()
        .or(toml.logging.level)
        .unwrap_or(defaults.log_level);

    AppConfig {
        root_folder,
        port,
        bind_address,
        log_level,
    }
}

/// Create the root folder if needed and return the database path
pub fn ensure_root_folder(config: &AppConfig) -> Result<PathBuf> {
    if !config.root_folder.exists() {
        std::fs::create_dir_all(&config.root_folder)?;
        info!(path = %config.root_folder.display(), "Created root folder");
    }
    Ok(config.database_path())
}
