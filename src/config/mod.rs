mod file_config;

pub use file_config::FileConfig;

use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub library_path: Option<PathBuf>,
    pub sqlite_path: Option<PathBuf>,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub library_path: PathBuf,
    pub sqlite_path: PathBuf,
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let library_path = file
            .library_path
            .map(PathBuf::from)
            .or_else(|| cli.library_path.clone())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "library_path must be specified via --library-path or in config file"
                )
            })?;

        if !library_path.exists() {
            bail!("Library directory does not exist: {:?}", library_path);
        }
        if !library_path.is_dir() {
            bail!("library_path is not a directory: {:?}", library_path);
        }

        let sqlite_path = file
            .sqlite_path
            .map(PathBuf::from)
            .or_else(|| cli.sqlite_path.clone())
            .unwrap_or_else(|| library_path.join("sqlite.db"));

        let port = file.port.unwrap_or(cli.port);

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        Ok(Self {
            library_path,
            sqlite_path,
            port,
            logging_level,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
