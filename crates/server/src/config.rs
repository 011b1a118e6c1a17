//! Service configuration: flags, environment, optional TOML file.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

/// Recipe-management REST backend.
#[derive(Debug, Clone, Parser)]
#[command(name = "cookbook", version, about)]
pub struct Config {
    /// Address the HTTP server binds to.
    #[arg(long, env = "COOKBOOK_LISTEN_ADDR", default_value = "127.0.0.1:8080")]
    pub listen_addr: SocketAddr,

    /// Path to the SQLite database file. Omit for an in-memory database.
    #[arg(long, env = "COOKBOOK_DATABASE_PATH")]
    pub database_path: Option<PathBuf>,

    /// Tracing filter directive, e.g. `info` or `cookbook_server=debug`.
    #[arg(long, env = "COOKBOOK_LOG", default_value = "info")]
    pub log_filter: String,

    /// Optional TOML config file; flags and environment take precedence.
    #[arg(long, env = "COOKBOOK_CONFIG")]
    pub config_file: Option<PathBuf>,
}

/// Subset of settings that may come from the config file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub listen_addr: Option<SocketAddr>,
    pub database_path: Option<PathBuf>,
    pub log_filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

impl Config {
    /// Merge the config file (if any) underneath flag/env settings. Only
    /// values still at their defaults are taken from the file, so the
    /// command line always wins.
    pub fn load(mut self) -> Result<Self, ConfigError> {
        let Some(path) = self.config_file.as_ref() else {
            return Ok(self);
        };

        let file: FileConfig = toml::from_str(&std::fs::read_to_string(path)?)?;

        if let Some(listen_addr) = file.listen_addr {
            if self.listen_addr == default_listen_addr() {
                self.listen_addr = listen_addr;
            }
        }
        if self.database_path.is_none() {
            self.database_path = file.database_path;
        }
        if let Some(log_filter) = file.log_filter {
            if self.log_filter == "info" {
                self.log_filter = log_filter;
            }
        }

        Ok(self)
    }
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:8080".parse().expect("static default address")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_settings_fill_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookbook.toml");
        std::fs::write(
            &path,
            "listen_addr = \"0.0.0.0:9090\"\ndatabase_path = \"/tmp/cookbook.db\"\n",
        )
        .unwrap();

        let config = Config {
            listen_addr: default_listen_addr(),
            database_path: None,
            log_filter: "info".to_string(),
            config_file: Some(path),
        }
        .load()
        .unwrap();

        assert_eq!(config.listen_addr, "0.0.0.0:9090".parse().unwrap());
        assert_eq!(
            config.database_path.as_deref(),
            Some(std::path::Path::new("/tmp/cookbook.db"))
        );
    }

    #[test]
    fn flags_take_precedence_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookbook.toml");
        std::fs::write(&path, "listen_addr = \"0.0.0.0:9090\"\n").unwrap();

        let config = Config {
            listen_addr: "127.0.0.1:3333".parse().unwrap(),
            database_path: None,
            log_filter: "info".to_string(),
            config_file: Some(path),
        }
        .load()
        .unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:3333".parse().unwrap());
    }
}
