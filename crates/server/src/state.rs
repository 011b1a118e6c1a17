//! Main service state - orchestrates database setup from configuration.

use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::database::{Database, DatabaseSetupError};

/// Shared state handed to every request handler.
#[derive(Debug, Clone)]
pub struct ServiceState {
    database: Database,
}

impl ServiceState {
    pub async fn from_config(config: &Config) -> Result<Self, StateSetupError> {
        let database_url = match config.database_path {
            Some(ref path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)
                        .map_err(|_| StateSetupError::DatabasePathUnavailable)?;
                }
                Url::parse(&format!("sqlite://{}", path.display()))
                    .map_err(|_| StateSetupError::InvalidDatabaseUrl)
            }
            // otherwise just set up an in-memory database
            None => Url::parse("sqlite::memory:").map_err(|_| StateSetupError::InvalidDatabaseUrl),
        }?;
        tracing::info!(url = %database_url, "connecting database");
        let database = Database::connect(&database_url).await?;

        Ok(Self { database })
    }

    pub fn database(&self) -> &Database {
        &self.database
    }
}

#[derive(Debug, Error)]
pub enum StateSetupError {
    #[error("database path parent directory could not be created")]
    DatabasePathUnavailable,

    #[error("invalid database URL")]
    InvalidDatabaseUrl,

    #[error("database setup error: {0}")]
    DatabaseSetup(#[from] DatabaseSetupError),
}
