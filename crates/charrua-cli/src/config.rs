//! Configuration for the Charrua CLI
//!
//! The file is TOML with the client sections at the top level:
//!
//! ```toml
//! data_dir = "/home/ana/.charrua"
//!
//! [api]
//! base_url = "https://api.charruabus.com.uy/api"
//! request_timeout_secs = 30
//!
//! [polling]
//! unread_interval_secs = 30
//!
//! [booking]
//! reset_on_payment_return = true
//! ```

use anyhow::Context;
use charrua_core::{ApiConfig, BookingConfig, ClientConfig, PollingConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

const APP_DIR_NAME: &str = "charrua";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Where the session file lives; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub api: ApiConfig,
    pub polling: PollingConfig,
    pub booking: BookingConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration as TOML
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| CliError::Config(format!("Failed to serialize config: {}", e)))?;
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Apply command line and environment overrides
    pub fn with_overrides(mut self, api_url: Option<&str>, data_dir: Option<&str>) -> Self {
        if let Some(url) = api_url {
            self.api.base_url = url.to_string();
        }
        if let Some(dir) = data_dir {
            self.data_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Client configuration handed to the runtime
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            api: self.api.clone(),
            polling: self.polling.clone(),
            booking: self.booking.clone(),
        }
    }

    /// Resolve the data directory
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => {
                let base = dirs::data_dir().context("No platform data directory available")?;
                Ok(base.join(APP_DIR_NAME))
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.client_config()
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))
    }
}
