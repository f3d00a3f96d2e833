//! Charrua CLI application
//!
//! Ties the runtime to the on-disk session: the stored session is restored
//! at startup and whatever the runtime ends up with (new login, logout,
//! expiry) is written back after the command ran.

use charrua_core::ApiTransport;
use charrua_runtime::{create_cli_runtime, CharruaRuntime, RuntimeBuilder};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::error::Result;
use crate::state::StateManager;

pub struct CharruaApp {
    config: AppConfig,
    runtime: CharruaRuntime,
    state: StateManager,
}

impl CharruaApp {
    /// Build the app over the reqwest transport
    pub fn new(config: AppConfig) -> Result<Self> {
        let state = StateManager::open(&config.data_dir()?)?;
        let runtime = create_cli_runtime(config.client_config(), state.session().cloned())?;
        info!(api = %config.api.base_url, "Charrua client ready");
        Ok(Self {
            config,
            runtime,
            state,
        })
    }

    /// Build the app over a custom transport
    pub fn with_transport(config: AppConfig, transport: Arc<dyn ApiTransport>) -> Result<Self> {
        let state = StateManager::open(&config.data_dir()?)?;
        let mut builder = RuntimeBuilder::new()
            .with_config(config.client_config())
            .with_transport(transport);
        if let Some(session) = state.session().cloned() {
            builder = builder.with_session(session);
        }
        let runtime = builder.build()?;
        Ok(Self {
            config,
            runtime,
            state,
        })
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn runtime(&self) -> &CharruaRuntime {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut CharruaRuntime {
        &mut self.runtime
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    /// Write the runtime's session back to disk if it changed
    pub fn sync_session(&mut self) -> Result<()> {
        let current = self.runtime.session().session();
        if current.as_ref() == self.state.session() {
            return Ok(());
        }

        match current {
            Some(session) => {
                debug!(user = %session.usuario.email, "storing session");
                self.state.store_session(session)
            }
            None => {
                debug!("removing stored session");
                self.state.clear_session()
            }
        }
    }

    /// Persist the session and stop background tasks
    pub async fn shutdown(mut self) -> Result<()> {
        self.sync_session()?;
        self.runtime.shutdown().await?;
        Ok(())
    }
}
