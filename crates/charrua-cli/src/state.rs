//! State persistence for the Charrua CLI
//!
//! Only the authenticated session survives between invocations. Wizard
//! progress is never persisted; `book` runs the whole flow in one call.

use charrua_core::models::AuthSession;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{CliError, Result};

const SESSION_FILE_NAME: &str = "session.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Session returned by login or register
    pub session: Option<AuthSession>,
}

impl AppState {
    /// Load state from file; a missing file is an empty state
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let state_str = std::fs::read_to_string(path)
            .map_err(|e| CliError::StatePersistence(format!("Failed to read state file: {}", e)))?;

        serde_json::from_str(&state_str)
            .map_err(|e| CliError::StatePersistence(format!("Failed to parse state file: {}", e)))
    }

    /// Save state to file
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        let state_str = serde_json::to_string_pretty(self)
            .map_err(|e| CliError::StatePersistence(format!("Failed to serialize state: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CliError::StatePersistence(format!("Failed to create state directory: {}", e))
            })?;
        }

        std::fs::write(path, state_str)
            .map_err(|e| CliError::StatePersistence(format!("Failed to write state file: {}", e)))
    }
}

// ----------------------------------------------------------------------------
// State Manager
// ----------------------------------------------------------------------------

/// Owns the state file location and the loaded state
#[derive(Debug, Clone)]
pub struct StateManager {
    path: PathBuf,
    state: AppState,
}

impl StateManager {
    /// Load the state stored under `data_dir`
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(SESSION_FILE_NAME);
        let state = AppState::load_from_file(&path)?;
        debug!(path = %path.display(), logged_in = state.session.is_some(), "state loaded");
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.state.session.as_ref()
    }

    /// Store a new session
    pub fn store_session(&mut self, session: AuthSession) -> Result<()> {
        self.state.session = Some(session);
        self.state.save_to_file(&self.path)
    }

    /// Forget the session; removes the file
    pub fn clear_session(&mut self) -> Result<()> {
        self.state.session = None;
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| {
                CliError::StatePersistence(format!("Failed to remove state file: {}", e))
            })?;
        }
        Ok(())
    }
}
