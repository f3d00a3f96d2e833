//! Charrua CLI library
//!
//! This library provides the pieces behind the `charrua` binary: argument
//! parsing, configuration loading, session persistence and command handlers.

pub mod app;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod state;

pub use app::CharruaApp;
pub use cli::{Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::AppConfig;
pub use error::{CliError, Result};
