//! Charrua CLI entry point

use clap::Parser;
use tracing::{error, info};

use charrua_cli::{
    app::CharruaApp,
    cli::Cli,
    commands::{surfaced_message, CommandDispatcher},
    config::AppConfig,
    error::Result,
};
use charrua_core::SurfacedErrorFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    setup_logging(cli.verbose);

    // Load configuration
    let config = load_configuration(&cli)?
        .with_overrides(cli.api_url.as_deref(), cli.data_dir.as_deref());

    // Create application
    let mut app = match CharruaApp::new(config) {
        Ok(app) => app,
        Err(e) => {
            error!("Failed to start: {}", e);
            std::process::exit(1);
        }
    };

    // Execute the command
    let mut stdout = std::io::stdout();
    let outcome = CommandDispatcher::execute(cli.command, &mut app, &mut stdout).await;

    if let Err(e) = app.shutdown().await {
        error!("Shutdown failed: {}", e);
    }

    if let Err(e) = outcome {
        let filter = SurfacedErrorFilter::default();
        match surfaced_message(&filter, &e) {
            Some(message) => eprintln!("{}", message),
            None => error!("Command execution failed: {}", e),
        }
        std::process::exit(1);
    }

    info!("Charrua CLI exited successfully");
    Ok(())
}

/// Setup logging based on verbosity level
fn setup_logging(verbose: bool) {
    let log_level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load configuration from file or use defaults
fn load_configuration(cli: &Cli) -> Result<AppConfig> {
    if let Some(config_path) = &cli.config {
        info!("Loading configuration from: {}", config_path);
        AppConfig::load_from_file(config_path)
    } else {
        info!("Using default configuration");
        Ok(AppConfig::default())
    }
}
