//! Sift - sample labeling and simulated AI data cleaning
//!
#![doc = "Main entry point for the Sift command-line tool."]

use anyhow::Result;

use sift::cli::{Cli, Commands};
use sift::commands;
use sift::commands::clean::CleanOptions;
use sift::config::Config;
use sift::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    init_logging(&config.logging)?;

    // Execute command
    match cli.command {
        Commands::Clean {
            query,
            labels,
            count,
            seed,
            tick_ms,
            training_delay_ms,
            json,
        } => {
            tracing::info!("Starting clean session");
            let options = CleanOptions {
                query,
                labels,
                count,
                seed,
                tick_ms,
                training_delay_ms,
                json,
            };
            commands::clean::run_clean(config, options).await?;
            Ok(())
        }
        Commands::Rules { json } => {
            commands::rules::list_rules(&config, json)?;
            Ok(())
        }
        Commands::Sources { json } => {
            commands::sources::list_sources(&config, json)?;
            Ok(())
        }
    }
}
