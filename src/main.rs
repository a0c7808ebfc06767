//! Delve CLI entry point.

use anyhow::Result;
use clap::Parser;
use delve::cli::{commands, Cli, Commands};
use delve::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("delve={}", log_level)),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.as_ref().map(std::path::PathBuf::from);

    // Load configuration
    let settings = Settings::load_from(config_path.as_ref())?;

    // Execute command
    match &cli.command {
        Commands::Research {
            topic,
            strategy,
            output,
            json,
        } => {
            commands::run_research(topic, strategy.clone(), output.clone(), *json, settings)
                .await?;
        }

        Commands::Batch {
            input,
            output_dir,
            strategy,
            concurrency,
        } => {
            commands::run_batch(
                input.clone(),
                output_dir.clone(),
                strategy.clone(),
                *concurrency,
                settings,
            )
            .await?;
        }

        Commands::Strategies => {
            commands::run_strategies(&settings);
        }

        Commands::Doctor => {
            commands::run_doctor(&settings, config_path.as_ref())?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path)?;
        }
    }

    Ok(())
}
