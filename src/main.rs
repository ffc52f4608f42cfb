//! Feedloop - project feedback chat CLI
//!
#![doc = "Feedloop - project feedback chat CLI"]
#![doc = "Main entry point for the Feedloop application."]

use anyhow::Result;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use feedloop::cli::{Cli, Commands};
use feedloop::commands;
use feedloop::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse first so --verbose can raise the default log level
    let cli = Cli::parse_args();

    init_tracing(cli.verbose);

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or("config/config.yaml");
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    match cli.command {
        Commands::Chat => {
            tracing::info!("Starting interactive chat mode");
            commands::chat::run_chat(config).await?;
            Ok(())
        }
        Commands::Review {
            form,
            messages,
            export,
        } => {
            tracing::info!("Starting review of {}", form.display());
            if let Some(path) = &export {
                tracing::debug!("Report will be written to {}", path.display());
            }
            commands::review::run_review(config, &form, &messages, export).await?;
            Ok(())
        }
    }
}

/// Initialize tracing subscriber with environment filter
///
/// Logs go to stderr so that transcripts on stdout stay clean.
fn init_tracing(verbose: bool) {
    let default_level = if verbose {
        "feedloop=debug"
    } else {
        "feedloop=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
