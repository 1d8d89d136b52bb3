// Sage research assistant
// Main entry point for the sage binary

use clap::Parser;
use sage_engine::cli::{Cli, Command, ConfigAction};
use sage_engine::config::Config;
use sage_engine::handlers::{
    handle_ask, handle_chat, handle_config_path, handle_config_show, handle_models, handle_serve,
    OutputFormat,
};
use sage_engine::telemetry::init_telemetry_with_level;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };

    let config_path = match &cli.config {
        Some(path) => path.clone(),
        None => Config::default_config_path()?,
    };

    let config = if cli.config.is_some() {
        Config::load_from_path(&config_path)?
    } else {
        Config::load_or_create()?
    };

    // --log wins over the config file; RUST_LOG wins over both
    let log_level = cli.log.as_deref().unwrap_or(&config.core.log_level);
    init_telemetry_with_level(log_level);

    tracing::info!(
        "Sage v{} ({} - {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_COMMIT_HASH"),
        env!("BUILD_TIMESTAMP")
    );

    match cli.command {
        Command::Serve { bind } => handle_serve(config, bind).await,

        Command::Chat { model } => handle_chat(&config, &model, format).await,

        Command::Ask { question, model } => {
            tracing::info!("Asking: {}", question);
            handle_ask(question, &config, &model, format).await
        }

        Command::Models => handle_models(&config, format),

        Command::Config { action } => match action {
            ConfigAction::Show => handle_config_show(&config, format),
            ConfigAction::Path => handle_config_path(&config_path, format),
        },
    }
}
