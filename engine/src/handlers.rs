//! Command handlers for CLI operations
//!
//! This module implements the handlers for all CLI commands:
//! - serve: Run the chat UI server
//! - chat: Interactive terminal chat
//! - ask: One question, one answer
//! - models: List the model picker
//! - config show/path: Inspect configuration

use anyhow::{Context, Result};
use serde_json::json;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use sdk::{AgentEvent, NullSink, ProgressSink, SageErrorExt, Turn};

use crate::agent::ReactAgent;
use crate::chat::{ChatController, ExchangeOutcome, ModelChoice, Settings};
use crate::cli::ModelArgs;
use crate::config::Config;
use crate::llm::groq::GroqProvider;
use crate::secrets::SecretString;
use crate::server::{self, AppState};
use crate::session::SessionStore;
use crate::tools::{SearchBackend, ToolRegistry};

/// Environment variable the terminal commands read the credential from
pub const GROQ_API_KEY_ENV: &str = "GROQ_API_KEY";

/// Output format for command results
#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for machine consumption
    Json,
}

/// Prints agent progress to stderr so stdout only carries answers
pub struct ConsoleSink;

impl ProgressSink for ConsoleSink {
    fn on_event(&self, event: AgentEvent) {
        match event {
            AgentEvent::Thinking { iteration } if iteration == 1 => eprintln!("Thinking..."),
            AgentEvent::Thinking { .. } => {}
            AgentEvent::ToolStarted { tool, input } => eprintln!("  > {}: {}", tool, input),
            AgentEvent::ToolFinished { tool, output } => {
                eprintln!("  < {} ({} chars)", tool, output.chars().count())
            }
            AgentEvent::FinalAnswer { .. } => {}
        }
    }
}

/// Wire provider, agent and tools from configuration.
///
/// Returns the controller and the name of the web search backend.
pub fn build_controller(config: &Config) -> Result<(ChatController, &'static str)> {
    let provider = GroqProvider::with_timeout(
        config.llm.base_url.clone(),
        Duration::from_secs(config.llm.timeout_secs),
    )
    .context("Failed to create LLM client")?;
    let agent = ReactAgent::from_config(Arc::new(provider), &config.llm);

    let search = SearchBackend::from_env();
    let backend = search.name();
    let tools = ToolRegistry::from_config(&config.tools, search);

    Ok((
        ChatController::new(Arc::new(agent), Arc::new(tools)),
        backend,
    ))
}

/// Settings from command-line overrides, falling back to configuration
pub fn resolve_settings(
    config: &Config,
    args: &ModelArgs,
    credential: Option<SecretString>,
) -> Result<Settings> {
    let model = match args.model.as_deref() {
        Some(model) => model.parse::<ModelChoice>()?,
        None => config.default_model()?,
    };
    let temperature = args.temperature.unwrap_or(config.llm.default_temperature);
    Ok(Settings::new(credential, temperature, model)?)
}

/// Read the credential from `GROQ_API_KEY`, or prompt for it on a terminal
pub fn read_credential() -> Result<Option<SecretString>> {
    if let Ok(key) = std::env::var(GROQ_API_KEY_ENV) {
        if !key.trim().is_empty() {
            return Ok(Some(key.into()));
        }
    }

    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }

    let key = rpassword::prompt_password_stderr("Groq API key: ")
        .context("Failed to read API key")?;
    Ok(Some(key.trim().to_string().into()))
}

/// Run the chat UI until Ctrl-C
pub async fn handle_serve(mut config: Config, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    let addr = config.bind_addr()?;

    let (chat, backend) = build_controller(&config)?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("Sage chat UI: http://{}", listener.local_addr()?);

    let state = AppState::new(config, chat, backend);
    server::serve(listener, state, async {
        tokio::signal::ctrl_c().await.ok();
    })
    .await
    .context("Chat UI server failed")
}

/// Interactive terminal chat
pub async fn handle_chat(config: &Config, args: &ModelArgs, format: OutputFormat) -> Result<()> {
    let settings = resolve_settings(config, args, read_credential()?)?;
    let (chat, _) = build_controller(config)?;

    let mut store = SessionStore::new();
    store.initialize();
    render_turns(store.transcript(), format)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        if matches!(format, OutputFormat::Text) {
            print!("> ");
            std::io::stdout().flush()?;
        }

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "/quit" | "/exit" => break,
            "/reset" => {
                chat.reset(&mut store);
                render_turns(store.transcript(), format)?;
                continue;
            }
            _ => {}
        }

        let before = store.transcript().len();
        match chat.submit(&mut store, &line, &settings, &ConsoleSink).await {
            // The user's own turn is already on screen
            Ok(_) => render_turns(&store.transcript()[before + 1..], format)?,
            Err(e) => eprintln!("✗ {} ({})", e, e.user_hint()),
        }
    }

    Ok(())
}

/// Ask one question in a fresh session
pub async fn handle_ask(
    question: String,
    config: &Config,
    args: &ModelArgs,
    format: OutputFormat,
) -> Result<()> {
    let settings = resolve_settings(config, args, read_credential()?)?;
    let (chat, _) = build_controller(config)?;
    let mut store = SessionStore::new();

    let sink: &dyn ProgressSink = match format {
        OutputFormat::Text => &ConsoleSink,
        OutputFormat::Json => &NullSink,
    };
    let outcome = chat.submit(&mut store, &question, &settings, sink).await?;

    match format {
        OutputFormat::Text => println!("{}", outcome.reply()),
        OutputFormat::Json => {
            let output = json!({
                "question": question,
                "model": settings.model().id(),
                "outcome": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    match outcome {
        ExchangeOutcome::Completed { .. } => Ok(()),
        ExchangeOutcome::Failed { error, .. } => Err(anyhow::anyhow!(error)),
    }
}

pub fn handle_models(config: &Config, format: OutputFormat) -> Result<()> {
    let default_model = config.default_model()?;

    match format {
        OutputFormat::Text => {
            println!("Available models:");
            for model in ModelChoice::ALL {
                let marker = if model == default_model { " (default)" } else { "" };
                println!("  {:<20} {}{}", model.id(), model.display_name(), marker);
            }
        }
        OutputFormat::Json => {
            let models: Vec<_> = ModelChoice::ALL
                .iter()
                .map(|m| json!({ "id": m.id(), "name": m.display_name() }))
                .collect();
            let output = json!({
                "models": models,
                "default_model": default_model.id(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

pub fn handle_config_show(config: &Config, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
            println!("{}", text);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}

pub fn handle_config_path(path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => println!("{}", path.display()),
        OutputFormat::Json => println!("{}", json!({ "path": path })),
    }
    Ok(())
}

fn render_turns(turns: &[Turn], format: OutputFormat) -> Result<()> {
    for turn in turns {
        match format {
            OutputFormat::Text => println!("\n[{}] {}\n", turn.role, turn.content),
            OutputFormat::Json => println!("{}", serde_json::to_string(turn)?),
        }
    }
    Ok(())
}
