//! CLI entrypoint for schatphone
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod commands;
mod render;

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use commands::{Cli, Command, ConfigAction};
use schatphone_application::{AiGateway, ChatStore, RunTurnError, RunTurnUseCase};
use schatphone_domain::{ChatState, NewContact, SystemClock, format_api_error_for_ui};
use schatphone_infrastructure::{
    ConfigLoader, FileConfig, GeminiProvider, JsonFileStore, OpenAiCompatibleProvider,
};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize logging based on verbosity level. With a log file configured,
/// output goes through a non-blocking writer; keep the guard alive.
fn init_logging(verbose: u8, log_file: Option<&str>) -> Result<Option<WorkerGuard>> {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {path}"))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(writer)
        .init();
    Ok(Some(guard))
}

/// Contact id, or a case-insensitive name match.
fn resolve_contact(state: &ChatState, arg: &str) -> Result<u64> {
    if let Ok(id) = arg.parse::<u64>()
        && state.contact(id).is_some()
    {
        return Ok(id);
    }
    state
        .contacts()
        .iter()
        .find(|c| c.name.eq_ignore_ascii_case(arg.trim()))
        .map(|c| c.id)
        .ok_or_else(|| anyhow!("No contact matches '{arg}'. Run `schatphone contacts`."))
}

fn data_dir(cli: &Cli, config: &FileConfig) -> Result<PathBuf> {
    cli.data_dir
        .clone()
        .or_else(|| config.storage.resolve_data_dir())
        .context("cannot determine a data directory; pass --data-dir")
}

fn show_config(config: &FileConfig) -> Result<()> {
    let mut shown = config.clone();
    if !shown.api.key.is_empty() {
        shown.api.key = "********".to_string();
    }
    print!("{}", toml::to_string_pretty(&shown)?);
    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = ConfigLoader::global_config_path()
        .context("cannot determine the config directory")?;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(&path, ConfigLoader::starter_toml()?)?;
    println!("Wrote {}", path.display());
    Ok(())
}

const USER_AGENT: &str = concat!("schatphone/", env!("CARGO_PKG_VERSION"));

/// HTTP client shared by both provider adapters.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .context("failed to build HTTP client")
}

fn build_gateway(config: &FileConfig) -> Result<Arc<AiGateway>> {
    let client = http_client()?;
    let gateway = AiGateway::new(
        Arc::new(OpenAiCompatibleProvider::with_client(client.clone())),
        Arc::new(GeminiProvider::with_client(client)),
    )
    .with_params(config.generation.to_gateway_params());

    let params = gateway.params();
    debug!(
        "Gateway: temperature {}, max output tokens {}, model list timeout {:?}",
        params.temperature, params.max_output_tokens, params.model_list_timeout
    );
    Ok(Arc::new(gateway))
}

fn turn_failure(err: RunTurnError, contact_id: u64) -> anyhow::Error {
    match err {
        RunTurnError::Provider {
            message_id,
            ui_message,
            ..
        } => anyhow!(
            "{ui_message}\nRetry with: schatphone retry {contact_id} {message_id}"
        ),
        other => other.into(),
    }
}

async fn list_models(config: &FileConfig) -> Result<()> {
    let gateway = build_gateway(config)?;
    let settings = config.settings();

    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };
    let result = gateway
        .fetch_available_models_with_cancel(&settings, &cancel)
        .await;
    watcher.abort();

    let list = result.map_err(|e| anyhow!(format_api_error_for_ui(Some(&e), "")))?;
    println!("Provider: {}", list.kind);
    for model in list.models {
        println!("  {model}");
    }
    Ok(())
}

async fn run(cli: &Cli, config: &FileConfig, config_path: Option<&Path>) -> Result<()> {
    match &cli.command {
        Command::Config { action } => {
            return match action {
                ConfigAction::Show => show_config(config),
                ConfigAction::Init { force } => init_config(*force),
                ConfigAction::Sources => {
                    ConfigLoader::print_config_sources(config_path);
                    Ok(())
                }
            };
        }
        Command::Models => return list_models(config).await,
        _ => {}
    }

    // === Dependency Injection ===
    let dir = data_dir(cli, config)?;
    debug!("Using data directory {}", dir.display());
    let mut store = ChatStore::open(Arc::new(JsonFileStore::new(dir)), Arc::new(SystemClock));

    match &cli.command {
        Command::Contacts => println!("{}", render::contact_list(store.state())),
        Command::History { contact } => {
            let id = resolve_contact(store.state(), contact)?;
            let contact = store.state().contact(id).cloned().context("contact vanished")?;
            println!("{}", render::history(store.state(), &contact));
        }
        Command::Send { contact, text } => {
            let id = resolve_contact(store.state(), contact)?;
            let mut settings = config.settings();
            let use_case = RunTurnUseCase::new(build_gateway(config)?);
            let outcome = use_case
                .execute(&mut store, &mut settings, id, &text.join(" "))
                .await
                .map_err(|e| turn_failure(e, id))?;
            if let Some(kind) = settings.api.resolved_kind {
                info!("Reply served by {} provider", kind);
            }
            let name = store.state().contact(id).map(|c| c.name.as_str()).unwrap_or_default();
            println!("{}", render::message_line(&outcome.reply, name));
        }
        Command::Retry {
            contact,
            message_id,
        } => {
            let id = resolve_contact(store.state(), contact)?;
            let mut settings = config.settings();
            let use_case = RunTurnUseCase::new(build_gateway(config)?);
            let outcome = use_case
                .retry(&mut store, &mut settings, id, message_id)
                .await
                .map_err(|e| turn_failure(e, id))?;
            let name = store.state().contact(id).map(|c| c.name.as_str()).unwrap_or_default();
            println!("{}", render::message_line(&outcome.reply, name));
        }
        Command::AddContact {
            name,
            role,
            bio,
            kind,
            service_template,
        } => {
            let contact = store.add_contact(
                NewContact::new(name.as_str())
                    .with_role(role.as_str())
                    .with_bio(bio.as_str())
                    .with_kind(*kind)
                    .with_service_template(service_template.as_str()),
            );
            println!("Added {} (id {})", contact.name, contact.id);
        }
        Command::Draft { contact, text } => {
            let id = resolve_contact(store.state(), contact)?;
            if !store.set_conversation_draft(id, text.join(" ")) {
                debug!("Draft unchanged");
            }
        }
        Command::Read { contact } => {
            let id = resolve_contact(store.state(), contact)?;
            store.mark_conversation_read(id);
        }
        Command::Pin { contact, off } => {
            let id = resolve_contact(store.state(), contact)?;
            store.set_conversation_pinned(id, !off);
        }
        Command::Models | Command::Config { .. } => {}
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_deref()).context("failed to load configuration")?
    };

    let _guard = init_logging(cli.verbose, config.log.file.as_deref())?;
    config.validate()?;

    info!("Starting schatphone");

    run(&cli, &config, cli.config.as_deref()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_uses_configured_generation() {
        let mut config = FileConfig::default();
        config.generation.temperature = 0.25;
        config.generation.max_output_tokens = 64;

        let gateway = build_gateway(&config).unwrap();
        assert_eq!(gateway.params().temperature, 0.25);
        assert_eq!(gateway.params().max_output_tokens, 64);
        assert!(USER_AGENT.starts_with("schatphone/"));
    }

    #[test]
    fn test_resolve_contact_by_id_or_name() {
        let state = ChatState::seeded(Arc::new(SystemClock));
        assert_eq!(resolve_contact(&state, "2").unwrap(), 2);
        assert_eq!(resolve_contact(&state, " eva ").unwrap(), 1);
        assert!(resolve_contact(&state, "nobody").is_err());
    }
}
