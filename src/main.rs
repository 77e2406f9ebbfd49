//! cluecommit - CLI entry point.

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use dialoguer::{Password, Select};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use cluecommit::claude::check_claude_installed;
use cluecommit::codex::check_codex_installed;
use cluecommit::config::Config;
use cluecommit::{
    ExternalEditor, GitRepository, LlmRouter, Provider, TerminalReviewer, Workflow,
    WorkflowOptions, WorkflowOutcome,
};

/// Generate a commit message from staged changes, review it, and commit.
#[derive(Parser, Debug)]
#[command(name = "cluecommit")]
#[command(about = "Generate commit messages from staged changes using Claude Code or Codex")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Stage all modified and deleted tracked files before analysis
    #[arg(short = 'a', long)]
    all: bool,

    /// Extra focus for the first generated message
    #[arg(short = 'c', long)]
    clue: Option<String>,

    /// Provider to try first (overrides the config file)
    #[arg(long, value_enum)]
    provider: Option<Provider>,

    /// Model passed to the provider CLI (overrides the config file)
    #[arg(long)]
    model: Option<String>,

    /// Enable debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show or change stored settings
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Print the effective configuration with the API key masked
    Show,
    /// Default model
    Model {
        #[command(subcommand)]
        action: ModelAction,
    },
    /// API key exported to the provider CLI
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
    /// Provider tried first
    Provider {
        #[command(subcommand)]
        action: ProviderAction,
    },
}

#[derive(Subcommand, Debug)]
enum ModelAction {
    /// Store the default model; choose from a list when NAME is omitted
    Set { name: Option<String> },
}

#[derive(Subcommand, Debug)]
enum KeyAction {
    /// Store the API key; prompt for it when KEY is omitted
    Set { key: Option<String> },
}

#[derive(Subcommand, Debug)]
enum ProviderAction {
    /// Store the provider tried first
    Set {
        #[arg(value_enum)]
        provider: Provider,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Some(Command::Config { action }) => run_config(action),
        None => run_commit(cli).await,
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "cluecommit=debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run_commit(cli: Cli) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    if let Some(provider) = cli.provider {
        config.llm.provider = provider;
    }
    if let Some(model) = cli.model {
        config.llm.model = Some(model);
    }
    debug!(
        "Using provider {} (model: {})",
        config.llm.provider,
        config.llm.model.as_deref().unwrap_or("default")
    );

    let repo = GitRepository::from_current_dir().context("Failed to read current directory")?;
    let generator = LlmRouter::new(&config.llm);
    warn_if_primary_missing(&generator).await;
    let editor = ExternalEditor::from_settings(&config.editor);

    let mut workflow = Workflow::new(repo, generator, TerminalReviewer::new(), editor);
    let outcome = workflow
        .run(WorkflowOptions {
            stage_all: cli.all,
            initial_clue: cli.clue,
        })
        .await?;

    if let WorkflowOutcome::Committed(message) = outcome {
        debug!("Committed message: {}", message.lines().next().unwrap_or_default());
    }
    Ok(())
}

/// The fallback still runs, so a missing primary CLI only warrants a warning.
async fn warn_if_primary_missing(router: &LlmRouter) {
    let installed = match router.primary() {
        Provider::Claude => check_claude_installed().await.map_err(|e| e.to_string()),
        Provider::Codex => check_codex_installed().await.map_err(|e| e.to_string()),
    };
    if let Err(e) = installed {
        warn!("{e}. Falling back to {}", router.fallback());
    }
}

fn run_config(action: ConfigCommand) -> Result<()> {
    let path = Config::default_path()?;

    if let ConfigCommand::Show = action {
        let mut config = Config::load_from(&path)?;
        config.apply_env_overrides();
        println!("# {}", path.display());
        print!("{}", config.display_masked());
        return Ok(());
    }

    // Stored values only; env overrides are never written back
    let mut config = Config::load_from(&path)?;

    match action {
        ConfigCommand::Show => {}
        ConfigCommand::Model {
            action: ModelAction::Set { name },
        } => {
            let model = match name {
                Some(name) => name,
                None => choose_model(config.llm.provider)?,
            };
            println!("Default model set to {model}");
            config.llm.model = Some(model);
        }
        ConfigCommand::Key {
            action: KeyAction::Set { key },
        } => {
            let key = match key {
                Some(key) => key,
                None => Password::new()
                    .with_prompt(format!("{} API key", config.llm.provider))
                    .interact()
                    .context("Failed to read API key")?,
            };
            if key.trim().is_empty() {
                bail!("API key must not be empty");
            }
            config.llm.api_key = Some(key.trim().to_string());
            println!("API key saved");
        }
        ConfigCommand::Provider {
            action: ProviderAction::Set { provider },
        } => {
            config.llm.provider = provider;
            println!("Provider set to {provider}");
        }
    }

    config
        .save_to(&path)
        .with_context(|| format!("Failed to save {}", path.display()))
}

fn choose_model(provider: Provider) -> Result<String> {
    let models = provider.known_models();
    let index = Select::new()
        .with_prompt(format!("Select a default {provider} model"))
        .items(models)
        .default(0)
        .interact()
        .context("No model selected")?;
    Ok(models[index].to_string())
}
