mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod services;
mod workflow;

use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::commit::{self as commit_cmd, CommitCommandArgs};
use crate::cmd::config as config_cmd;
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::domain::provider::{ProviderKind, ProviderSelection};
use crate::error::{AppError, AppResult};
use crate::infra::gemini::GeminiClient;
use crate::infra::git::GitCli;
use crate::infra::openai::OpenAiClient;
use crate::services::LanguageModelService;

#[derive(Parser)]
#[command(name = "jot", author, version, about = "Write git commit messages with an LLM")]
struct Cli {
    /// Log resolver and provider diagnostics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a message for the staged changes and commit them.
    Commit(CommitArgs),
    /// Show which provider credentials were discovered and where.
    Config,
}

#[derive(Args)]
struct CommitArgs {
    /// Print the generated message instead of committing.
    #[arg(short, long)]
    print: bool,

    /// Force a provider (gemini or openai) instead of the default preference.
    #[arg(long)]
    provider: Option<String>,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("jot=debug")
            .with_writer(std::io::stderr)
            .init();
    }

    match cli.command {
        Commands::Config => {
            let cwd = std::env::current_dir()?;
            let config = AppConfig::load(&cwd)?;
            config_cmd::run(&config)
        }
        Commands::Commit(args) => run_commit(args).await,
    }
}

async fn run_commit(args: CommitArgs) -> AppResult<()> {
    let cwd = std::env::current_dir()?;
    let config = AppConfig::load(&cwd)?;

    let forced = match args.provider.as_deref() {
        Some(name) => Some(ProviderKind::parse(name).ok_or_else(|| {
            AppError::Configuration(format!(
                "unknown provider '{name}'; expected gemini or openai"
            ))
        })?),
        None => None,
    };

    let providers = match config.credentials.select(forced) {
        Ok(selection) => provider_chain(&config, &selection)?,
        Err(err) if forced.is_some() => return Err(err),
        // Missing credentials are reported after the empty-diff check.
        Err(_) => Vec::new(),
    };

    let git = Arc::new(GitCli::new(config.workspace_root.clone()));
    let context = AppContext::new(config, git, providers);

    let outcome = commit_cmd::run(&context, CommitCommandArgs { print: args.print }).await?;

    if outcome.committed {
        match outcome.provider {
            Some(provider) => println!("Committed with a message from {provider}."),
            None => println!("Committed with the manually entered message."),
        }
    } else {
        println!("{}", outcome.message.as_str());
    }

    Ok(())
}

fn provider_chain(
    config: &AppConfig,
    selection: &ProviderSelection,
) -> AppResult<Vec<Arc<dyn LanguageModelService>>> {
    let mut chain: Vec<Arc<dyn LanguageModelService>> = Vec::with_capacity(2);
    chain.push(build_client(config, selection.preferred)?);
    if let Some(fallback) = selection.fallback {
        chain.push(build_client(config, fallback)?);
    }
    Ok(chain)
}

fn build_client(
    config: &AppConfig,
    kind: ProviderKind,
) -> AppResult<Arc<dyn LanguageModelService>> {
    let credential = config
        .credentials
        .get(kind)
        .ok_or_else(|| AppError::Configuration(format!("no API key resolved for {kind}")))?;

    Ok(match kind {
        ProviderKind::Gemini => Arc::new(GeminiClient::new(
            credential.key.clone(),
            config.gemini_model.clone(),
            config.temperature,
        )?),
        ProviderKind::OpenAi => Arc::new(OpenAiClient::new(
            credential.key.clone(),
            config.openai_model.clone(),
            config.temperature,
        )?),
    })
}
