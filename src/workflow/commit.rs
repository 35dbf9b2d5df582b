use std::io::{self, Write};

use tracing::{debug, warn};

use crate::context::AppContext;
use crate::domain::message::CommitMessage;
use crate::domain::prompt::build_prompt;
use crate::domain::provider::ProviderKind;
use crate::error::{AppError, AppResult};

pub struct CommitOptions {
    /// Print the generated message instead of committing.
    pub print_only: bool,
}

pub struct CommitOutcome {
    pub message: CommitMessage,
    /// Which provider produced the message; `None` when it was typed in by
    /// hand.
    pub provider: Option<ProviderKind>,
    pub committed: bool,
}

pub async fn generate_and_commit(
    ctx: &AppContext,
    options: CommitOptions,
) -> AppResult<CommitOutcome> {
    debug!(
        workspace = %ctx.config.workspace_root.display(),
        "collecting staged diff"
    );
    let diff = ctx.version_control.staged_diff().await?;
    if diff.is_empty() {
        return Err(AppError::EmptyDiff);
    }

    let prompt = build_prompt(&diff);

    let (message, provider) = match generate_from_providers(ctx, &prompt).await {
        Ok(generated) => (generated.message, Some(generated.provider)),
        Err(err @ AppError::Provider { .. }) => {
            eprintln!("Error: {err}");
            eprintln!("No provider could generate a message.");
            (read_manual_message()?, None)
        }
        Err(err) => return Err(err),
    };

    if options.print_only {
        return Ok(CommitOutcome {
            message,
            provider,
            committed: false,
        });
    }

    ctx.version_control.commit(&message).await?;

    Ok(CommitOutcome {
        message,
        provider,
        committed: true,
    })
}

struct Generated {
    message: CommitMessage,
    provider: ProviderKind,
}

/// One attempt per provider, preferred first. Only provider failures advance
/// the chain; anything else aborts it.
async fn generate_from_providers(ctx: &AppContext, prompt: &str) -> AppResult<Generated> {
    let mut last_error = None;

    for client in &ctx.providers {
        match client.generate_commit_message(prompt).await {
            Ok(raw) => {
                let message = CommitMessage::from_raw(&raw).ok_or_else(|| AppError::Extraction {
                    provider: client.kind(),
                    reason: "message was empty after cleanup".to_string(),
                })?;
                return Ok(Generated {
                    message,
                    provider: client.kind(),
                });
            }
            Err(err @ AppError::Provider { .. }) => {
                warn!("provider attempt failed: {err}");
                last_error = Some(err);
            }
            Err(err) => return Err(err),
        }
    }

    Err(last_error.unwrap_or_else(|| {
        AppError::Configuration(
            "no provider credentials found; set GEMINI_API_KEY or OPENAI_API_KEY in a .env file"
                .to_string(),
        )
    }))
}

fn read_manual_message() -> AppResult<CommitMessage> {
    let mut stdout = io::stdout();
    write!(stdout, "Enter a commit message to use instead (empty line aborts): ")?;
    stdout.flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    CommitMessage::from_raw(input.trim()).ok_or(AppError::Aborted)
}
