use crate::config::AppConfig;
use crate::domain::provider::{Credential, ProviderKind};
use crate::error::AppResult;

/// Print where each credential was discovered, secrets masked.
pub fn run(config: &AppConfig) -> AppResult<()> {
    println!("Workspace: {}", config.workspace_root.display());
    print_credential(
        ProviderKind::Gemini,
        config.credentials.get(ProviderKind::Gemini),
    );
    print_credential(
        ProviderKind::OpenAi,
        config.credentials.get(ProviderKind::OpenAi),
    );

    match config.credentials.select(None) {
        Ok(selection) => {
            println!("Preferred provider: {}", selection.preferred);
            match selection.fallback {
                Some(fallback) => println!("Fallback provider: {fallback}"),
                None => println!("Fallback provider: <none>"),
            }
        }
        Err(_) => println!("Preferred provider: <none; no credentials found>"),
    }

    Ok(())
}

fn print_credential(kind: ProviderKind, credential: Option<&Credential>) {
    match credential {
        Some(credential) => println!(
            "{kind} API key: {} (from {})",
            mask_secret(&credential.key),
            credential.source.display()
        ),
        None => println!("{kind} API key: <not found>"),
    }
}

fn mask_secret(token: &str) -> String {
    if token.len() > 6 {
        let prefix = &token[..3];
        let suffix = &token[token.len() - 3..];
        format!("{prefix}***{suffix}")
    } else {
        "***".to_string()
    }
}
