use std::io;

use thiserror::Error;

use crate::domain::provider::ProviderKind;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("nothing staged for commit; stage changes with `git add` first")]
    EmptyDiff,
    #[error("version control error: {0}")]
    VersionControl(String),
    /// A provider attempt failed. Recoverable while another provider remains
    /// in the fallback chain.
    #[error("{provider} request failed: {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },
    #[error("no usable text in the {provider} response: {reason}")]
    Extraction {
        provider: ProviderKind,
        reason: String,
    },
    #[error("commit aborted: no message was provided")]
    Aborted,
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
