use std::path::PathBuf;

use async_trait::async_trait;
use tokio::process::Command;

use crate::domain::diff::StagedDiff;
use crate::domain::message::CommitMessage;
use crate::error::{AppError, AppResult};
use crate::services::VersionControlService;

/// Drives the `git` binary rather than libgit2 so commit hooks, GPG signing
/// and the user's full git config keep working.
pub struct GitCli {
    workspace_root: PathBuf,
}

impl GitCli {
    pub fn new(workspace_root: PathBuf) -> Self {
        Self { workspace_root }
    }
}

#[async_trait]
impl VersionControlService for GitCli {
    async fn staged_diff(&self) -> AppResult<StagedDiff> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.workspace_root)
            .args(["diff", "--cached"])
            .output()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))?;

        if !output.status.success() {
            return Err(AppError::VersionControl(format!(
                "git diff --cached failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(StagedDiff::new(
            String::from_utf8_lossy(&output.stdout).into_owned(),
        ))
    }

    async fn commit(&self, message: &CommitMessage) -> AppResult<()> {
        // Inherit stdio so hook and signing output stays visible.
        let status = Command::new("git")
            .arg("-C")
            .arg(&self.workspace_root)
            .args(["commit", "-m", message.as_str()])
            .status()
            .await
            .map_err(|err| AppError::VersionControl(format!("failed to run git: {err}")))?;

        if !status.success() {
            let code = status
                .code()
                .map(|code| code.to_string())
                .unwrap_or_else(|| "signal".to_string());
            return Err(AppError::VersionControl(format!(
                "git commit exited with status {code}"
            )));
        }

        Ok(())
    }
}
