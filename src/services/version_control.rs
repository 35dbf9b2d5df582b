use async_trait::async_trait;

use crate::domain::diff::StagedDiff;
use crate::domain::message::CommitMessage;
use crate::error::AppResult;

#[async_trait]
pub trait VersionControlService: Send + Sync {
    async fn staged_diff(&self) -> AppResult<StagedDiff>;
    async fn commit(&self, message: &CommitMessage) -> AppResult<()>;
}
