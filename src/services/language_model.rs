use async_trait::async_trait;

use crate::domain::provider::ProviderKind;
use crate::error::AppResult;

#[async_trait]
pub trait LanguageModelService: Send + Sync {
    fn kind(&self) -> ProviderKind;
    async fn generate_commit_message(&self, prompt: &str) -> AppResult<String>;
}
