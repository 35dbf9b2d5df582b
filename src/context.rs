use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{LanguageModelService, VersionControlService};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub version_control: Arc<dyn VersionControlService>,
    /// Provider clients in fallback order, preferred first.
    pub providers: Vec<Arc<dyn LanguageModelService>>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        version_control: Arc<dyn VersionControlService>,
        providers: Vec<Arc<dyn LanguageModelService>>,
    ) -> Self {
        Self {
            config,
            version_control,
            providers,
        }
    }
}
