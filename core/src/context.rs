use std::sync::Arc;

use crate::collab::{
    Editor, Linter, PlanningDelegate, Repository, SearchProvider, SecurityScanner, TestRunner,
};
use crate::config::AppConfig;
use crate::error::GeniusError;

/// Collaborators the orchestrator drives. Optional ones are simply skipped.
#[derive(Clone)]
pub struct Services {
    pub editor: Arc<dyn Editor>,
    pub repository: Arc<dyn Repository>,
    pub linter: Option<Arc<dyn Linter>>,
    pub test_runner: Option<Arc<dyn TestRunner>>,
    pub security: Option<Arc<dyn SecurityScanner>>,
    pub planner: Option<Arc<dyn PlanningDelegate>>,
    pub search: Option<Arc<dyn SearchProvider>>,
}

impl Services {
    pub fn new(editor: Arc<dyn Editor>, repository: Arc<dyn Repository>) -> Self {
        Self {
            editor,
            repository,
            linter: None,
            test_runner: None,
            security: None,
            planner: None,
            search: None,
        }
    }
}

#[async_trait::async_trait]
pub trait ServicesFactory: Send + Sync {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, GeniusError>;
}
