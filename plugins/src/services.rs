//! ServicesFactory implementation: builds every collaborator from config for the CLI.
use async_trait::async_trait;
use genius_core::api::{AppConfig, GeniusError, Services, ServicesFactory};

use crate::factory;

#[derive(Default)]
pub struct PluginServicesFactory;

#[async_trait]
impl ServicesFactory for PluginServicesFactory {
    async fn build_services(&self, cfg: &AppConfig) -> Result<Services, GeniusError> {
        let plugin_err = |e: anyhow::Error| GeniusError::Config(format!("{:#}", e));

        let mut services = Services::new(factory::build_editor(cfg), factory::build_repository(cfg));
        services.linter = factory::build_linter(cfg);
        services.test_runner = factory::build_test_runner(cfg);
        services.security = factory::build_security(cfg).map_err(plugin_err)?;
        services.planner = factory::build_planner(cfg).map_err(plugin_err)?;
        services.search = factory::build_search(cfg).map_err(plugin_err)?;

        tracing::debug!(
            target: "genius.services",
            editor = services.editor.name(),
            linter = services.linter.is_some(),
            tests = services.test_runner.is_some(),
            security = services.security.is_some(),
            planner = services.planner.is_some(),
            search = services.search.is_some(),
            "services built"
        );
        Ok(services)
    }
}
