use mockable::Clock;
use std::sync::Arc;

use crate::coordination::{LifecycleController, LifecycleSettings, TaskViewBuilder};
use crate::domain::repositories::{ActivitySink, ClaimRegistry, TaskCatalog};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TaskCatalog>,
    pub registry: Arc<dyn ClaimRegistry>,
    pub sink: Arc<dyn ActivitySink>,
    pub clock: Arc<dyn Clock + Send + Sync>,
    pub lifecycle: Arc<LifecycleController>,
    pub views: Arc<TaskViewBuilder>,
    /// Return a random subset of repositories from `active-repos`
    pub sample_active_repos: bool,
}

impl AppState {
    /// Wires the coordination services on top of the given stores
    pub fn new(
        catalog: Arc<dyn TaskCatalog>,
        registry: Arc<dyn ClaimRegistry>,
        sink: Arc<dyn ActivitySink>,
        clock: Arc<dyn Clock + Send + Sync>,
        settings: LifecycleSettings,
    ) -> Self {
        let lifecycle = Arc::new(LifecycleController::new(
            registry.clone(),
            sink.clone(),
            clock.clone(),
            settings,
        ));
        let views = Arc::new(TaskViewBuilder::new(
            catalog.clone(),
            registry.clone(),
            clock.clone(),
        ));

        Self {
            catalog,
            registry,
            sink,
            clock,
            lifecycle,
            views,
            sample_active_repos: false,
        }
    }

    pub fn with_active_repo_sampling(mut self, enabled: bool) -> Self {
        self.sample_active_repos = enabled;
        self
    }
}
