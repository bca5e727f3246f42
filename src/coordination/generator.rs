//! Background task generator
//!
//! Every so often, with some probability, drops an urgent bug into a random
//! project so polling agents see new work appear while they run.

use mockable::Clock;
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::repositories::{CatalogError, TaskCatalog};
use crate::domain::task::Task;

const URGENT_TITLES: [&str; 4] = [
    "Critical bug fix",
    "Security patch",
    "Production issue",
    "Integration failure",
];
const URGENT_DESCRIPTION: &str = "High priority task requiring immediate attention";
const URGENT_LABELS: [&str; 3] = ["bzzz-task", "urgent", "critical"];
const MAX_NUMBER_ATTEMPTS: usize = 5;

/// Configuration for the task generator
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub enabled: bool,

    /// Shortest pause between cycles
    pub min_interval: Duration,

    /// Longest pause between cycles
    pub max_interval: Duration,

    /// Chance that a cycle injects a task, in `[0, 1]`
    pub probability: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval: Duration::from_secs(60),
            max_interval: Duration::from_secs(180),
            probability: 0.3,
        }
    }
}

/// Source of the generator's random choices
pub trait TaskEntropy: Send + Sync {
    /// Pause before the next cycle, within `[min, max]`
    fn next_interval(&self, min: Duration, max: Duration) -> Duration;

    fn should_inject(&self, probability: f64) -> bool;

    /// Index into a non-empty collection of `len` items
    fn pick_index(&self, len: usize) -> usize;

    /// Candidate number for a new task, in `100..=999`
    fn task_number(&self) -> u64;
}

/// Entropy backed by the thread-local `rand` generator
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomEntropy;

impl TaskEntropy for RandomEntropy {
    fn next_interval(&self, min: Duration, max: Duration) -> Duration {
        if max <= min {
            return min;
        }
        let millis = rand::rng().random_range(min.as_millis()..=max.as_millis());
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    fn should_inject(&self, probability: f64) -> bool {
        rand::rng().random_bool(probability.clamp(0.0, 1.0))
    }

    fn pick_index(&self, len: usize) -> usize {
        rand::rng().random_range(0..len.max(1))
    }

    fn task_number(&self) -> u64 {
        rand::rng().random_range(100..=999)
    }
}

/// Periodically appends urgent tasks to the catalog
///
/// Never touches claims; agents discover the new work on their next poll.
pub struct TaskGenerator {
    catalog: Arc<dyn TaskCatalog>,
    clock: Arc<dyn Clock + Send + Sync>,
    entropy: Arc<dyn TaskEntropy>,
    config: GeneratorConfig,
    shutdown_token: CancellationToken,
}

impl TaskGenerator {
    pub fn new(
        catalog: Arc<dyn TaskCatalog>,
        clock: Arc<dyn Clock + Send + Sync>,
        entropy: Arc<dyn TaskEntropy>,
        config: GeneratorConfig,
    ) -> Self {
        Self {
            catalog,
            clock,
            entropy,
            config,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// Get a handle to trigger shutdown
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Start the generator background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }

    async fn run(&self) {
        if !self.config.enabled {
            info!("Task generator is disabled");
            return;
        }

        info!(
            min_interval_secs = self.config.min_interval.as_secs(),
            max_interval_secs = self.config.max_interval.as_secs(),
            probability = self.config.probability,
            "Starting task generator"
        );

        loop {
            let pause = self
                .entropy
                .next_interval(self.config.min_interval, self.config.max_interval);

            tokio::select! {
                _ = tokio::time::sleep(pause) => {
                    self.run_cycle().await;
                }
                _ = self.shutdown_token.cancelled() => {
                    info!("Shutdown signal received, stopping task generator");
                    break;
                }
            }
        }

        info!("Task generator stopped");
    }

    /// Execute a single generation cycle
    ///
    /// # Returns
    /// * `Some(Task)` - The task that was appended
    /// * `None` - Nothing was injected this cycle
    pub async fn run_cycle(&self) -> Option<Task> {
        if !self.entropy.should_inject(self.config.probability) {
            debug!("Generator cycle skipped");
            return None;
        }

        let projects = self.catalog.list_projects().await;
        if projects.is_empty() {
            debug!("No projects to add tasks to");
            return None;
        }
        let project = &projects[self.entropy.pick_index(projects.len()) % projects.len()];
        let kind =
            URGENT_TITLES[self.entropy.pick_index(URGENT_TITLES.len()) % URGENT_TITLES.len()];

        for attempt in 1..=MAX_NUMBER_ATTEMPTS {
            let number = self.entropy.task_number();
            let title = format!("URGENT: {}", kind);
            let task = match Task::new(project.id, number, title, self.clock.utc()) {
                Ok(task) => task
                    .with_description(URGENT_DESCRIPTION)
                    .with_labels(URGENT_LABELS)
                    .with_task_type("bug")
                    .with_html_url(format!("{}/issues/{}", project.git_url, number)),
                Err(error) => {
                    warn!(project_id = project.id, number, %error, "Generated task rejected");
                    return None;
                }
            };

            match self.catalog.append_task(task.clone()).await {
                Ok(()) => {
                    info!(
                        project = %project.name,
                        task = %task.key(),
                        title = task.title(),
                        "Generated urgent task"
                    );
                    return Some(task);
                }
                Err(CatalogError::DuplicateTask(key)) => {
                    debug!(task = %key, attempt, "Task number taken, retrying");
                }
                Err(error) => {
                    warn!(project_id = project.id, %error, "Failed to append generated task");
                    return None;
                }
            }
        }

        warn!(
            project_id = project.id,
            attempts = MAX_NUMBER_ATTEMPTS,
            "Gave up finding a free task number"
        );
        None
    }
}
