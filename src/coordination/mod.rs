// Coordination layer module
// Claim lifecycle, task views and background task generation on top of the domain ports

pub mod errors;
pub mod generator;
pub mod lifecycle;
pub mod types;
pub mod view;

pub use errors::{CoordinationError, CoordinationResult};
pub use generator::{GeneratorConfig, RandomEntropy, TaskEntropy, TaskGenerator};
pub use lifecycle::LifecycleController;
pub use types::{
    ClaimReceipt, CompletionPolicy, DependencyStatus, DependencyView, LifecycleSettings,
    StatusOutcome, StatusUpdate, TaskView,
};
pub use view::TaskViewBuilder;
