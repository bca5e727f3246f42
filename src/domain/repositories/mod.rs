// Repository traits (ports)
// Infrastructure provides the adapters

pub mod activity_sink;
pub mod claim_registry;
pub mod task_catalog;

pub use activity_sink::{ActivitySink, SinkError};
pub use claim_registry::ClaimRegistry;
pub use task_catalog::{CatalogError, TaskCatalog};
