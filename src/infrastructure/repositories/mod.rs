// Repository implementations (data access layer)
// Adapters that implement domain repository interfaces

pub mod in_memory_claim_registry;
pub mod in_memory_task_catalog;

pub use in_memory_claim_registry::InMemoryClaimRegistry;
pub use in_memory_task_catalog::InMemoryTaskCatalog;
