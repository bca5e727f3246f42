use thiserror::Error;

/// Violations of domain value invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Task number must be non-zero")]
    ZeroTaskNumber,

    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Project name cannot be empty")]
    EmptyProjectName,

    #[error("Claim TTL must be positive")]
    NonPositiveTtl,
}
