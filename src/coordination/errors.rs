use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::claim::LeaseError;

/// Errors that can occur while coordinating task claims
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Task already claimed")]
    AlreadyClaimed {
        holder: String,
        claimed_at: DateTime<Utc>,
    },

    #[error("Task is not claimed")]
    NotClaimed,

    #[error("Task is claimed by {holder}")]
    NotLeaseHolder { holder: String },
}

impl From<LeaseError> for CoordinationError {
    fn from(error: LeaseError) -> Self {
        match error {
            LeaseError::Conflict { holder, claimed_at } => {
                CoordinationError::AlreadyClaimed { holder, claimed_at }
            }
            LeaseError::NotClaimed => CoordinationError::NotClaimed,
            LeaseError::NotHolder { holder } => CoordinationError::NotLeaseHolder { holder },
        }
    }
}

pub type CoordinationResult<T> = Result<T, CoordinationError>;
