use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: Uuid },

    #[error("invalid {entity}: {reason}")]
    Invalid {
        entity: &'static str,
        reason: String,
    },

    #[error("only {available} of item {item_id} remaining, {requested} requested")]
    InsufficientStock {
        item_id: Uuid,
        requested: i64,
        available: i64,
    },

    #[error("count incomplete: {remaining} items still uncounted")]
    IncompleteCount { remaining: usize },

    #[error("storage failure: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl InventoryError {
    pub fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    pub fn invalid(entity: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            entity,
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
