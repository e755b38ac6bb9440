use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("This supplier has {count} product(s). Please delete all products first.")]
    SupplierHasProducts { count: u64 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type InventoryResult<T> = Result<T, InventoryError>;

impl InventoryError {
    pub fn supplier_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Supplier",
            id: id.to_string(),
        }
    }

    pub fn product_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            entity: "Product",
            id: id.to_string(),
        }
    }
}

impl From<mongodb::error::Error> for InventoryError {
    fn from(err: mongodb::error::Error) -> Self {
        InventoryError::Database(err.to_string())
    }
}

impl From<handlebars::RenderError> for InventoryError {
    fn from(err: handlebars::RenderError) -> Self {
        InventoryError::Internal(format!("Template rendering failed: {}", err))
    }
}

/// Outcome of a failed use case as seen by the presentation layer.
///
/// Every [`InventoryError`] collapses into exactly one of these; store and
/// template failures all become `InternalError`.
#[derive(Debug, Error)]
pub enum UseCaseError {
    #[error("Validation failed")]
    ValidationFailed(ValidationErrors),

    #[error("Not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type UseCaseResult<T> = Result<T, UseCaseError>;

impl From<InventoryError> for UseCaseError {
    fn from(err: InventoryError) -> Self {
        match err {
            InventoryError::Validation(errors) => UseCaseError::ValidationFailed(errors),
            InventoryError::NotFound { .. } => UseCaseError::NotFound,
            conflict @ InventoryError::SupplierHasProducts { .. } => {
                UseCaseError::Conflict(conflict.to_string())
            }
            InventoryError::Database(detail) | InventoryError::Internal(detail) => {
                tracing::error!(%detail, "Use case failed");
                UseCaseError::InternalError(detail)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_message_carries_count() {
        let err: UseCaseError = InventoryError::SupplierHasProducts { count: 3 }.into();
        match err {
            UseCaseError::Conflict(message) => {
                assert_eq!(
                    message,
                    "This supplier has 3 product(s). Please delete all products first."
                );
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_store_failures_become_internal_errors() {
        let err: UseCaseError = InventoryError::Database("connection reset".to_string()).into();
        assert!(matches!(err, UseCaseError::InternalError(ref d) if d == "connection reset"));

        let err: UseCaseError = InventoryError::supplier_not_found("abc").into();
        assert!(matches!(err, UseCaseError::NotFound));
    }
}
