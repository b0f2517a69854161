use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// A single rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Product {0} not found")]
    ProductNotFound(Uuid),

    #[error("Not enough stock for {product}. Available: {available}, Required: {requested}")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Invalid input")]
    Validation(Vec<FieldError>),

    #[error("{0}")]
    Conflict(String),

    #[error("Product is referenced by existing order items or sale records")]
    ProductInUse,

    #[error("Order is already completed")]
    AlreadyCompleted,

    #[error("Items of a completed order cannot be changed")]
    OrderLocked,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        DomainError::Validation(vec![FieldError::new(field, message)])
    }
}
