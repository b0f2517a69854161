pub mod ledger;
pub mod models;
pub mod order_repo;
pub mod product_repo;
pub mod projector;
pub mod record_repo;
pub mod user_repo;

use diesel::result::{DatabaseErrorKind, Error as DieselError};

use crate::domain::errors::DomainError;

pub use order_repo::DieselOrderRepository;
pub use product_repo::DieselProductRepository;
pub use record_repo::DieselRecordRepository;
pub use user_repo::DieselUserRepository;

// ── Error conversions (infrastructure concern only) ──────────────────────────

impl From<DieselError> for DomainError {
    fn from(e: DieselError) -> Self {
        match e {
            DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                DomainError::Conflict(unique_violation_message(info.constraint_name()))
            }
            DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, _) => {
                DomainError::ProductInUse
            }
            DieselError::DatabaseError(DatabaseErrorKind::CheckViolation, info) => {
                check_violation_error(info.constraint_name())
            }
            other => DomainError::Internal(other.to_string()),
        }
    }
}

impl From<r2d2::Error> for DomainError {
    fn from(e: r2d2::Error) -> Self {
        DomainError::Internal(e.to_string())
    }
}

fn unique_violation_message(constraint: Option<&str>) -> String {
    match constraint {
        Some("products_name_key") => "product with this name already exists.".to_string(),
        Some("orders_order_id_key") => "order with this order id already exists.".to_string(),
        Some("users_username_key") => "user with this username already exists.".to_string(),
        Some(other) => format!("duplicate value violates {other}"),
        None => "duplicate value".to_string(),
    }
}

fn check_violation_error(constraint: Option<&str>) -> DomainError {
    match constraint {
        Some("products_stock_check") => DomainError::invalid("stock", "Stock cannot be negative."),
        Some("products_price_check") => DomainError::invalid("price", "Price cannot be negative."),
        Some("order_items_quantity_check") | Some("sale_records_quantity_check") => {
            DomainError::invalid("quantity", "Quantity must be a positive integer.")
        }
        Some("order_items_rate_check") => DomainError::invalid("rate", "Rate cannot be negative."),
        Some(other) => DomainError::invalid("non_field_errors", format!("violates {other}")),
        None => DomainError::invalid("non_field_errors", "check constraint violated"),
    }
}
