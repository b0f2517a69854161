use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{ItemChanges, ListResult, NewOrder, NewOrderItem, Order, OrderChanges, OrderFilter};
use super::product::{NewProduct, Product, ProductChanges};
use super::records::{CombinedRecord, ManualSale, SaleRecord};
use super::user::User;

pub trait ProductRepository: Send + Sync + 'static {
    fn list(&self) -> Result<Vec<Product>, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError>;
    fn create(&self, product: NewProduct) -> Result<Product, DomainError>;
    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Validates stock for every item, then commits the order, its items,
    /// the stock reservations and the derived records in one transaction.
    fn fulfill(&self, order: NewOrder) -> Result<Order, DomainError>;
    /// Records the order and its items without touching stock.
    fn create_pending(&self, order: NewOrder) -> Result<Order, DomainError>;
    fn complete(&self, id: Uuid) -> Result<Order, DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError>;
    fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError>;
    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Order, DomainError>;
    fn delete(&self, id: Uuid) -> Result<(), DomainError>;
    fn add_item(&self, order_id: Uuid, item: NewOrderItem) -> Result<Order, DomainError>;
    fn update_item(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<Order, DomainError>;
    fn remove_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Order, DomainError>;
}

pub trait RecordRepository: Send + Sync + 'static {
    fn list_sales(&self) -> Result<Vec<SaleRecord>, DomainError>;
    fn find_sale(&self, id: Uuid) -> Result<Option<SaleRecord>, DomainError>;
    fn record_sale(&self, sale: ManualSale) -> Result<SaleRecord, DomainError>;
    /// Restores the sale's quantity to stock and deletes the record.
    fn reverse_sale(&self, id: Uuid) -> Result<(), DomainError>;
    fn list_combined(&self) -> Result<Vec<CombinedRecord>, DomainError>;
}

pub trait UserRepository: Send + Sync + 'static {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError>;
    /// Creates the user, or replaces the password of an existing one.
    fn upsert(&self, username: &str, password_hash: &str) -> Result<User, DomainError>;
    /// Records `jti` as revoked until `expires_at`. Entries past their expiry
    /// are pruned, since the token itself no longer verifies by then.
    fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DomainError>;
    fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DomainError>;
}
