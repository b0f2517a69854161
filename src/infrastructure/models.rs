use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem};
use crate::domain::product::Product;
use crate::domain::records::CombinedRecord;
use crate::domain::user::User;
use crate::schema::{combined_records, order_items, orders, products, sale_records, users};

// ── Products ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub description: String,
    pub image: String,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            stock: row.stock,
            description: row.description,
            image: row.image,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub customer: String,
    pub customer_address: String,
    pub status: String,
    pub total: BigDecimal,
    pub date_np: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub customer: String,
    pub customer_address: String,
    pub status: String,
    pub total: BigDecimal,
    pub date_np: Option<String>,
}

#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset {
    pub order_id: Option<Option<String>>,
    pub customer: Option<String>,
    pub customer_address: Option<String>,
    pub date_np: Option<Option<String>>,
    pub updated_at: DateTime<Utc>,
}

impl OrderRow {
    pub fn into_order(self, items: Vec<OrderItemRow>) -> Result<Order, DomainError> {
        let status = self.status.parse().map_err(|_| {
            DomainError::Internal(format!("order {} has unknown status '{}'", self.id, self.status))
        })?;
        Ok(Order {
            id: self.id,
            order_id: self.order_id,
            customer: self.customer,
            customer_address: self.customer_address,
            status,
            total: self.total,
            date_np: self.date_np,
            created_at: self.created_at,
            items: items.into_iter().map(OrderItem::from).collect(),
        })
    }
}

#[derive(
    Debug, Clone, Queryable, Selectable, Identifiable, Associations,
)]
#[diesel(table_name = order_items)]
#[diesel(belongs_to(OrderRow, foreign_key = order_id))]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub line_no: i32,
    pub particulars: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = order_items)]
pub struct NewOrderItemRow {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub line_no: i32,
    pub particulars: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: row.id,
            order_id: row.order_id,
            product_id: row.product_id,
            particulars: row.particulars,
            quantity: row.quantity,
            rate: row.rate,
            amount: row.amount,
        }
    }
}

// ── Derived records ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = sale_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SaleRecordRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub sale_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = sale_records)]
pub struct NewSaleRecordRow {
    pub id: Uuid,
    pub product_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub sale_date: NaiveDate,
}

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = combined_records)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CombinedRecordRow {
    pub id: Uuid,
    pub order_ref: String,
    pub customer: String,
    pub customer_address: String,
    pub product_name: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub total: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = combined_records)]
pub struct NewCombinedRecordRow {
    pub id: Uuid,
    pub order_ref: String,
    pub customer: String,
    pub customer_address: String,
    pub product_name: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub total: BigDecimal,
}

impl From<CombinedRecordRow> for CombinedRecord {
    fn from(row: CombinedRecordRow) -> Self {
        CombinedRecord {
            id: row.id,
            order_ref: row.order_ref,
            customer: row.customer,
            customer_address: row.customer_address,
            product_name: row.product_name,
            quantity: row.quantity,
            rate: row.rate,
            total: row.total,
            created_at: row.created_at,
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Queryable, Selectable, Identifiable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}
