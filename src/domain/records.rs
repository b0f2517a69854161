use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use super::errors::{DomainError, FieldError};
use super::order::{line_amount, Order, OrderItem};
use super::product::{into_result, Product};

/// Point-in-time sale audit entry. Outlives the order it came from.
#[derive(Debug, Clone)]
pub struct SaleRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub order_id: Option<Uuid>,
    pub customer: Option<String>,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub sale_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewSaleRecord {
    pub product_id: Uuid,
    pub order_id: Option<Uuid>,
    pub quantity: i32,
    pub price: BigDecimal,
    pub total: BigDecimal,
    pub sale_date: NaiveDate,
}

/// Flat export row with no foreign keys.
#[derive(Debug, Clone)]
pub struct CombinedRecord {
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

#[derive(Debug, Clone, PartialEq)]
pub struct NewCombinedRecord {
    pub order_ref: String,
    pub customer: String,
    pub customer_address: String,
    pub product_name: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub total: BigDecimal,
}

/// A sale recorded directly against a product, outside any order.
#[derive(Debug, Clone)]
pub struct ManualSale {
    pub product_id: Uuid,
    pub quantity: i32,
    pub price: Option<BigDecimal>,
    pub sale_date: Option<NaiveDate>,
}

impl ManualSale {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if self.quantity <= 0 {
            errors.push(FieldError::new("quantity", "Quantity must be a positive integer."));
        }
        if let Some(price) = &self.price {
            if price < &BigDecimal::from(0) {
                errors.push(FieldError::new("price", "Price cannot be negative."));
            }
        }
        into_result(errors)
    }

    pub fn into_record(self, product_price: &BigDecimal, today: NaiveDate) -> NewSaleRecord {
        let price = self.price.unwrap_or_else(|| product_price.clone());
        NewSaleRecord {
            product_id: self.product_id,
            order_id: None,
            quantity: self.quantity,
            total: line_amount(self.quantity, &price),
            price,
            sale_date: self.sale_date.unwrap_or(today),
        }
    }
}

pub fn project_sale(order: &Order, item: &OrderItem) -> NewSaleRecord {
    NewSaleRecord {
        product_id: item.product_id,
        order_id: Some(order.id),
        quantity: item.quantity,
        price: item.rate.clone(),
        total: item.amount.clone(),
        sale_date: order.created_at.date_naive(),
    }
}

/// Flattens one order line for export. `product_name` is the catalog name,
/// not the line's free-text particulars.
pub fn project_combined(order: &Order, item: &OrderItem, product: &Product) -> NewCombinedRecord {
    NewCombinedRecord {
        order_ref: order.reference(),
        customer: order.customer.clone(),
        customer_address: order.customer_address.clone(),
        product_name: product.name.clone(),
        quantity: item.quantity,
        rate: item.rate.clone(),
        total: item.amount.clone(),
    }
}
