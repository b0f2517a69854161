use std::fmt;
use std::str::FromStr;

use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{DomainError, FieldError};
use super::product::into_result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pending,
    Completed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(OrderStatus::Pending),
            "Completed" => Ok(OrderStatus::Completed),
            other => Err(DomainError::invalid(
                "status",
                format!("\"{other}\" is not a valid choice."),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: Uuid,
    pub order_id: Uuid,
    pub product_id: Uuid,
    pub particulars: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

/// The order aggregate: header plus its items.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub customer: String,
    pub customer_address: String,
    pub status: OrderStatus,
    pub total: BigDecimal,
    pub date_np: Option<String>,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Text identifying the order in exports: the external id when assigned.
    pub fn reference(&self) -> String {
        self.order_id.clone().unwrap_or_else(|| self.id.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Falls back to the product's current price.
    pub rate: Option<BigDecimal>,
    /// Falls back to the product's name.
    pub particulars: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: Option<String>,
    pub customer: String,
    pub customer_address: String,
    pub date_np: Option<String>,
    /// `Pending` defers stock reservation until the order is completed.
    pub status: OrderStatus,
    pub items: Vec<NewOrderItem>,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        check_customer(&self.customer, &mut errors);
        check_date_np(self.date_np.as_deref(), &mut errors);
        if let Some(order_id) = &self.order_id {
            if order_id.trim().is_empty() {
                errors.push(FieldError::new("order_id", "This field may not be blank."));
            } else if order_id.chars().count() > 100 {
                errors.push(FieldError::new(
                    "order_id",
                    "Ensure this field has no more than 100 characters.",
                ));
            }
        }
        if self.items.is_empty() {
            errors.push(FieldError::new("items", "An order needs at least one item."));
        }
        for (i, item) in self.items.iter().enumerate() {
            item.check(&format!("items[{i}]"), &mut errors);
        }
        into_result(errors)
    }
}

impl NewOrderItem {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        self.check("item", &mut errors);
        into_result(errors)
    }

    fn check(&self, prefix: &str, errors: &mut Vec<FieldError>) {
        check_quantity(self.quantity, &format!("{prefix}.quantity"), errors);
        if let Some(rate) = &self.rate {
            check_rate(rate, &format!("{prefix}.rate"), errors);
        }
        if let Some(particulars) = &self.particulars {
            check_particulars(particulars, &format!("{prefix}.particulars"), errors);
        }
    }
}

/// Header fields that may change after creation. Status is not among them.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub order_id: Option<Option<String>>,
    pub customer: Option<String>,
    pub customer_address: Option<String>,
    pub date_np: Option<Option<String>>,
}

impl OrderChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if let Some(customer) = &self.customer {
            check_customer(customer, &mut errors);
        }
        if let Some(date_np) = &self.date_np {
            check_date_np(date_np.as_deref(), &mut errors);
        }
        if let Some(Some(order_id)) = &self.order_id {
            if order_id.trim().is_empty() {
                errors.push(FieldError::new("order_id", "This field may not be blank."));
            }
        }
        into_result(errors)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ItemChanges {
    pub quantity: Option<i32>,
    pub rate: Option<BigDecimal>,
    pub particulars: Option<String>,
}

impl ItemChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if let Some(quantity) = self.quantity {
            check_quantity(quantity, "quantity", &mut errors);
        }
        if let Some(rate) = &self.rate {
            check_rate(rate, "rate", &mut errors);
        }
        if let Some(particulars) = &self.particulars {
            check_particulars(particulars, "particulars", &mut errors);
        }
        into_result(errors)
    }
}

#[derive(Debug, Clone)]
pub struct OrderFilter {
    pub page: i64,
    pub limit: i64,
    pub start: Option<DateTime<Utc>>,
    /// Exclusive.
    pub end: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

#[derive(Debug, Clone)]
pub struct ListResult {
    pub items: Vec<Order>,
    pub total: i64,
}

/// `quantity * rate`, exact.
pub fn line_amount(quantity: i32, rate: &BigDecimal) -> BigDecimal {
    rate * BigDecimal::from(quantity)
}

fn check_quantity(quantity: i32, field: &str, errors: &mut Vec<FieldError>) {
    if quantity <= 0 {
        errors.push(FieldError::new(field, "Quantity must be a positive integer."));
    }
}

fn check_rate(rate: &BigDecimal, field: &str, errors: &mut Vec<FieldError>) {
    if rate < &BigDecimal::zero() {
        errors.push(FieldError::new(field, "Rate cannot be negative."));
    }
}

fn check_customer(customer: &str, errors: &mut Vec<FieldError>) {
    let trimmed = customer.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("customer", "This field may not be blank."));
    } else if trimmed.chars().count() > 200 {
        errors.push(FieldError::new(
            "customer",
            "Ensure this field has no more than 200 characters.",
        ));
    }
}

fn check_date_np(date_np: Option<&str>, errors: &mut Vec<FieldError>) {
    if date_np.is_some_and(|d| d.chars().count() > 50) {
        errors.push(FieldError::new(
            "date_np",
            "Ensure this field has no more than 50 characters.",
        ));
    }
}

fn check_particulars(particulars: &str, field: &str, errors: &mut Vec<FieldError>) {
    if particulars.chars().count() > 200 {
        errors.push(FieldError::new(
            field,
            "Ensure this field has no more than 200 characters.",
        ));
    }
}
