use bigdecimal::{BigDecimal, Zero};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::{DomainError, FieldError};

#[derive(Debug, Clone)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub description: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: BigDecimal,
    pub stock: i32,
    pub description: String,
    pub image: String,
}

/// Partial update; `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct ProductChanges {
    pub name: Option<String>,
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl NewProduct {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        check_name(&self.name, &mut errors);
        check_price(&self.price, &mut errors);
        check_stock(self.stock, &mut errors);
        into_result(errors)
    }
}

impl ProductChanges {
    pub fn validate(&self) -> Result<(), DomainError> {
        let mut errors = Vec::new();
        if let Some(name) = &self.name {
            check_name(name, &mut errors);
        }
        if let Some(price) = &self.price {
            check_price(price, &mut errors);
        }
        if let Some(stock) = self.stock {
            check_stock(stock, &mut errors);
        }
        into_result(errors)
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.description.is_none()
            && self.image.is_none()
    }
}

fn check_name(name: &str, errors: &mut Vec<FieldError>) {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new("name", "This field may not be blank."));
    } else if trimmed.chars().count() > 200 {
        errors.push(FieldError::new(
            "name",
            "Ensure this field has no more than 200 characters.",
        ));
    }
}

fn check_price(price: &BigDecimal, errors: &mut Vec<FieldError>) {
    if price < &BigDecimal::zero() {
        errors.push(FieldError::new("price", "Price cannot be negative."));
    }
}

fn check_stock(stock: i32, errors: &mut Vec<FieldError>) {
    if stock < 0 {
        errors.push(FieldError::new("stock", "Stock cannot be negative."));
    }
}

pub(crate) fn into_result(errors: Vec<FieldError>) -> Result<(), DomainError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn widget() -> NewProduct {
        NewProduct {
            name: "Widget".to_string(),
            price: BigDecimal::from_str("5.0").unwrap(),
            stock: 10,
            description: String::new(),
            image: String::new(),
        }
    }

    #[test]
    fn valid_product_passes() {
        assert!(widget().validate().is_ok());
    }

    #[test]
    fn negative_stock_and_blank_name_are_both_reported() {
        let product = NewProduct {
            name: "   ".to_string(),
            stock: -1,
            ..widget()
        };
        let Err(DomainError::Validation(errors)) = product.validate() else {
            panic!("expected validation failure");
        };
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["name", "stock"]);
    }

    #[test]
    fn negative_price_is_rejected() {
        let product = NewProduct {
            price: BigDecimal::from_str("-0.01").unwrap(),
            ..widget()
        };
        assert!(matches!(product.validate(), Err(DomainError::Validation(_))));
    }

    #[test]
    fn changes_only_check_present_fields() {
        let changes = ProductChanges {
            description: Some(String::new()),
            ..Default::default()
        };
        assert!(changes.validate().is_ok());
        assert!(!changes.is_empty());

        let changes = ProductChanges {
            stock: Some(-3),
            ..Default::default()
        };
        assert!(changes.validate().is_err());
    }
}
