//! Pure planning half of the fulfillment transaction.
//!
//! The repository loads and row-locks every referenced product, then hands
//! them here. Nothing in this module touches the database, so a rejected plan
//! means no write has happened yet.

use std::collections::HashMap;

use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::errors::DomainError;
use super::order::{line_amount, NewOrderItem};
use super::product::Product;

/// One order line with its snapshot fields resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedLine {
    pub product_id: Uuid,
    pub particulars: String,
    pub quantity: i32,
    pub rate: BigDecimal,
    pub amount: BigDecimal,
}

/// Fails with `ProductNotFound` for the first requested id missing from
/// `products`.
pub fn ensure_products_exist<'a>(
    product_ids: impl IntoIterator<Item = &'a Uuid>,
    products: &HashMap<Uuid, Product>,
) -> Result<(), DomainError> {
    for id in product_ids {
        if !products.contains_key(id) {
            return Err(DomainError::ProductNotFound(*id));
        }
    }
    Ok(())
}

/// Checks the accumulated demand per product against current stock.
///
/// A product listed twice is checked against the sum of both quantities, so
/// every later reservation in the same transaction is guaranteed to succeed.
pub fn check_stock(
    demand: impl IntoIterator<Item = (Uuid, i32)>,
    products: &HashMap<Uuid, Product>,
) -> Result<(), DomainError> {
    let mut wanted: Vec<(Uuid, i64)> = Vec::new();
    for (product_id, quantity) in demand {
        match wanted.iter_mut().find(|(id, _)| *id == product_id) {
            Some((_, total)) => *total += i64::from(quantity),
            None => wanted.push((product_id, i64::from(quantity))),
        }
    }

    for (product_id, requested) in wanted {
        let product = products
            .get(&product_id)
            .ok_or(DomainError::ProductNotFound(product_id))?;
        if i64::from(product.stock) < requested {
            return Err(DomainError::InsufficientStock {
                product: product.name.clone(),
                available: product.stock,
                requested: i32::try_from(requested).unwrap_or(i32::MAX),
            });
        }
    }
    Ok(())
}

/// Resolves the effective rate and particulars of one requested item.
pub fn plan_line(item: &NewOrderItem, product: &Product) -> PlannedLine {
    let rate = item.rate.clone().unwrap_or_else(|| product.price.clone());
    let particulars = item
        .particulars
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(&product.name)
        .to_string();
    PlannedLine {
        product_id: product.id,
        amount: line_amount(item.quantity, &rate),
        particulars,
        quantity: item.quantity,
        rate,
    }
}

/// Validates a whole order before any write: every product must exist and
/// the whole list must fit in stock. Lines come back in caller order.
pub fn plan_fulfillment(
    items: &[NewOrderItem],
    products: &HashMap<Uuid, Product>,
) -> Result<Vec<PlannedLine>, DomainError> {
    ensure_products_exist(items.iter().map(|i| &i.product_id), products)?;
    check_stock(items.iter().map(|i| (i.product_id, i.quantity)), products)?;
    Ok(items
        .iter()
        .map(|item| plan_line(item, &products[&item.product_id]))
        .collect())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Utc;

    use super::*;

    fn product(name: &str, price: &str, stock: i32) -> Product {
        Product {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            stock,
            description: String::new(),
            image: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog(products: &[Product]) -> HashMap<Uuid, Product> {
        products.iter().map(|p| (p.id, p.clone())).collect()
    }

    fn request(product: &Product, quantity: i32) -> NewOrderItem {
        NewOrderItem {
            product_id: product.id,
            quantity,
            rate: None,
            particulars: None,
        }
    }

    #[test]
    fn plan_uses_product_price_and_name_by_default() {
        let widget = product("Widget", "5.0", 10);
        let lines = plan_fulfillment(&[request(&widget, 4)], &catalog(&[widget.clone()])).unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].particulars, "Widget");
        assert_eq!(lines[0].rate, BigDecimal::from_str("5.0").unwrap());
        assert_eq!(lines[0].amount, BigDecimal::from(20));
    }

    #[test]
    fn explicit_rate_and_particulars_override_the_snapshot() {
        let widget = product("Widget", "5.0", 10);
        let mut item = request(&widget, 2);
        item.rate = Some(BigDecimal::from_str("4.25").unwrap());
        item.particulars = Some("Widget (blue)".to_string());
        let lines = plan_fulfillment(&[item], &catalog(&[widget.clone()])).unwrap();
        assert_eq!(lines[0].particulars, "Widget (blue)");
        assert_eq!(lines[0].amount, BigDecimal::from_str("8.50").unwrap());
    }

    #[test]
    fn blank_particulars_fall_back_to_product_name() {
        let widget = product("Widget", "1", 1);
        let mut item = request(&widget, 1);
        item.particulars = Some("  ".to_string());
        assert_eq!(plan_line(&item, &widget).particulars, "Widget");
    }

    #[test]
    fn shortfall_on_any_item_rejects_the_whole_plan() {
        let widget = product("Widget", "5.0", 6);
        let gadget = product("Gadget", "2.0", 100);
        let err = plan_fulfillment(
            &[request(&gadget, 1), request(&widget, 10)],
            &catalog(&[widget.clone(), gadget.clone()]),
        )
        .unwrap_err();
        match err {
            DomainError::InsufficientStock {
                product,
                available,
                requested,
            } => {
                assert_eq!(product, "Widget");
                assert_eq!(available, 6);
                assert_eq!(requested, 10);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn repeated_product_is_checked_against_combined_quantity() {
        let widget = product("Widget", "5.0", 5);
        let products = catalog(&[widget.clone()]);
        let err = plan_fulfillment(&[request(&widget, 3), request(&widget, 3)], &products)
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                available: 5,
                requested: 6,
                ..
            }
        ));
        assert!(plan_fulfillment(&[request(&widget, 2), request(&widget, 3)], &products).is_ok());
    }

    #[test]
    fn missing_product_is_reported_before_stock() {
        let widget = product("Widget", "5.0", 0);
        let ghost = product("Ghost", "1.0", 0);
        let err = plan_fulfillment(
            &[request(&widget, 1), request(&ghost, 1)],
            &catalog(&[widget.clone()]),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::ProductNotFound(id) if id == ghost.id));
    }

    #[test]
    fn exact_stock_is_enough() {
        let widget = product("Widget", "5.0", 4);
        assert!(check_stock([(widget.id, 4)], &catalog(&[widget.clone()])).is_ok());
    }
}
