//! Inventory ledger: the only code that writes `products.stock` after
//! creation.

use std::collections::HashMap;

use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::product::Product;
use crate::schema::products;

use super::models::ProductRow;

/// Loads the given products with `FOR UPDATE`, in id order so concurrent
/// transactions always lock in the same sequence. Missing ids are simply
/// absent from the map.
pub fn lock_products(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Product>, DomainError> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();

    let rows = products::table
        .filter(products::id.eq_any(&ids))
        .select(ProductRow::as_select())
        .order(products::id.asc())
        .for_update()
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Product::from(row)))
        .collect())
}

/// Loads the given products with `FOR KEY SHARE`, for paths that reference
/// them without touching stock. The rows cannot be deleted until the
/// transaction ends, but stock updates are not blocked.
pub fn share_products(
    conn: &mut PgConnection,
    ids: &[Uuid],
) -> Result<HashMap<Uuid, Product>, DomainError> {
    let mut ids = ids.to_vec();
    ids.sort();
    ids.dedup();

    let rows = products::table
        .filter(products::id.eq_any(&ids))
        .select(ProductRow::as_select())
        .order(products::id.asc())
        .for_key_share()
        .load(conn)?;

    Ok(rows
        .into_iter()
        .map(|row| (row.id, Product::from(row)))
        .collect())
}

/// Decrements stock by `quantity` unless that would drive it below zero.
///
/// The check and the write are one `UPDATE ... WHERE stock >= quantity`, so a
/// concurrent reservation can never slip in between them.
pub fn reserve(conn: &mut PgConnection, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
    let updated = diesel::update(
        products::table
            .filter(products::id.eq(product_id))
            .filter(products::stock.ge(quantity)),
    )
    .set((
        products::stock.eq(products::stock - quantity),
        products::updated_at.eq(Utc::now()),
    ))
    .execute(conn)?;

    if updated == 1 {
        return Ok(());
    }

    let current = products::table
        .find(product_id)
        .select((products::name, products::stock))
        .first::<(String, i32)>(conn)
        .optional()?;

    match current {
        None => Err(DomainError::ProductNotFound(product_id)),
        Some((name, stock)) => Err(DomainError::InsufficientStock {
            product: name,
            available: stock,
            requested: quantity,
        }),
    }
}

/// Increments stock by `quantity`. No upper bound.
pub fn release(conn: &mut PgConnection, product_id: Uuid, quantity: i32) -> Result<(), DomainError> {
    let updated = diesel::update(products::table.find(product_id))
        .set((
            products::stock.eq(products::stock + quantity),
            products::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;

    if updated == 0 {
        return Err(DomainError::ProductNotFound(product_id));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::infrastructure::models::NewProductRow;
    use crate::test_support::setup_db;

    fn insert_product(conn: &mut PgConnection, name: &str, stock: i32) -> Uuid {
        let id = Uuid::new_v4();
        diesel::insert_into(products::table)
            .values(&NewProductRow {
                id,
                name: name.to_string(),
                price: BigDecimal::from_str("5.0").unwrap(),
                stock,
                description: String::new(),
                image: String::new(),
            })
            .execute(conn)
            .expect("insert product");
        id
    }

    fn stock_of(conn: &mut PgConnection, id: Uuid) -> i32 {
        products::table
            .find(id)
            .select(products::stock)
            .first(conn)
            .expect("stock query")
    }

    #[tokio::test]
    async fn reserve_decrements_and_refuses_to_go_negative() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let id = insert_product(&mut conn, "Widget", 5);

        reserve(&mut conn, id, 3).expect("first reservation fits");
        assert_eq!(stock_of(&mut conn, id), 2);

        let err = reserve(&mut conn, id, 3).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));
        assert_eq!(stock_of(&mut conn, id), 2);
    }

    #[tokio::test]
    async fn release_has_no_upper_bound() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let id = insert_product(&mut conn, "Widget", 1);

        release(&mut conn, id, 100).expect("release");
        assert_eq!(stock_of(&mut conn, id), 101);
    }

    #[tokio::test]
    async fn unknown_product_is_reported() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let ghost = Uuid::new_v4();

        assert!(matches!(
            reserve(&mut conn, ghost, 1),
            Err(DomainError::ProductNotFound(id)) if id == ghost
        ));
        assert!(matches!(
            release(&mut conn, ghost, 1),
            Err(DomainError::ProductNotFound(_))
        ));
    }

    #[tokio::test]
    async fn lock_products_skips_missing_ids() {
        let (_container, pool) = setup_db().await;
        let mut conn = pool.get().expect("connection");
        let id = insert_product(&mut conn, "Widget", 1);

        let found = conn
            .transaction::<_, DomainError, _>(|conn| lock_products(conn, &[id, Uuid::new_v4(), id]))
            .expect("lock");
        assert_eq!(found.len(), 1);
        assert_eq!(found[&id].name, "Widget");
    }
}
