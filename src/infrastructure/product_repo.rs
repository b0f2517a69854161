use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::schema::products;

use super::models::{NewProductRow, ProductChangeset, ProductRow};

pub struct DieselProductRepository {
    pool: DbPool,
}

impl DieselProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl ProductRepository for DieselProductRepository {
    fn list(&self) -> Result<Vec<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = products::table
            .select(ProductRow::as_select())
            .order(products::name.asc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = products::table
            .find(id)
            .select(ProductRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(Product::from))
    }

    fn create(&self, product: NewProduct) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(products::table)
            .values(&NewProductRow {
                id: Uuid::new_v4(),
                name: product.name.trim().to_string(),
                price: product.price,
                stock: product.stock,
                description: product.description,
                image: product.image,
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn update(&self, id: Uuid, changes: ProductChanges) -> Result<Product, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::update(products::table.find(id))
            .set(&ProductChangeset {
                name: changes.name.map(|n| n.trim().to_string()),
                price: changes.price,
                stock: changes.stock,
                description: changes.description,
                image: changes.image,
                updated_at: Utc::now(),
            })
            .returning(ProductRow::as_returning())
            .get_result(&mut conn)
            .optional()?;
        row.map(Product::from).ok_or(DomainError::NotFound("Product"))
    }

    /// Refused with `ProductInUse` while order items or sale records point at
    /// the product.
    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(products::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Product"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::domain::order::{NewOrder, NewOrderItem, OrderStatus};
    use crate::domain::ports::OrderRepository;
    use crate::infrastructure::DieselOrderRepository;
    use crate::test_support::setup_db;

    fn widget(name: &str) -> NewProduct {
        NewProduct {
            name: name.to_string(),
            price: BigDecimal::from_str("5.0").unwrap(),
            stock: 10,
            description: "A widget".to_string(),
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn create_update_and_list() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let created = repo.create(widget("Widget")).expect("create failed");
        repo.create(widget("Anvil")).expect("create failed");

        let updated = repo
            .update(
                created.id,
                ProductChanges {
                    stock: Some(3),
                    ..Default::default()
                },
            )
            .expect("update failed");
        assert_eq!(updated.stock, 3);
        assert_eq!(updated.name, "Widget");

        let names: Vec<String> = repo
            .list()
            .expect("list failed")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Anvil", "Widget"]);
    }

    #[tokio::test]
    async fn duplicate_name_is_a_conflict() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        repo.create(widget("Widget")).expect("create failed");
        let err = repo.create(widget("Widget")).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[tokio::test]
    async fn update_and_delete_unknown_product_are_not_found() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        assert!(matches!(
            repo.update(Uuid::new_v4(), ProductChanges::default()),
            Err(DomainError::NotFound("Product"))
        ));
        assert!(matches!(
            repo.delete(Uuid::new_v4()),
            Err(DomainError::NotFound("Product"))
        ));
    }

    #[tokio::test]
    async fn referenced_product_cannot_be_deleted() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool.clone());
        let orders = DieselOrderRepository::new(pool);

        let product = repo.create(widget("Widget")).expect("create failed");
        orders
            .fulfill(NewOrder {
                order_id: None,
                customer: "Ram".to_string(),
                customer_address: String::new(),
                date_np: None,
                status: OrderStatus::Completed,
                items: vec![NewOrderItem {
                    product_id: product.id,
                    quantity: 1,
                    rate: None,
                    particulars: None,
                }],
            })
            .expect("fulfill failed");

        assert!(matches!(
            repo.delete(product.id),
            Err(DomainError::ProductInUse)
        ));
        assert!(repo.find_by_id(product.id).expect("find failed").is_some());
    }

    #[tokio::test]
    async fn unreferenced_product_is_deleted() {
        let (_container, pool) = setup_db().await;
        let repo = DieselProductRepository::new(pool);

        let product = repo.create(widget("Widget")).expect("create failed");
        repo.delete(product.id).expect("delete failed");
        assert!(repo.find_by_id(product.id).expect("find failed").is_none());
    }
}
