use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::ProductRepository;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::domain::user::Principal;

pub struct ProductService<R> {
    repo: R,
}

impl<R: ProductRepository> ProductService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list(&self) -> Result<Vec<Product>, DomainError> {
        self.repo.list()
    }

    pub fn get(&self, id: Uuid) -> Result<Product, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Product"))
    }

    pub fn create(&self, principal: &Principal, product: NewProduct) -> Result<Product, DomainError> {
        product.validate()?;
        let product = self.repo.create(product)?;
        log::info!(
            "product '{}' created by {} (stock {})",
            product.name,
            principal.username,
            product.stock
        );
        Ok(product)
    }

    /// Partial or full update. Setting `stock` here is a manual adjustment
    /// and bypasses the ledger's reserve/release path.
    pub fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, DomainError> {
        if changes.is_empty() {
            return self.get(id);
        }
        changes.validate()?;
        let product = self.repo.update(id, changes)?;
        log::info!("product '{}' updated by {}", product.name, principal.username);
        Ok(product)
    }

    pub fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("product {id} deleted by {}", principal.username);
        Ok(())
    }
}
