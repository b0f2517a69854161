use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::RecordRepository;
use crate::domain::records::{CombinedRecord, ManualSale, SaleRecord};
use crate::domain::user::Principal;

pub struct RecordService<R> {
    repo: R,
}

impl<R: RecordRepository> RecordService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn list_sales(&self) -> Result<Vec<SaleRecord>, DomainError> {
        self.repo.list_sales()
    }

    pub fn get_sale(&self, id: Uuid) -> Result<SaleRecord, DomainError> {
        self.repo.find_sale(id)?.ok_or(DomainError::NotFound("Sale record"))
    }

    pub fn record_sale(&self, principal: &Principal, sale: ManualSale) -> Result<SaleRecord, DomainError> {
        sale.validate()?;
        let record = self.repo.record_sale(sale)?;
        log::info!(
            "manual sale of {} x '{}' recorded by {}",
            record.quantity,
            record.product_name,
            principal.username
        );
        Ok(record)
    }

    /// Deletes the sale record and returns its quantity to stock.
    pub fn reverse_sale(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        self.repo.reverse_sale(id)?;
        log::info!("sale record {id} reversed by {}", principal.username);
        Ok(())
    }

    pub fn list_combined(&self) -> Result<Vec<CombinedRecord>, DomainError> {
        self.repo.list_combined()
    }
}
