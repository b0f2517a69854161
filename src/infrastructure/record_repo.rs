use chrono::Utc;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::RecordRepository;
use crate::domain::records::{CombinedRecord, ManualSale, SaleRecord};
use crate::schema::{combined_records, orders, products, sale_records};

use super::ledger;
use super::models::{CombinedRecordRow, ProductRow, SaleRecordRow};
use super::projector;

type SaleRecordJoined = (SaleRecordRow, String, Option<String>);

fn to_sale_record((row, product_name, customer): SaleRecordJoined) -> SaleRecord {
    SaleRecord {
        id: row.id,
        product_id: row.product_id,
        product_name,
        order_id: row.order_id,
        customer,
        quantity: row.quantity,
        price: row.price,
        total: row.total,
        sale_date: row.sale_date,
    }
}

fn load_sale(conn: &mut PgConnection, id: Uuid) -> Result<Option<SaleRecord>, DomainError> {
    let row = sale_records::table
        .inner_join(products::table)
        .left_join(orders::table)
        .filter(sale_records::id.eq(id))
        .select((
            SaleRecordRow::as_select(),
            products::name,
            orders::customer.nullable(),
        ))
        .first::<SaleRecordJoined>(conn)
        .optional()?;
    Ok(row.map(to_sale_record))
}

pub struct DieselRecordRepository {
    pool: DbPool,
}

impl DieselRecordRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RecordRepository for DieselRecordRepository {
    fn list_sales(&self) -> Result<Vec<SaleRecord>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = sale_records::table
            .inner_join(products::table)
            .left_join(orders::table)
            .select((
                SaleRecordRow::as_select(),
                products::name,
                orders::customer.nullable(),
            ))
            .order((sale_records::sale_date.desc(), sale_records::created_at.desc()))
            .load::<SaleRecordJoined>(&mut conn)?;
        Ok(rows.into_iter().map(to_sale_record).collect())
    }

    fn find_sale(&self, id: Uuid) -> Result<Option<SaleRecord>, DomainError> {
        let mut conn = self.pool.get()?;
        load_sale(&mut conn, id)
    }

    fn record_sale(&self, sale: ManualSale) -> Result<SaleRecord, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let product = products::table
                .find(sale.product_id)
                .select(ProductRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::ProductNotFound(sale.product_id))?;

            ledger::reserve(conn, product.id, sale.quantity)?;
            let record = sale.into_record(&product.price, Utc::now().date_naive());
            let id = projector::insert_sale(conn, record)?;

            load_sale(conn, id)?.ok_or(DomainError::NotFound("Sale record"))
        })
    }

    fn reverse_sale(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let record = sale_records::table
                .find(id)
                .select(SaleRecordRow::as_select())
                .for_update()
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Sale record"))?;

            ledger::release(conn, record.product_id, record.quantity)?;
            diesel::delete(sale_records::table.find(record.id)).execute(conn)?;
            Ok(())
        })
    }

    fn list_combined(&self) -> Result<Vec<CombinedRecord>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows = combined_records::table
            .select(CombinedRecordRow::as_select())
            .order(combined_records::created_at.desc())
            .load(&mut conn)?;
        Ok(rows.into_iter().map(CombinedRecord::from).collect())
    }
}
