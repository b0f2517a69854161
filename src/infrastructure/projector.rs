//! Writes the derived records of a committed order line.

use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{Order, OrderItem};
use crate::domain::product::Product;
use crate::domain::records::{project_combined, project_sale, NewSaleRecord};
use crate::schema::{combined_records, sale_records};

use super::models::{NewCombinedRecordRow, NewSaleRecordRow};

/// Inserts one sale record and one combined record for `item`. Must run on
/// the same transaction that wrote the item and reserved its stock.
pub fn project(
    conn: &mut PgConnection,
    order: &Order,
    item: &OrderItem,
    product: &Product,
) -> Result<(), DomainError> {
    insert_sale(conn, project_sale(order, item))?;

    let row = project_combined(order, item, product);
    diesel::insert_into(combined_records::table)
        .values(&NewCombinedRecordRow {
            id: Uuid::new_v4(),
            order_ref: row.order_ref,
            customer: row.customer,
            customer_address: row.customer_address,
            product_name: row.product_name,
            quantity: row.quantity,
            rate: row.rate,
            total: row.total,
        })
        .execute(conn)?;
    Ok(())
}

pub fn insert_sale(conn: &mut PgConnection, sale: NewSaleRecord) -> Result<Uuid, DomainError> {
    let id = Uuid::new_v4();
    diesel::insert_into(sale_records::table)
        .values(&NewSaleRecordRow {
            id,
            product_id: sale.product_id,
            order_id: sale.order_id,
            quantity: sale.quantity,
            price: sale.price,
            total: sale.total,
            sale_date: sale.sale_date,
        })
        .execute(conn)?;
    Ok(id)
}
