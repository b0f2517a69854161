use std::collections::HashMap;

use bigdecimal::{BigDecimal, Zero};
use chrono::Utc;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::PgConnection;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::fulfillment::{
    check_stock, ensure_products_exist, plan_fulfillment, plan_line, PlannedLine,
};
use crate::domain::order::{
    line_amount, ItemChanges, ListResult, NewOrder, NewOrderItem, Order, OrderChanges,
    OrderFilter, OrderItem, OrderStatus,
};
use crate::domain::ports::OrderRepository;
use crate::domain::product::Product;
use crate::schema::{order_items, orders};

use super::ledger;
use super::models::{NewOrderItemRow, NewOrderRow, OrderChangeset, OrderItemRow, OrderRow};
use super::projector;

// ── Order aggregate helpers ──────────────────────────────────────────────────

/// Sums the current item amounts and stores the result on the order.
///
/// Not maintained by any trigger: every item mutation must be followed by a
/// call to this on the same connection.
pub fn recompute_total(conn: &mut PgConnection, order_id: Uuid) -> Result<BigDecimal, DomainError> {
    let sum: Option<BigDecimal> = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(diesel::dsl::sum(order_items::amount))
        .get_result(conn)?;
    let total = sum.unwrap_or_else(BigDecimal::zero);

    diesel::update(orders::table.find(order_id))
        .set((orders::total.eq(&total), orders::updated_at.eq(Utc::now())))
        .execute(conn)?;
    Ok(total)
}

fn load_order(conn: &mut PgConnection, id: Uuid) -> Result<Option<Order>, DomainError> {
    let row = orders::table
        .find(id)
        .select(OrderRow::as_select())
        .first(conn)
        .optional()?;

    let Some(row) = row else {
        return Ok(None);
    };

    let items = OrderItemRow::belonging_to(&row)
        .select(OrderItemRow::as_select())
        .order(order_items::line_no.asc())
        .load(conn)?;

    row.into_order(items).map(Some)
}

fn reload(conn: &mut PgConnection, id: Uuid) -> Result<Order, DomainError> {
    load_order(conn, id)?.ok_or(DomainError::NotFound("Order"))
}

/// Locks the order header row for the rest of the transaction.
fn lock_order(conn: &mut PgConnection, id: Uuid) -> Result<OrderRow, DomainError> {
    orders::table
        .find(id)
        .select(OrderRow::as_select())
        .for_update()
        .first(conn)
        .optional()?
        .ok_or(DomainError::NotFound("Order"))
}

/// Item mutations are only allowed while the order is still pending.
fn lock_pending_order(conn: &mut PgConnection, id: Uuid) -> Result<OrderRow, DomainError> {
    let row = lock_order(conn, id)?;
    if row.status == OrderStatus::Completed.as_str() {
        return Err(DomainError::OrderLocked);
    }
    Ok(row)
}

fn insert_shell(conn: &mut PgConnection, order: &NewOrder) -> Result<OrderRow, DomainError> {
    let row = diesel::insert_into(orders::table)
        .values(&NewOrderRow {
            id: Uuid::new_v4(),
            order_id: order.order_id.clone(),
            customer: order.customer.trim().to_string(),
            customer_address: order.customer_address.clone(),
            status: OrderStatus::Pending.as_str().to_string(),
            total: BigDecimal::zero(),
            date_np: order.date_np.clone(),
        })
        .returning(OrderRow::as_returning())
        .get_result(conn)?;
    Ok(row)
}

fn insert_item(
    conn: &mut PgConnection,
    order_id: Uuid,
    line_no: i32,
    line: PlannedLine,
) -> Result<OrderItemRow, DomainError> {
    let row = diesel::insert_into(order_items::table)
        .values(&NewOrderItemRow {
            id: Uuid::new_v4(),
            order_id,
            product_id: line.product_id,
            line_no,
            particulars: line.particulars,
            quantity: line.quantity,
            rate: line.rate,
            amount: line.amount,
        })
        .returning(OrderItemRow::as_returning())
        .get_result(conn)?;
    Ok(row)
}

fn next_line_no(conn: &mut PgConnection, order_id: Uuid) -> Result<i32, DomainError> {
    let max: Option<i32> = order_items::table
        .filter(order_items::order_id.eq(order_id))
        .select(diesel::dsl::max(order_items::line_no))
        .get_result(conn)?;
    Ok(max.map_or(0, |n| n + 1))
}

fn mark_completed(conn: &mut PgConnection, order_id: Uuid) -> Result<(), DomainError> {
    diesel::update(orders::table.find(order_id))
        .set((
            orders::status.eq(OrderStatus::Completed.as_str()),
            orders::updated_at.eq(Utc::now()),
        ))
        .execute(conn)?;
    Ok(())
}

/// Reserves and projects every item, then completes the order. The items must
/// already be written and their stock validated under lock, with every
/// product present in `products`.
fn reserve_and_complete(
    conn: &mut PgConnection,
    order: &Order,
    products: &HashMap<Uuid, Product>,
) -> Result<(), DomainError> {
    for item in &order.items {
        ledger::reserve(conn, item.product_id, item.quantity)?;
        projector::project(conn, order, item, &products[&item.product_id])?;
    }
    recompute_total(conn, order.id)?;
    mark_completed(conn, order.id)
}

fn filtered(filter: &OrderFilter) -> orders::BoxedQuery<'static, Pg> {
    let mut query = orders::table.into_boxed();
    if let Some(start) = filter.start {
        query = query.filter(orders::created_at.ge(start));
    }
    if let Some(end) = filter.end {
        query = query.filter(orders::created_at.lt(end));
    }
    query
}

// ── Repository ────────────────────────────────────────────────────────────────

pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl OrderRepository for DieselOrderRepository {
    fn fulfill(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            // Lock every product and validate the whole list before writing.
            let ids: Vec<Uuid> = new_order.items.iter().map(|i| i.product_id).collect();
            let products = ledger::lock_products(conn, &ids)?;
            let lines = plan_fulfillment(&new_order.items, &products)?;

            let shell = insert_shell(conn, &new_order)?;
            let mut order = shell.into_order(vec![])?;

            // Items in caller order, each reserved and projected.
            for (line_no, line) in (0..).zip(lines) {
                let item = OrderItem::from(insert_item(conn, order.id, line_no, line)?);
                ledger::reserve(conn, item.product_id, item.quantity)?;
                projector::project(conn, &order, &item, &products[&item.product_id])?;
                order.items.push(item);
            }

            recompute_total(conn, order.id)?;
            mark_completed(conn, order.id)?;

            reload(conn, order.id)
        })
    }

    fn create_pending(&self, new_order: NewOrder) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let ids: Vec<Uuid> = new_order.items.iter().map(|i| i.product_id).collect();
            let products = ledger::share_products(conn, &ids)?;
            ensure_products_exist(&ids, &products)?;

            let shell = insert_shell(conn, &new_order)?;
            for (line_no, item) in (0..).zip(&new_order.items) {
                let line = plan_line(item, &products[&item.product_id]);
                insert_item(conn, shell.id, line_no, line)?;
            }
            recompute_total(conn, shell.id)?;

            reload(conn, shell.id)
        })
    }

    fn complete(&self, id: Uuid) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let row = lock_order(conn, id)?;
            if row.status == OrderStatus::Completed.as_str() {
                return Err(DomainError::AlreadyCompleted);
            }

            let items = OrderItemRow::belonging_to(&row)
                .select(OrderItemRow::as_select())
                .order(order_items::line_no.asc())
                .load(conn)?;
            let order = row.into_order(items)?;

            let ids: Vec<Uuid> = order.items.iter().map(|i| i.product_id).collect();
            let products = ledger::lock_products(conn, &ids)?;
            ensure_products_exist(&ids, &products)?;
            check_stock(order.items.iter().map(|i| (i.product_id, i.quantity)), &products)?;

            reserve_and_complete(conn, &order, &products)?;
            reload(conn, id)
        })
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, DomainError> {
        let mut conn = self.pool.get()?;
        load_order(&mut conn, id)
    }

    fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let total: i64 = filtered(filter).count().get_result(conn)?;

            let rows = filtered(filter)
                .select(OrderRow::as_select())
                .order(orders::created_at.desc())
                .limit(filter.limit)
                .offset(filter.offset())
                .load(conn)?;

            let items = OrderItemRow::belonging_to(&rows)
                .select(OrderItemRow::as_select())
                .order(order_items::line_no.asc())
                .load::<OrderItemRow>(conn)?
                .grouped_by(&rows);

            let orders = rows
                .into_iter()
                .zip(items)
                .map(|(row, items)| row.into_order(items))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(ListResult {
                items: orders,
                total,
            })
        })
    }

    fn update(&self, id: Uuid, changes: OrderChanges) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            let updated = diesel::update(orders::table.find(id))
                .set(&OrderChangeset {
                    order_id: changes.order_id,
                    customer: changes.customer.map(|c| c.trim().to_string()),
                    customer_address: changes.customer_address,
                    date_np: changes.date_np,
                    updated_at: Utc::now(),
                })
                .execute(conn)?;
            if updated == 0 {
                return Err(DomainError::NotFound("Order"));
            }
            reload(conn, id)
        })
    }

    fn delete(&self, id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(orders::table.find(id)).execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound("Order"));
        }
        Ok(())
    }

    fn add_item(&self, order_id: Uuid, item: NewOrderItem) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_pending_order(conn, order_id)?;
            let products = ledger::share_products(conn, &[item.product_id])?;
            let product = products
                .get(&item.product_id)
                .ok_or(DomainError::ProductNotFound(item.product_id))?;

            let line = plan_line(&item, product);
            let line_no = next_line_no(conn, order_id)?;
            insert_item(conn, order_id, line_no, line)?;
            recompute_total(conn, order_id)?;

            reload(conn, order_id)
        })
    }

    fn update_item(
        &self,
        order_id: Uuid,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_pending_order(conn, order_id)?;
            let current: OrderItemRow = order_items::table
                .filter(order_items::id.eq(item_id))
                .filter(order_items::order_id.eq(order_id))
                .select(OrderItemRow::as_select())
                .first(conn)
                .optional()?
                .ok_or(DomainError::NotFound("Order item"))?;

            let quantity = changes.quantity.unwrap_or(current.quantity);
            let rate = changes.rate.unwrap_or(current.rate);
            let particulars = changes.particulars.unwrap_or(current.particulars);
            let amount = line_amount(quantity, &rate);

            diesel::update(order_items::table.find(item_id))
                .set((
                    order_items::quantity.eq(quantity),
                    order_items::rate.eq(&rate),
                    order_items::particulars.eq(&particulars),
                    order_items::amount.eq(&amount),
                ))
                .execute(conn)?;
            recompute_total(conn, order_id)?;

            reload(conn, order_id)
        })
    }

    fn remove_item(&self, order_id: Uuid, item_id: Uuid) -> Result<Order, DomainError> {
        let mut conn = self.pool.get()?;

        conn.transaction::<_, DomainError, _>(|conn| {
            lock_pending_order(conn, order_id)?;
            let deleted = diesel::delete(
                order_items::table
                    .filter(order_items::id.eq(item_id))
                    .filter(order_items::order_id.eq(order_id)),
            )
            .execute(conn)?;
            if deleted == 0 {
                return Err(DomainError::NotFound("Order item"));
            }
            recompute_total(conn, order_id)?;

            reload(conn, order_id)
        })
    }
}
