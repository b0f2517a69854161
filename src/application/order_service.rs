use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::order::{
    ItemChanges, ListResult, NewOrder, NewOrderItem, Order, OrderChanges, OrderFilter, OrderStatus,
};
use crate::domain::ports::OrderRepository;
use crate::domain::user::Principal;

pub struct OrderService<R> {
    repo: R,
}

impl<R: OrderRepository> OrderService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates an order. A `Pending` order only records its items; anything
    /// else is fulfilled immediately, reserving stock for every item.
    pub fn fulfill(&self, principal: &Principal, order: NewOrder) -> Result<Order, DomainError> {
        order.validate()?;
        let result = match order.status {
            OrderStatus::Pending => self.repo.create_pending(order),
            OrderStatus::Completed => self.repo.fulfill(order),
        };
        match &result {
            Ok(order) => log::info!(
                "order {} created by {} ({}, {} items, total {})",
                order.reference(),
                principal.username,
                order.status,
                order.items.len(),
                order.total
            ),
            Err(e) => log::warn!("order rejected for {}: {e}", principal.username),
        }
        result
    }

    pub fn complete(&self, principal: &Principal, id: Uuid) -> Result<Order, DomainError> {
        let order = self.repo.complete(id)?;
        log::info!("order {} completed by {}", order.reference(), principal.username);
        Ok(order)
    }

    pub fn get(&self, id: Uuid) -> Result<Order, DomainError> {
        self.repo.find_by_id(id)?.ok_or(DomainError::NotFound("Order"))
    }

    pub fn list(&self, filter: &OrderFilter) -> Result<ListResult, DomainError> {
        self.repo.list(filter)
    }

    pub fn update(
        &self,
        principal: &Principal,
        id: Uuid,
        changes: OrderChanges,
    ) -> Result<Order, DomainError> {
        changes.validate()?;
        let order = self.repo.update(id, changes)?;
        log::info!("order {} updated by {}", order.reference(), principal.username);
        Ok(order)
    }

    pub fn delete(&self, principal: &Principal, id: Uuid) -> Result<(), DomainError> {
        self.repo.delete(id)?;
        log::info!("order {id} deleted by {}", principal.username);
        Ok(())
    }

    pub fn add_item(
        &self,
        principal: &Principal,
        order_id: Uuid,
        item: NewOrderItem,
    ) -> Result<Order, DomainError> {
        item.validate()?;
        let order = self.repo.add_item(order_id, item)?;
        log::info!("item added to order {} by {}", order.reference(), principal.username);
        Ok(order)
    }

    pub fn update_item(
        &self,
        principal: &Principal,
        order_id: Uuid,
        item_id: Uuid,
        changes: ItemChanges,
    ) -> Result<Order, DomainError> {
        changes.validate()?;
        let order = self.repo.update_item(order_id, item_id, changes)?;
        log::info!("item {item_id} of order {} updated by {}", order.reference(), principal.username);
        Ok(order)
    }

    pub fn remove_item(
        &self,
        principal: &Principal,
        order_id: Uuid,
        item_id: Uuid,
    ) -> Result<Order, DomainError> {
        let order = self.repo.remove_item(order_id, item_id)?;
        log::info!("item {item_id} removed from order {} by {}", order.reference(), principal.username);
        Ok(order)
    }
}
