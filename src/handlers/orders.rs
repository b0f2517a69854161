use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Days, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use super::{double_option, optional_decimal};
use crate::application::AppServices;
use crate::auth::Authenticated;
use crate::domain::errors::{DomainError, FieldError};
use crate::domain::order::{
    ItemChanges, NewOrder, NewOrderItem, Order, OrderChanges, OrderFilter, OrderItem, OrderStatus,
};
use crate::errors::AppError;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    pub product: Uuid,
    pub quantity: i32,
    /// Unit price; defaults to the product's current price.
    #[serde(default, deserialize_with = "optional_decimal")]
    #[schema(value_type = Option<String>, example = "5.00")]
    pub rate: Option<BigDecimal>,
    /// Defaults to the product name.
    pub particulars: Option<String>,
}

impl From<OrderItemRequest> for NewOrderItem {
    fn from(req: OrderItemRequest) -> Self {
        NewOrderItem {
            product_id: req.product,
            quantity: req.quantity,
            rate: req.rate,
            particulars: req.particulars,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub order_id: Option<String>,
    pub customer: String,
    #[serde(default)]
    pub customer_address: String,
    pub date_np: Option<String>,
    /// `Pending` records the order without touching stock. Defaults to `Completed`.
    pub status: Option<String>,
    pub items: Vec<OrderItemRequest>,
}

impl TryFrom<CreateOrderRequest> for NewOrder {
    type Error = DomainError;

    fn try_from(req: CreateOrderRequest) -> Result<Self, Self::Error> {
        let status = match req.status.as_deref() {
            None => OrderStatus::Completed,
            Some(s) => s.parse()?,
        };
        Ok(NewOrder {
            order_id: req.order_id,
            customer: req.customer,
            customer_address: req.customer_address,
            date_np: req.date_np,
            status,
            items: req.items.into_iter().map(NewOrderItem::from).collect(),
        })
    }
}

/// Full header replacement (PUT).
#[derive(Debug, Deserialize, ToSchema)]
pub struct ReplaceOrderRequest {
    pub order_id: Option<String>,
    pub customer: String,
    #[serde(default)]
    pub customer_address: String,
    pub date_np: Option<String>,
}

impl From<ReplaceOrderRequest> for OrderChanges {
    fn from(req: ReplaceOrderRequest) -> Self {
        OrderChanges {
            order_id: Some(req.order_id),
            customer: Some(req.customer),
            customer_address: Some(req.customer_address),
            date_np: Some(req.date_np),
        }
    }
}

/// Partial header update (PATCH). An explicit `null` clears a nullable field.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PatchOrderRequest {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub order_id: Option<Option<String>>,
    pub customer: Option<String>,
    pub customer_address: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub date_np: Option<Option<String>>,
}

impl From<PatchOrderRequest> for OrderChanges {
    fn from(req: PatchOrderRequest) -> Self {
        OrderChanges {
            order_id: req.order_id,
            customer: req.customer,
            customer_address: req.customer_address,
            date_np: req.date_np,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchItemRequest {
    pub quantity: Option<i32>,
    #[serde(default, deserialize_with = "optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub rate: Option<BigDecimal>,
    pub particulars: Option<String>,
}

impl From<PatchItemRequest> for ItemChanges {
    fn from(req: PatchItemRequest) -> Self {
        ItemChanges {
            quantity: req.quantity,
            rate: req.rate,
            particulars: req.particulars,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product: Uuid,
    pub particulars: String,
    pub quantity: i32,
    pub rate: String,
    pub amount: String,
}

impl From<OrderItem> for OrderItemResponse {
    fn from(item: OrderItem) -> Self {
        OrderItemResponse {
            id: item.id,
            product: item.product_id,
            particulars: item.particulars,
            quantity: item.quantity,
            rate: item.rate.to_string(),
            amount: item.amount.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub customer: String,
    pub customer_address: String,
    pub status: String,
    pub total: String,
    pub date_np: Option<String>,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        OrderResponse {
            id: order.id,
            order_id: order.order_id,
            customer: order.customer,
            customer_address: order.customer_address,
            status: order.status.to_string(),
            total: order.total.to_string(),
            date_np: order.date_np,
            created_at: order.created_at.to_rfc3339(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

// ── Pagination ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersParams {
    /// Page number (1-based). Defaults to 1.
    #[serde(default = "default_page")]
    pub page: i64,
    /// Number of items per page. Defaults to 20, maximum 100.
    #[serde(default = "default_limit")]
    pub limit: i64,
    /// Only orders created at or after this instant (RFC 3339 or YYYY-MM-DD).
    pub start: Option<String>,
    /// Only orders created at or before this instant; a bare date includes the whole day.
    pub end: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    20
}

impl ListOrdersParams {
    fn into_filter(self) -> Result<OrderFilter, AppError> {
        let mut errors = Vec::new();
        let start = parse_bound(self.start.as_deref(), "start", false, &mut errors);
        let end = parse_bound(self.end.as_deref(), "end", true, &mut errors);
        if !errors.is_empty() {
            return Err(AppError::Validation(errors));
        }
        Ok(OrderFilter {
            page: self.page.max(1),
            limit: self.limit.clamp(1, 100),
            start,
            end,
        })
    }
}

fn parse_bound(
    raw: Option<&str>,
    field: &str,
    upper: bool,
    errors: &mut Vec<FieldError>,
) -> Option<DateTime<Utc>> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        let ts = ts.with_timezone(&Utc);
        // The filter's upper bound is exclusive; stored timestamps are microsecond precise.
        return Some(if upper { ts + TimeDelta::microseconds(1) } else { ts });
    }
    let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().and_then(|date| {
        let date = if upper {
            date.checked_add_days(Days::new(1))?
        } else {
            date
        };
        Some(date.and_hms_opt(0, 0, 0)?.and_utc())
    });
    if parsed.is_none() {
        errors.push(FieldError::new(
            field,
            "Expected an RFC 3339 timestamp or a YYYY-MM-DD date.",
        ));
    }
    parsed
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ListOrdersResponse {
    pub items: Vec<OrderResponse>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /api/orders/
///
/// Creates an order. Unless `status` is `Pending`, stock is reserved for every
/// item and the sale and combined records are written in the same transaction;
/// a shortfall on any item rejects the whole order.
#[utoipa::path(
    post,
    path = "/api/orders/",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid input, unknown product or insufficient stock"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn create_order(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    body: web::Json<CreateOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let new_order = NewOrder::try_from(body.into_inner())?;

    let order = web::block(move || services.orders.fulfill(&principal, new_order))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /api/orders/{id}/
#[utoipa::path(
    get,
    path = "/api/orders/{id}/",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
    ),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found"),
    ),
    tag = "orders"
)]
pub async fn get_order(
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || services.orders.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// GET /api/orders/
///
/// Newest first, with items. Use `page` (1-based) and `limit` to paginate and
/// `start` / `end` to restrict the creation time.
#[utoipa::path(
    get,
    path = "/api/orders/",
    params(ListOrdersParams),
    responses(
        (status = 200, description = "Paginated list of orders", body = ListOrdersResponse),
        (status = 400, description = "Unparseable date filter"),
    ),
    tag = "orders"
)]
pub async fn list_orders(
    services: web::Data<AppServices>,
    query: web::Query<ListOrdersParams>,
) -> Result<HttpResponse, AppError> {
    let filter = query.into_inner().into_filter()?;
    let (page, limit) = (filter.page, filter.limit);

    let result = web::block(move || services.orders.list(&filter))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ListOrdersResponse {
        items: result.items.into_iter().map(OrderResponse::from).collect(),
        total: result.total,
        page,
        limit,
    }))
}

/// PUT /api/orders/{id}/
#[utoipa::path(
    put,
    path = "/api/orders/{id}/",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = ReplaceOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid input or duplicate order_id"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn replace_order(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<ReplaceOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = OrderChanges::from(body.into_inner());

    let order = web::block(move || services.orders.update(&principal, id, changes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// PATCH /api/orders/{id}/
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = PatchOrderRequest,
    responses(
        (status = 200, description = "Order updated", body = OrderResponse),
        (status = 400, description = "Invalid input or duplicate order_id"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn patch_order(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<PatchOrderRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = OrderChanges::from(body.into_inner());

    let order = web::block(move || services.orders.update(&principal, id, changes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/orders/{id}/
///
/// Items go with the order. Sale records stay (detached) and stock is not
/// restored; reverse individual sale records for that.
#[utoipa::path(
    delete,
    path = "/api/orders/{id}/",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 204, description = "Order deleted"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn delete_order(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || services.orders.delete(&principal, id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// POST /api/orders/{id}/complete/
#[utoipa::path(
    post,
    path = "/api/orders/{id}/complete/",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order completed", body = OrderResponse),
        (status = 400, description = "Already completed or insufficient stock"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn complete_order(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let order = web::block(move || services.orders.complete(&principal, id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// POST /api/orders/{id}/items/
#[utoipa::path(
    post,
    path = "/api/orders/{id}/items/",
    params(("id" = Uuid, Path, description = "Order UUID")),
    request_body = OrderItemRequest,
    responses(
        (status = 201, description = "Item added; returns the updated order", body = OrderResponse),
        (status = 400, description = "Invalid input, unknown product or completed order"),
        (status = 404, description = "Order not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn add_item(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<OrderItemRequest>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let item = NewOrderItem::from(body.into_inner());

    let order = web::block(move || services.orders.add_item(&principal, order_id, item))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// PATCH /api/orders/{id}/items/{item_id}/
#[utoipa::path(
    patch,
    path = "/api/orders/{id}/items/{item_id}/",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    request_body = PatchItemRequest,
    responses(
        (status = 200, description = "Item updated; returns the updated order", body = OrderResponse),
        (status = 400, description = "Invalid input or completed order"),
        (status = 404, description = "Order or item not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn update_item(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<(Uuid, Uuid)>,
    body: web::Json<PatchItemRequest>,
) -> Result<HttpResponse, AppError> {
    let (order_id, item_id) = path.into_inner();
    let changes = ItemChanges::from(body.into_inner());

    let order = web::block(move || {
        services
            .orders
            .update_item(&principal, order_id, item_id, changes)
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

/// DELETE /api/orders/{id}/items/{item_id}/
#[utoipa::path(
    delete,
    path = "/api/orders/{id}/items/{item_id}/",
    params(
        ("id" = Uuid, Path, description = "Order UUID"),
        ("item_id" = Uuid, Path, description = "Order item UUID"),
    ),
    responses(
        (status = 200, description = "Item removed; returns the updated order", body = OrderResponse),
        (status = 400, description = "Completed order"),
        (status = 404, description = "Order or item not found"),
    ),
    security(("bearer" = [])),
    tag = "orders"
)]
pub async fn remove_item(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, AppError> {
    let (order_id, item_id) = path.into_inner();

    let order = web::block(move || services.orders.remove_item(&principal, order_id, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(start: Option<&str>, end: Option<&str>) -> ListOrdersParams {
        ListOrdersParams {
            page: 0,
            limit: 500,
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    #[test]
    fn paging_is_clamped() {
        let filter = params(None, None).into_filter().unwrap();
        assert_eq!(filter.page, 1);
        assert_eq!(filter.limit, 100);
        assert!(filter.start.is_none() && filter.end.is_none());
    }

    #[test]
    fn bare_end_date_includes_the_whole_day() {
        let filter = params(Some("2024-03-01"), Some("2024-03-31"))
            .into_filter()
            .unwrap();
        assert_eq!(filter.start.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(filter.end.unwrap().to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn rfc3339_bounds_are_inclusive() {
        let filter = params(Some("2024-03-01T10:30:00+02:00"), Some("2024-03-01T12:00:00Z"))
            .into_filter()
            .unwrap();
        let start = filter.start.unwrap();
        let end = filter.end.unwrap();
        assert_eq!(start.to_rfc3339(), "2024-03-01T08:30:00+00:00");

        // An order stamped exactly at `end` passes the exclusive `created_at < end` check.
        let at_end = DateTime::parse_from_rfc3339("2024-03-01T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert!(at_end < end);
        assert_eq!(end - at_end, TimeDelta::microseconds(1));
    }

    #[test]
    fn garbage_bounds_are_field_errors() {
        let err = params(Some("yesterday"), Some("2024-13-01"))
            .into_filter()
            .unwrap_err();
        match err {
            AppError::Validation(fields) => {
                let names: Vec<_> = fields.iter().map(|f| f.field.as_str()).collect();
                assert_eq!(names, ["start", "end"]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn status_defaults_to_completed_and_rejects_unknown_values() {
        let body: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer": "Ram",
            "items": [{ "product": Uuid::nil(), "quantity": 4 }]
        }))
        .unwrap();
        let order = NewOrder::try_from(body).unwrap();
        assert_eq!(order.status, OrderStatus::Completed);
        assert_eq!(order.items[0].product_id, Uuid::nil());

        let body: CreateOrderRequest = serde_json::from_value(serde_json::json!({
            "customer": "Ram",
            "status": "Shipped",
            "items": []
        }))
        .unwrap();
        assert!(NewOrder::try_from(body).is_err());
    }

    #[test]
    fn patch_distinguishes_null_from_absent() {
        let patch: PatchOrderRequest =
            serde_json::from_value(serde_json::json!({ "order_id": null })).unwrap();
        assert_eq!(patch.order_id, Some(None));
        assert_eq!(patch.date_np, None);
    }

    #[test]
    fn rate_accepts_strings_and_numbers() {
        let item: OrderItemRequest = serde_json::from_value(serde_json::json!({
            "product": Uuid::nil(), "quantity": 1, "rate": "7.50"
        }))
        .unwrap();
        assert_eq!(item.rate.unwrap().to_string(), "7.50");

        let item: OrderItemRequest = serde_json::from_value(serde_json::json!({
            "product": Uuid::nil(), "quantity": 1, "rate": 7
        }))
        .unwrap();
        assert_eq!(item.rate.unwrap(), BigDecimal::from(7));

        let item: OrderItemRequest = serde_json::from_value(serde_json::json!({
            "product": Uuid::nil(), "quantity": 3, "rate": 19.99
        }))
        .unwrap();
        let rate = item.rate.unwrap();
        assert_eq!(rate.to_string(), "19.99");
        assert_eq!((rate * BigDecimal::from(item.quantity)).to_string(), "59.97");
    }

    #[test]
    fn patch_item_rate_keeps_written_digits() {
        let patch: PatchItemRequest =
            serde_json::from_value(serde_json::json!({ "rate": 0.1 })).unwrap();
        assert_eq!(patch.rate.unwrap().to_string(), "0.1");
    }
}
