use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::optional_decimal;
use crate::application::AppServices;
use crate::auth::Authenticated;
use crate::domain::records::{CombinedRecord, ManualSale, SaleRecord};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ManualSaleRequest {
    pub product: Uuid,
    pub quantity: i32,
    /// Unit price; defaults to the product's current price.
    #[serde(default, deserialize_with = "optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub price: Option<BigDecimal>,
    /// Defaults to today.
    pub sale_date: Option<NaiveDate>,
}

impl From<ManualSaleRequest> for ManualSale {
    fn from(req: ManualSaleRequest) -> Self {
        ManualSale {
            product_id: req.product,
            quantity: req.quantity,
            price: req.price,
            sale_date: req.sale_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SaleRecordResponse {
    pub id: Uuid,
    pub product: Uuid,
    pub product_name: String,
    /// Null for manual sales and for sales whose order was deleted.
    pub order: Option<Uuid>,
    pub customer: Option<String>,
    pub quantity: i32,
    pub price: String,
    pub total: String,
    pub sale_date: NaiveDate,
}

impl From<SaleRecord> for SaleRecordResponse {
    fn from(r: SaleRecord) -> Self {
        SaleRecordResponse {
            id: r.id,
            product: r.product_id,
            product_name: r.product_name,
            order: r.order_id,
            customer: r.customer,
            quantity: r.quantity,
            price: r.price.to_string(),
            total: r.total.to_string(),
            sale_date: r.sale_date,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CombinedRecordResponse {
    pub id: Uuid,
    pub order_id: String,
    pub customer: String,
    pub customer_address: String,
    pub product_name: String,
    pub quantity: i32,
    pub rate: String,
    pub total: String,
    pub created_at: String,
}

impl From<CombinedRecord> for CombinedRecordResponse {
    fn from(r: CombinedRecord) -> Self {
        CombinedRecordResponse {
            id: r.id,
            order_id: r.order_ref,
            customer: r.customer,
            customer_address: r.customer_address,
            product_name: r.product_name,
            quantity: r.quantity,
            rate: r.rate.to_string(),
            total: r.total.to_string(),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

/// GET /api/salerecords/
#[utoipa::path(
    get,
    path = "/api/salerecords/",
    responses(
        (status = 200, description = "All sale records, newest first", body = Vec<SaleRecordResponse>),
    ),
    tag = "records"
)]
pub async fn list_sales(services: web::Data<AppServices>) -> Result<HttpResponse, AppError> {
    let records = web::block(move || services.records.list_sales())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<SaleRecordResponse> = records.into_iter().map(SaleRecordResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/salerecords/{id}/
#[utoipa::path(
    get,
    path = "/api/salerecords/{id}/",
    params(("id" = Uuid, Path, description = "Sale record UUID")),
    responses(
        (status = 200, description = "Sale record found", body = SaleRecordResponse),
        (status = 404, description = "Sale record not found"),
    ),
    tag = "records"
)]
pub async fn get_sale(
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let record = web::block(move || services.records.get_sale(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(SaleRecordResponse::from(record)))
}

/// POST /api/salerecords/
///
/// Records a sale outside any order, taking the quantity out of stock.
#[utoipa::path(
    post,
    path = "/api/salerecords/",
    request_body = ManualSaleRequest,
    responses(
        (status = 201, description = "Sale recorded", body = SaleRecordResponse),
        (status = 400, description = "Invalid input, unknown product or insufficient stock"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "records"
)]
pub async fn record_sale(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    body: web::Json<ManualSaleRequest>,
) -> Result<HttpResponse, AppError> {
    let sale = ManualSale::from(body.into_inner());

    let record = web::block(move || services.records.record_sale(&principal, sale))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(SaleRecordResponse::from(record)))
}

/// DELETE /api/salerecords/{id}/
///
/// Returns the sold quantity to stock and deletes the record. The order the
/// sale came from is left as it is.
#[utoipa::path(
    delete,
    path = "/api/salerecords/{id}/",
    params(("id" = Uuid, Path, description = "Sale record UUID")),
    responses(
        (status = 204, description = "Sale reversed"),
        (status = 404, description = "Sale record not found"),
    ),
    security(("bearer" = [])),
    tag = "records"
)]
pub async fn reverse_sale(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || services.records.reverse_sale(&principal, id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/combined-records/
#[utoipa::path(
    get,
    path = "/api/combined-records/",
    responses(
        (status = 200, description = "Flat export rows, newest first", body = Vec<CombinedRecordResponse>),
    ),
    tag = "records"
)]
pub async fn list_combined(services: web::Data<AppServices>) -> Result<HttpResponse, AppError> {
    let records = web::block(move || services.records.list_combined())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<CombinedRecordResponse> =
        records.into_iter().map(CombinedRecordResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}
