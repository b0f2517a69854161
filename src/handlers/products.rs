use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{decimal, optional_decimal};
use crate::application::AppServices;
use crate::auth::Authenticated;
use crate::domain::product::{NewProduct, Product, ProductChanges};
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct ProductRequest {
    pub name: String,
    #[serde(deserialize_with = "decimal")]
    #[schema(value_type = String, example = "5.00")]
    pub price: BigDecimal,
    pub stock: i32,
    #[serde(default)]
    pub description: String,
    /// Image URL.
    #[serde(default)]
    pub image: String,
}

impl From<ProductRequest> for NewProduct {
    fn from(req: ProductRequest) -> Self {
        NewProduct {
            name: req.name,
            price: req.price,
            stock: req.stock,
            description: req.description,
            image: req.image,
        }
    }
}

impl From<ProductRequest> for ProductChanges {
    fn from(req: ProductRequest) -> Self {
        ProductChanges {
            name: Some(req.name),
            price: Some(req.price),
            stock: Some(req.stock),
            description: Some(req.description),
            image: Some(req.image),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PatchProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "optional_decimal")]
    #[schema(value_type = Option<String>)]
    pub price: Option<BigDecimal>,
    pub stock: Option<i32>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl From<PatchProductRequest> for ProductChanges {
    fn from(req: PatchProductRequest) -> Self {
        ProductChanges {
            name: req.name,
            price: req.price,
            stock: req.stock,
            description: req.description,
            image: req.image,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductResponse {
    pub id: Uuid,
    pub name: String,
    pub price: String,
    pub stock: i32,
    pub description: String,
    pub image: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Product> for ProductResponse {
    fn from(p: Product) -> Self {
        ProductResponse {
            id: p.id,
            name: p.name,
            price: p.price.to_string(),
            stock: p.stock,
            description: p.description,
            image: p.image,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// GET /api/products/
#[utoipa::path(
    get,
    path = "/api/products/",
    responses(
        (status = 200, description = "All products, ordered by name", body = Vec<ProductResponse>),
    ),
    tag = "products"
)]
pub async fn list_products(services: web::Data<AppServices>) -> Result<HttpResponse, AppError> {
    let products = web::block(move || services.products.list())
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    let body: Vec<ProductResponse> = products.into_iter().map(ProductResponse::from).collect();
    Ok(HttpResponse::Ok().json(body))
}

/// GET /api/products/{id}/
#[utoipa::path(
    get,
    path = "/api/products/{id}/",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 200, description = "Product found", body = ProductResponse),
        (status = 404, description = "Product not found"),
    ),
    tag = "products"
)]
pub async fn get_product(
    services: web::Data<AppServices>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    let product = web::block(move || services.products.get(id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// POST /api/products/
#[utoipa::path(
    post,
    path = "/api/products/",
    request_body = ProductRequest,
    responses(
        (status = 201, description = "Product created", body = ProductResponse),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn create_product(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let new_product = NewProduct::from(body.into_inner());

    let product = web::block(move || services.products.create(&principal, new_product))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Created().json(ProductResponse::from(product)))
}

/// PUT /api/products/{id}/
#[utoipa::path(
    put,
    path = "/api/products/{id}/",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = ProductRequest,
    responses(
        (status = 200, description = "Product replaced", body = ProductResponse),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn replace_product(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<ProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = ProductChanges::from(body.into_inner());

    let product = web::block(move || services.products.update(&principal, id, changes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// PATCH /api/products/{id}/
#[utoipa::path(
    patch,
    path = "/api/products/{id}/",
    params(("id" = Uuid, Path, description = "Product UUID")),
    request_body = PatchProductRequest,
    responses(
        (status = 200, description = "Product updated", body = ProductResponse),
        (status = 400, description = "Invalid input or duplicate name"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn patch_product(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
    body: web::Json<PatchProductRequest>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let changes = ProductChanges::from(body.into_inner());

    let product = web::block(move || services.products.update(&principal, id, changes))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(ProductResponse::from(product)))
}

/// DELETE /api/products/{id}/
///
/// Refused while any order item or sale record references the product.
#[utoipa::path(
    delete,
    path = "/api/products/{id}/",
    params(("id" = Uuid, Path, description = "Product UUID")),
    responses(
        (status = 204, description = "Product deleted"),
        (status = 400, description = "Product is referenced"),
        (status = 404, description = "Product not found"),
    ),
    security(("bearer" = [])),
    tag = "products"
)]
pub async fn delete_product(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();

    web::block(move || services.products.delete(&principal, id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::NoContent().finish())
}
