use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::AppServices;
use crate::auth::extractor::extract_bearer;
use crate::auth::Authenticated;
use crate::errors::AppError;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenPairResponse {
    pub access: String,
    pub refresh: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AccessTokenResponse {
    pub access: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VerifyTokenResponse {
    pub valid: bool,
    pub user_id: Uuid,
    pub username: String,
}

/// POST /api/auth/login/
#[utoipa::path(
    post,
    path = "/api/auth/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Access and refresh tokens", body = TokenPairResponse),
        (status = 401, description = "Bad credentials"),
    ),
    tag = "auth"
)]
pub async fn login(
    services: web::Data<AppServices>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest { username, password } = body.into_inner();

    let pair = web::block(move || services.auth.login(&username, &password))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(TokenPairResponse {
        access: pair.access,
        refresh: pair.refresh,
    }))
}

/// POST /api/auth/refresh/
#[utoipa::path(
    post,
    path = "/api/auth/refresh/",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "New access token", body = AccessTokenResponse),
        (status = 401, description = "Refresh token invalid, expired or revoked"),
    ),
    tag = "auth"
)]
pub async fn refresh(
    services: web::Data<AppServices>,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let token = body.into_inner().refresh;

    let access = web::block(move || services.auth.refresh(&token))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(AccessTokenResponse { access }))
}

/// POST /api/auth/logout/
///
/// Revokes the given refresh token. The access token stays valid until it expires.
#[utoipa::path(
    post,
    path = "/api/auth/logout/",
    request_body = RefreshRequest,
    responses(
        (status = 205, description = "Refresh token revoked"),
        (status = 401, description = "Missing or invalid token"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn logout(
    services: web::Data<AppServices>,
    Authenticated(principal): Authenticated,
    body: web::Json<RefreshRequest>,
) -> Result<HttpResponse, AppError> {
    let token = body.into_inner().refresh;

    web::block(move || services.auth.logout(&principal, &token))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::ResetContent().finish())
}

/// GET /api/auth/verify-token/
#[utoipa::path(
    get,
    path = "/api/auth/verify-token/",
    responses(
        (status = 200, description = "Token is valid", body = VerifyTokenResponse),
        (status = 401, description = "Missing, invalid or revoked token"),
    ),
    security(("bearer" = [])),
    tag = "auth"
)]
pub async fn verify_token(
    services: web::Data<AppServices>,
    req: HttpRequest,
) -> Result<HttpResponse, AppError> {
    let token = extract_bearer(req.headers())?.to_string();

    let claims = web::block(move || services.auth.verify(&token))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(VerifyTokenResponse {
        valid: true,
        user_id: claims.uid,
        username: claims.sub,
    }))
}
