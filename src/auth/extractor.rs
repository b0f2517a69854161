use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{web, FromRequest, HttpRequest};

use super::tokens::{TokenKind, TokenService};
use super::AuthError;
use crate::domain::user::Principal;
use crate::errors::AppError;

/// Extractor for routes that require a valid access token. Yields the caller
/// as an explicit [`Principal`].
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req))
    }
}

fn authenticate(req: &HttpRequest) -> Result<Authenticated, AppError> {
    let tokens = req
        .app_data::<web::Data<TokenService>>()
        .ok_or_else(|| AppError::Internal("token service is not registered".to_string()))?;
    let token = extract_bearer(req.headers())?;
    let claims = tokens.decode(token, TokenKind::Access)?;
    Ok(Authenticated(claims.into()))
}

pub fn extract_bearer(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let header = header.to_str().map_err(|_| AuthError::InvalidToken)?;
    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidToken)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingToken);
    }
    Ok(token)
}
