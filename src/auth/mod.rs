pub mod extractor;
pub mod password;
pub mod tokens;

use thiserror::Error;

use crate::domain::errors::DomainError;

pub use extractor::Authenticated;
pub use tokens::{Claims, TokenKind, TokenPair, TokenService};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication credentials were not provided.")]
    MissingToken,

    #[error("Given token not valid for any token type")]
    InvalidToken,

    #[error("Token is expired")]
    Expired,

    #[error("Token has wrong type")]
    WrongTokenType,

    #[error("Token is blacklisted")]
    Revoked,

    #[error("No active account found with the given credentials")]
    InvalidCredentials,

    #[error("Token encoding failed: {0}")]
    Encoding(String),

    #[error(transparent)]
    Store(#[from] DomainError),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken,
        }
    }
}
