use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AuthError;
use crate::domain::user::{Principal, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Username.
    pub sub: String,
    pub uid: Uuid,
    pub jti: Uuid,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.uid,
            username: claims.sub,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and verifies HS256 bearer tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn issue_pair(&self, user: &User) -> Result<TokenPair, AuthError> {
        Ok(TokenPair {
            access: self.issue(user.id, &user.username, TokenKind::Access)?,
            refresh: self.issue(user.id, &user.username, TokenKind::Refresh)?,
        })
    }

    pub fn issue(&self, uid: Uuid, username: &str, kind: TokenKind) -> Result<String, AuthError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let claims = Claims {
            sub: username.to_string(),
            uid,
            jti: Uuid::new_v4(),
            typ: kind,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Encoding(e.to_string()))
    }

    /// Verifies signature and expiry, and that the token is of `expected` kind.
    pub fn decode(&self, token: &str, expected: TokenKind) -> Result<Claims, AuthError> {
        let claims = self.decode_any(token)?;
        if claims.typ != expected {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    pub fn decode_any(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(decode::<Claims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", Duration::hours(24), Duration::days(7))
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            username: "admin".to_string(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn issued_pair_decodes_to_the_same_user() {
        let tokens = service();
        let user = user();
        let pair = tokens.issue_pair(&user).expect("issue");

        let access = tokens.decode(&pair.access, TokenKind::Access).expect("access");
        let refresh = tokens.decode(&pair.refresh, TokenKind::Refresh).expect("refresh");
        assert_eq!(access.uid, user.id);
        assert_eq!(refresh.sub, "admin");
        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn refresh_token_is_not_an_access_token() {
        let tokens = service();
        let pair = tokens.issue_pair(&user()).expect("issue");
        assert!(matches!(
            tokens.decode(&pair.refresh, TokenKind::Access),
            Err(AuthError::WrongTokenType)
        ));
        assert_eq!(
            tokens.decode_any(&pair.refresh).expect("any").typ,
            TokenKind::Refresh
        );
    }

    #[test]
    fn token_signed_with_another_secret_is_rejected() {
        let other = TokenService::new(b"other", Duration::hours(1), Duration::hours(1));
        let pair = other.issue_pair(&user()).expect("issue");
        assert!(matches!(
            service().decode(&pair.access, TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(b"test-secret", Duration::hours(-2), Duration::days(7));
        let u = user();
        let token = tokens
            .issue(u.id, &u.username, TokenKind::Access)
            .expect("issue");
        assert!(matches!(
            tokens.decode(&token, TokenKind::Access),
            Err(AuthError::Expired)
        ));
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            service().decode("not.a.jwt", TokenKind::Access),
            Err(AuthError::InvalidToken)
        ));
    }
}
