use chrono::DateTime;

use crate::auth::password::{hash_password, verify_password, UNUSABLE_HASH};
use crate::auth::{AuthError, Claims, TokenKind, TokenPair, TokenService};
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::{Principal, User};

pub struct AuthService<U> {
    users: U,
    tokens: TokenService,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    pub fn login(&self, username: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self.users.find_by_username(username)?;
        // Unknown usernames pay for a verification too.
        let stored = user.as_ref().map_or(UNUSABLE_HASH, |u| u.password_hash.as_str());
        let verified = verify_password(password, stored);
        let Some(user) = user.filter(|_| verified) else {
            log::warn!("failed login attempt for '{username}'");
            return Err(AuthError::InvalidCredentials);
        };
        log::info!("user '{}' logged in", user.username);
        self.tokens.issue_pair(&user)
    }

    /// Exchanges a live refresh token for a new access token.
    pub fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;
        if self.users.is_token_revoked(claims.jti)? {
            return Err(AuthError::Revoked);
        }
        self.tokens.issue(claims.uid, &claims.sub, TokenKind::Access)
    }

    /// Revokes the caller's refresh token.
    pub fn logout(&self, principal: &Principal, refresh_token: &str) -> Result<(), AuthError> {
        let claims = self.tokens.decode(refresh_token, TokenKind::Refresh)?;
        if claims.uid != principal.user_id {
            return Err(AuthError::InvalidToken);
        }
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;
        self.users.revoke_token(claims.jti, expires_at)?;
        log::info!("user '{}' logged out", principal.username);
        Ok(())
    }

    /// Accepts either token kind; revoked refresh tokens fail.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.tokens.decode_any(token)?;
        if claims.typ == TokenKind::Refresh && self.users.is_token_revoked(claims.jti)? {
            return Err(AuthError::Revoked);
        }
        Ok(claims)
    }

    /// Creates the account, or resets its password if it already exists.
    pub fn seed_user(&self, username: &str, password: &str) -> Result<User, DomainError> {
        let user = self.users.upsert(username, &hash_password(password))?;
        log::info!("seeded user '{}'", user.username);
        Ok(user)
    }
}
