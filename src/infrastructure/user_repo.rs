use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::UserRepository;
use crate::domain::user::User;
use crate::schema::{revoked_tokens, users};

use super::models::{NewUserRow, UserRow};

pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for DieselUserRepository {
    fn find_by_username(&self, username: &str) -> Result<Option<User>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()?;
        Ok(row.map(User::from))
    }

    fn upsert(&self, username: &str, password_hash: &str) -> Result<User, DomainError> {
        let mut conn = self.pool.get()?;
        let row = diesel::insert_into(users::table)
            .values(&NewUserRow {
                id: Uuid::new_v4(),
                username: username.to_string(),
                password_hash: password_hash.to_string(),
            })
            .on_conflict(users::username)
            .do_update()
            .set(users::password_hash.eq(password_hash))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)?;
        Ok(row.into())
    }

    fn revoke_token(&self, jti: Uuid, expires_at: DateTime<Utc>) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        conn.transaction::<_, DomainError, _>(|conn| {
            let pruned = diesel::delete(
                revoked_tokens::table.filter(revoked_tokens::expires_at.lt(Utc::now())),
            )
            .execute(conn)?;
            if pruned > 0 {
                log::debug!("pruned {pruned} expired revoked token(s)");
            }
            diesel::insert_into(revoked_tokens::table)
                .values((
                    revoked_tokens::jti.eq(jti),
                    revoked_tokens::expires_at.eq(expires_at),
                ))
                .on_conflict_do_nothing()
                .execute(conn)?;
            Ok(())
        })
    }

    fn is_token_revoked(&self, jti: Uuid) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        let revoked = diesel::select(diesel::dsl::exists(revoked_tokens::table.find(jti)))
            .get_result(&mut conn)?;
        Ok(revoked)
    }
}
