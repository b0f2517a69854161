use std::collections::HashMap;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} must be a valid number, got '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, read from the environment (and `.env` via dotenvy).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub db_pool_size: u32,
    pub jwt_secret: String,
    pub access_token_hours: i64,
    pub refresh_token_days: i64,
    /// Seeded (or re-passworded) at startup when both are set.
    pub admin: Option<(String, String)>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let required = |name: &'static str| {
            vars.get(name)
                .filter(|v| !v.is_empty())
                .cloned()
                .ok_or(ConfigError::Missing(name))
        };

        let admin = match (vars.get("ADMIN_USERNAME"), vars.get("ADMIN_PASSWORD")) {
            (Some(user), Some(password)) if !user.is_empty() && !password.is_empty() => {
                Some((user.clone(), password.clone()))
            }
            _ => None,
        };

        Ok(AppConfig {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            host: vars
                .get("HOST")
                .cloned()
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&vars, "PORT", 8080)?,
            db_pool_size: parse_or(&vars, "DB_POOL_SIZE", 10)?,
            access_token_hours: parse_or(&vars, "ACCESS_TOKEN_LIFETIME_HOURS", 24)?,
            refresh_token_days: parse_or(&vars, "REFRESH_TOKEN_LIFETIME_DAYS", 7)?,
            admin,
        })
    }
}

fn parse_or<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
            name,
            value: value.clone(),
        }),
    }
}
