use std::env;
use std::path::PathBuf;

use crate::errors::AppError;

/// Secrets that are known from sample files and must never reach production.
const PLACEHOLDER_SECRETS: &[&str] = &["changeme", "change-me", "secret", "dev-secret-change-me"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub port: u16,
    pub database_url: String,
    pub upload_dir: PathBuf,
    pub jwt_secret: String,
    pub admin_username: String,
    pub admin_password: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup. `JWT_SECRET` and
    /// `ADMIN_PASSWORD` have no fallback.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(v) => v
                .parse()
                .map_err(|_| AppError::Config(format!("PORT is not a valid port: {v}")))?,
            None => 5000,
        };

        let jwt_secret = lookup("JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(AppError::Config(
                "JWT_SECRET is unset or still a placeholder".to_string(),
            ));
        }

        let admin_password = lookup("ADMIN_PASSWORD").unwrap_or_default();
        if admin_password.is_empty() {
            return Err(AppError::Config("ADMIN_PASSWORD must be set".to_string()));
        }

        Ok(Self {
            port,
            database_url: lookup("DATABASE_URL").unwrap_or_else(|| "salonbook.db".to_string()),
            upload_dir: lookup("UPLOAD_DIR")
                .unwrap_or_else(|| "uploads".to_string())
                .into(),
            jwt_secret,
            admin_username: lookup("ADMIN_USERNAME")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| "admin".to_string()),
            admin_password,
        })
    }
}
