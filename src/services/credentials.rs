use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::{AdminAccount, AdminIdentity};

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(format!("failed to hash password: {e}")))
}

pub fn find_account(conn: &Connection, username: &str) -> Result<Option<AdminAccount>, AppError> {
    Ok(queries::get_admin_by_username(conn, username)?)
}

/// Checks a login attempt against an account fetched with `find_account`.
/// Unknown usernames and wrong passwords produce the same error. Needs no
/// connection, so callers run it after releasing the database lock.
pub fn verify_password(
    account: Option<&AdminAccount>,
    password: &str,
) -> Result<AdminIdentity, AppError> {
    let account = account.ok_or(AppError::InvalidCredentials)?;

    let parsed_hash = PasswordHash::new(&account.password_hash)
        .map_err(|e| AppError::Internal(format!("stored password hash is malformed: {e}")))?;

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AppError::InvalidCredentials)?;

    Ok(AdminIdentity::from(account))
}

/// Creates the admin account on first boot. Returns true when an account was
/// created, false when one already existed.
pub fn ensure_default_account(
    conn: &Connection,
    username: &str,
    default_password: &str,
) -> Result<bool, AppError> {
    if queries::count_admins(conn)? > 0 {
        return Ok(false);
    }

    let hash = hash_password(default_password)?;
    queries::insert_admin(conn, username, &hash)?;

    tracing::warn!(
        username = %username,
        password = %default_password,
        "created default admin account; change the password after first login"
    );
    Ok(true)
}
