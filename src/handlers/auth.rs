use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap};
use axum::middleware::Next;
use axum::response::Response;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::handlers::extract::ApiJson;
use crate::models::AdminIdentity;
use crate::services::credentials;
use crate::services::session::SessionIssuer;
use crate::state::AppState;

/// The admin gate. A missing bearer token is a 401; a token that fails
/// verification is a 403.
pub fn check_auth(headers: &HeaderMap, sessions: &SessionIssuer) -> Result<AdminIdentity, AppError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or(AppError::MissingToken)?;

    sessions.verify(token)
}

/// Route layer for the admin routes. Runs before any handler extractor reads
/// the body and hands the verified identity on as an extension.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let identity = check_auth(req.headers(), &state.sessions)?;
    req.extensions_mut().insert(identity);
    Ok(next.run(req).await)
}

// POST /api/admin/login
#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct LoginResponse {
    token: String,
    username: String,
    message: &'static str,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    if body.username.trim().is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "username and password are required".to_string(),
        ));
    }

    let account = {
        let db = state.conn()?;
        credentials::find_account(&db, body.username.trim())?
    };

    // Password hashing is CPU-bound; keep it off the async workers and
    // outside the connection lock.
    let identity = tokio::task::spawn_blocking(move || {
        credentials::verify_password(account.as_ref(), &body.password)
    })
    .await
    .map_err(|e| AppError::Internal(format!("login task failed: {e}")))?;

    let identity = match identity {
        Ok(identity) => identity,
        Err(e) => {
            if matches!(e, AppError::InvalidCredentials) {
                tracing::warn!("rejected admin login attempt");
            }
            return Err(e);
        }
    };

    let token = state.sessions.issue(&identity)?;
    tracing::info!(username = %identity.username, "admin logged in");

    Ok(Json(LoginResponse {
        token,
        username: identity.username,
        message: "login successful",
    }))
}

// GET /api/admin/verify
#[derive(Serialize)]
pub struct VerifyResponse {
    valid: bool,
    username: String,
}

pub async fn verify(Extension(identity): Extension<AdminIdentity>) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        valid: true,
        username: identity.username,
    })
}
