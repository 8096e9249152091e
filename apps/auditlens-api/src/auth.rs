//! Session-token identity check
//!
//! The identity seam exposes exactly one question to the rest of the API:
//! is this request authenticated, and what is the user id. Tokens are issued
//! by the dev-style email login and carried as a `Bearer` header or a
//! `session` cookie.

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRequestParts, State},
    http::request::Parts,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use shared_types::wire::{LoginRequest, LoginResponse};

use crate::error::ApiError;
use crate::models::DbUser;
use crate::state::AppState;

/// The authenticated user for a request. Extraction fails with 401 when no
/// valid session token is presented.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| session_cookie(parts))
            .ok_or(ApiError::Unauthorized)?;

        let user_id: Option<(String,)> =
            sqlx::query_as("SELECT user_id FROM sessions WHERE token = ?")
                .bind(&token)
                .fetch_optional(&state.db)
                .await?;

        match user_id {
            Some((id,)) => Ok(AuthUser { id }),
            None => Err(ApiError::Unauthorized),
        }
    }
}

fn bearer_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn session_cookie(parts: &Parts) -> Option<String> {
    let cookies = parts
        .headers
        .get(axum::http::header::COOKIE)?
        .to_str()
        .ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == "session" && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}

/// Dev-style sign-in: any email works, the user is created on first login.
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::InvalidInput("A valid email is required".into()));
    }

    let existing: Option<DbUser> =
        sqlx::query_as("SELECT id, email, name FROM users WHERE email = ?")
            .bind(&email)
            .fetch_optional(&state.db)
            .await?;

    let now = Utc::now();
    let user = match existing {
        Some(user) => user,
        None => {
            let user = DbUser {
                id: Uuid::new_v4().to_string(),
                email: email.clone(),
                // Display name defaults to the mailbox part of the address
                name: email.split('@').next().unwrap_or(&email).to_string(),
            };
            sqlx::query("INSERT INTO users (id, email, name, created_at) VALUES (?, ?, ?, ?)")
                .bind(&user.id)
                .bind(&user.email)
                .bind(&user.name)
                .bind(now.to_rfc3339())
                .execute(&state.db)
                .await?;
            user
        }
    };

    let token = Uuid::new_v4().to_string();
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(&user.id)
        .bind(now.to_rfc3339())
        .execute(&state.db)
        .await?;

    tracing::info!("Issued session for user {}", user.id);

    Ok(Json(LoginResponse {
        token,
        user_id: user.id,
        email: user.email,
        created_at: now,
    }))
}
