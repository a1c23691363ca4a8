// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::RequestContext,
    config::Config,
    db::users,
    error::AppError,
    models::user::{LoginRequest, MeResponse, RegisterRequest, Role},
    utils::{
        jwt::sign_jwt,
        password::{hash_password, verify_password},
    },
};

/// Registers a new student account.
///
/// The role is always `student`; admins are created by other admins.
pub async fn register(
    State(pool): State<SqlitePool>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username and password are required".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = users::create_user(&pool, username, &hashed_password, Role::Student)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("User '{}' already exists", username)))?;

    tracing::info!(user_id = user.id, "Registered student '{}'", user.username);

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a bearer token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user = users::find_by_username(&pool, payload.username.trim())
        .await?
        .ok_or_else(|| AppError::AuthError("Invalid username or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid username or password".to_string()));
    }

    if !user.is_active {
        return Err(AppError::Forbidden(
            "Your account is inactive. Contact the admin.".to_string(),
        ));
    }

    let token = sign_jwt(user.id, user.role, &config.jwt_secret, config.jwt_expiration)?;

    tracing::info!(user_id = user.id, role = %user.role, "Login successful");

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": user.role,
        "dashboard": user.role.dashboard_path(),
    })))
}

/// Returns the caller's identity and the dashboard matching their role.
pub async fn me(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    let user = users::find_user(&pool, ctx.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(Json(MeResponse {
        user_id: user.id,
        username: user.username,
        role: user.role,
        dashboard: user.role.dashboard_path(),
    }))
}
