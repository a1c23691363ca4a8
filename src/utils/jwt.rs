// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{auth::RequestContext, config::Config, error::AppError, models::user::Role};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - the user id as a string.
    pub sub: String,
    pub role: Role,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn context(&self) -> Result<RequestContext, AppError> {
        let user_id = self
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

        Ok(RequestContext {
            user_id,
            role: self.role,
        })
    }
}

/// Signs a token carrying the user id and role.
pub fn sign_jwt(
    user_id: i64,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs();

    let claims = Claims {
        sub: user_id.to_string(),
        role,
        exp: (now + expiration_seconds) as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a token. Any failure is reported as 401.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))
}

/// Axum middleware: authentication.
///
/// Validates the `Authorization: Bearer <token>` header and injects a
/// `RequestContext` into the request extensions. Role checks are left to
/// the handlers (`auth::requires_role`).
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::AuthError("Missing bearer token".to_string()))?;

    let ctx = verify_jwt(token, &config.jwt_secret)?.context()?;
    req.extensions_mut().insert(ctx);

    Ok(next.run(req).await)
}
