// src/handlers/auth.rs

use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::json;
use sqlx::PgPool;
use validator::Validate;

use crate::{
    config::Config,
    error::{AppError, is_unique_violation},
    models::user::{CreateUserRequest, LoginRequest, Role, User},
    utils::{
        hash::{hash_password, verify_password},
        json::AppJson,
        jwt::{Claims, sign_jwt},
    },
};

/// Registers a new teacher or student.
///
/// Hashes the password using Argon2 before storing it.
/// Returns 201 Created and the user object (excluding password).
pub async fn register(
    State(pool): State<PgPool>,
    AppJson(payload): AppJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    if payload.role == Role::Unknown {
        return Err(AppError::BadRequest(
            "Role must be 'teacher' or 'student'".to_string(),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    let hashed_password = hash_password(&payload.password)?;

    let user = User::insert(&pool, &email, &hashed_password, payload.role)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Email '{}' is already registered", email))
            } else {
                tracing::error!("Failed to register user: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(user_id = %user.id, role = %payload.role, "user registered");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Authenticates a user and returns a JWT token.
pub async fn login(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let email = payload.email.trim().to_lowercase();
    let user = User::find_by_email(&pool, &email).await.map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::from(e)
    })?;

    // Same message for unknown email and wrong password.
    let user = user.ok_or(AppError::AuthError("Invalid email or password".to_string()))?;

    if !verify_password(&payload.password, &user.password)? {
        return Err(AppError::AuthError("Invalid email or password".to_string()));
    }

    let role = user.role();
    let token = sign_jwt(
        user.id,
        &user.email,
        role,
        &config.jwt_secret,
        config.jwt_expiration,
    )?;

    Ok(Json(json!({
        "token": token,
        "type": "Bearer",
        "role": role,
    })))
}

/// Signs the user out.
///
/// Tokens are stateless, so this only acknowledges; the client drops its token.
pub async fn logout(Extension(claims): Extension<Claims>) -> StatusCode {
    tracing::info!(user_id = %claims.sub, "user signed out");
    StatusCode::NO_CONTENT
}

/// Returns the identity carried by the current token.
pub async fn me(Extension(claims): Extension<Claims>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(claims.session()?))
}
