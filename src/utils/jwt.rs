// src/utils/jwt.rs

use std::time::{SystemTime, UNIX_EPOCH};

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, header},
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::Config,
    error::AppError,
    models::user::{Role, Session},
};

/// JWT Claims structure.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Claims {
    /// Subject - Stores the User ID.
    pub sub: String,
    pub email: String,
    /// User's role tag ('teacher' or 'student').
    pub role: String,
    /// Expiration time as Unix timestamp.
    pub exp: usize,
}

impl Claims {
    pub fn role(&self) -> Role {
        Role::from_tag(&self.role)
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::AuthError("Invalid token subject".to_string()))
    }

    pub fn session(&self) -> Result<Session, AppError> {
        Ok(Session {
            id: self.user_id()?,
            email: self.email.clone(),
            role: self.role(),
        })
    }
}

/// Signs a new JWT for the user.
pub fn sign_jwt(
    id: Uuid,
    email: &str,
    role: Role,
    secret: &str,
    expiration_seconds: u64,
) -> Result<String, AppError> {
    let expiration = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?
        .as_secs() as usize
        + expiration_seconds as usize;

    let claims = Claims {
        sub: id.to_string(),
        email: email.to_owned(),
        role: role.as_str().to_owned(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(e.to_string()))
}

/// Verifies and decodes a JWT string.
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, AppError> {
    let token_data = decode(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::AuthError("Invalid token".to_string()))?;

    Ok(token_data.claims)
}

/// Axum Middleware: Authentication.
///
/// Validates the 'Authorization: Bearer <token>' header and injects `Claims`
/// into the request extensions. Returns 401 otherwise.
pub async fn auth_middleware(
    State(config): State<Config>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = match auth_header.and_then(|h| h.strip_prefix("Bearer ")) {
        Some(token) => token,
        None => return Err(StatusCode::UNAUTHORIZED),
    };

    match verify_jwt(token, &config.jwt_secret) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            Ok(next.run(req).await)
        }
        Err(_) => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn require_role(role: Role, req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if claims.role() != role {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

/// Axum Middleware: teacher-only routes. Must be used AFTER `auth_middleware`.
pub async fn teacher_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    require_role(Role::Teacher, req, next).await
}

/// Axum Middleware: student-only routes. Must be used AFTER `auth_middleware`.
pub async fn student_middleware(req: Request<Body>, next: Next) -> Result<Response, StatusCode> {
    require_role(Role::Student, req, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify_round_trip() {
        let id = Uuid::new_v4();
        let token = sign_jwt(id, "ada@example.com", Role::Teacher, "secret", 60).unwrap();
        let claims = verify_jwt(&token, "secret").unwrap();

        let session = claims.session().unwrap();
        assert_eq!(session.id, id);
        assert_eq!(session.email, "ada@example.com");
        assert_eq!(session.role, Role::Teacher);
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = sign_jwt(Uuid::new_v4(), "a@b.io", Role::Student, "one", 60).unwrap();
        assert!(matches!(verify_jwt(&token, "two"), Err(AppError::AuthError(_))));
    }
}
