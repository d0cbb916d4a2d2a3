// src/models/user.rs

use std::fmt;

use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// Closed set of roles a session can carry.
/// Anything other than the two stored roles is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Teacher,
    Student,
    #[serde(other)]
    Unknown,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Teacher => "teacher",
            Role::Student => "student",
            Role::Unknown => "unknown",
        }
    }

    /// Parses a stored role tag. Never fails.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "teacher" => Role::Teacher,
            "student" => Role::Student,
            _ => Role::Unknown,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents the 'users' table in the database.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: Uuid,

    /// Unique login email.
    pub email: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password: String,

    /// Stored role tag: 'teacher' or 'student'.
    pub role: String,

    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl User {
    pub fn role(&self) -> Role {
        Role::from_tag(&self.role)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, User>(
            "SELECT id, email, password, role, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn insert(
        pool: &PgPool,
        email: &str,
        password_hash: &str,
        role: Role,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password, role, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(role.as_str())
        .fetch_one(pool)
        .await
    }
}

/// Identity of the signed-in user, as seen by handlers.
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
}

/// DTO for creating a new user (sign-up).
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "A valid email address is required."))]
    pub email: String,
    #[validate(length(
        min = 6,
        max = 128,
        message = "Password length must be between 6 and 128 characters."
    ))]
    pub password: String,
    pub role: Role,
}

/// DTO for user login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 254))]
    pub email: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
