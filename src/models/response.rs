// src/models/response.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

/// Represents the 'responses' table in the database.
/// A student's single, immutable submission for a quiz.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct QuizResponse {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub user_id: Uuid,

    /// Percentage score in [0, 100].
    pub total_marks: f64,

    pub submitted_at: DateTime<Utc>,
}

/// DTO for submitting a quiz attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitResponseRequest {
    #[validate(range(min = 0.0, max = 100.0, message = "Marks must be between 0 and 100"))]
    pub total_marks: f64,
}

/// Query parameters for the recent results listing.
#[derive(Debug, Deserialize)]
pub struct RecentResultsParams {
    pub limit: Option<usize>,
}

impl QuizResponse {
    /// All responses submitted by `user_id`, newest first.
    pub async fn by_user(pool: &PgPool, user_id: Uuid) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            SELECT id, quiz_id, user_id, total_marks, submitted_at
            FROM responses
            WHERE user_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }

    pub async fn by_quiz(pool: &PgPool, quiz_id: Uuid) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            SELECT id, quiz_id, user_id, total_marks, submitted_at
            FROM responses
            WHERE quiz_id = $1
            ORDER BY submitted_at DESC
            "#,
        )
        .bind(quiz_id)
        .fetch_all(pool)
        .await
    }

    /// The student's response to one quiz, if they have submitted it.
    pub async fn find_for(
        pool: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
    ) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            SELECT id, quiz_id, user_id, total_marks, submitted_at
            FROM responses
            WHERE quiz_id = $1 AND user_id = $2
            "#,
        )
        .bind(quiz_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Records a submission. The (quiz_id, user_id) unique constraint rejects a second attempt.
    pub async fn insert(
        pool: &PgPool,
        quiz_id: Uuid,
        user_id: Uuid,
        total_marks: f64,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, QuizResponse>(
            r#"
            INSERT INTO responses (id, quiz_id, user_id, total_marks)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quiz_id, user_id, total_marks, submitted_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(quiz_id)
        .bind(user_id)
        .bind(total_marks)
        .fetch_one(pool)
        .await
    }
}
