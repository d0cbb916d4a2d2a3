// src/models/quiz.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, lifecycle::Availability, utils::html::clean_html};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,

    /// The teacher who authored the quiz.
    pub owner_id: Uuid,

    pub title: String,
    pub description: String,

    /// Time allowed for an attempt, in minutes. Always positive.
    pub duration_minutes: i32,

    /// Draft (false) or published (true).
    pub is_published: bool,

    /// When set, students cannot start the quiz before this instant.
    pub scheduled_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

/// A quiz row with its response count joined in by the store.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct QuizSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub quiz: Quiz,
    pub response_count: i64,
}

/// Teacher-facing quiz entry with its current lifecycle state.
#[derive(Debug, Serialize)]
pub struct OwnedQuiz {
    #[serde(flatten)]
    pub summary: QuizSummary,
    pub availability: Availability,
}

/// Student-facing quiz entry.
#[derive(Debug, Serialize)]
pub struct StudentQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub availability: Availability,
    pub attemptable: bool,
}

/// DTO for creating a draft quiz.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(
        min = 1,
        max = 200,
        message = "Title length must be between 1 and 200 chars"
    ))]
    pub title: String,
    #[validate(length(max = 5000))]
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 1, max = 1440, message = "Duration must be between 1 and 1440 minutes"))]
    pub duration_minutes: i32,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl CreateQuizRequest {
    /// Cleans title and description, then validates what will actually be stored.
    /// Escaping can lengthen the text, so limits apply to the cleaned form.
    pub fn sanitized(mut self) -> Result<Self, AppError> {
        self.title = clean_html(self.title.trim());
        self.description = clean_html(&self.description);
        self.validate()?;
        Ok(self)
    }
}

const QUIZ_COLUMNS: &str =
    "q.id, q.owner_id, q.title, q.description, q.duration_minutes, q.is_published, q.scheduled_at, q.created_at";

impl Quiz {
    pub async fn find(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Self>> {
        let sql = format!("SELECT {QUIZ_COLUMNS} FROM quizzes q WHERE q.id = $1");
        sqlx::query_as::<_, Quiz>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Published quizzes, newest first. Attempt filtering happens in the lifecycle rules.
    pub async fn published(pool: &PgPool) -> sqlx::Result<Vec<Self>> {
        let sql = format!(
            "SELECT {QUIZ_COLUMNS} FROM quizzes q WHERE q.is_published = TRUE ORDER BY q.created_at DESC"
        );
        sqlx::query_as::<_, Quiz>(&sql).fetch_all(pool).await
    }

    /// Quizzes authored by `owner_id` with their response counts, newest first.
    pub async fn by_owner(pool: &PgPool, owner_id: Uuid) -> sqlx::Result<Vec<QuizSummary>> {
        let sql = format!(
            r#"
            SELECT {QUIZ_COLUMNS},
                (SELECT COUNT(*) FROM responses r WHERE r.quiz_id = q.id) AS response_count
            FROM quizzes q
            WHERE q.owner_id = $1
            ORDER BY q.created_at DESC
            "#
        );
        sqlx::query_as::<_, QuizSummary>(&sql)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Inserts a new quiz in draft state.
    pub async fn create_draft(
        pool: &PgPool,
        owner_id: Uuid,
        req: &CreateQuizRequest,
    ) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Quiz>(
            r#"
            INSERT INTO quizzes (id, owner_id, title, description, duration_minutes, is_published, scheduled_at)
            VALUES ($1, $2, $3, $4, $5, FALSE, $6)
            RETURNING id, owner_id, title, description, duration_minutes, is_published, scheduled_at, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.duration_minutes)
        .bind(req.scheduled_at)
        .fetch_one(pool)
        .await
    }

    /// Flips the publication flag. Publishing an already-published quiz is a no-op.
    pub async fn publish(pool: &PgPool, id: Uuid, owner_id: Uuid) -> sqlx::Result<Option<Self>> {
        sqlx::query_as::<_, Quiz>(
            r#"
            UPDATE quizzes SET is_published = TRUE
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, title, description, duration_minutes, is_published, scheduled_at, created_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(pool)
        .await
    }
}
