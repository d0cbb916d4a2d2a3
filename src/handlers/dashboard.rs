// src/handlers/dashboard.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::PgPool;

use crate::{
    aggregation::{quiz_counts, recent_results, responses_received, student_stats},
    config::Config,
    error::AppError,
    handlers::quiz::{owned_quizzes, student_quizzes},
    lifecycle::attempted_quiz_ids,
    models::{
        dashboard::DashboardView,
        quiz::Quiz,
        response::QuizResponse,
        user::Role,
    },
    utils::jwt::Claims,
};

/// Role-dispatched dashboard.
///
/// Fetches the raw records for the caller's role, then runs them through the
/// lifecycle and aggregation rules. The clock is read once per request.
pub async fn get_dashboard(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let session = claims.session()?;
    let now = Utc::now();

    let view = match session.role {
        Role::Teacher => {
            let summaries = Quiz::by_owner(&pool, session.id).await?;
            let quizzes: Vec<Quiz> = summaries.iter().map(|s| s.quiz.clone()).collect();

            DashboardView::Teacher {
                counts: quiz_counts(&quizzes),
                responses_received: responses_received(&summaries),
                quizzes: owned_quizzes(summaries, now),
            }
        }
        Role::Student => {
            let published = Quiz::published(&pool).await?;
            let completed = QuizResponse::by_user(&pool, session.id).await?;
            let attempted = attempted_quiz_ids(&completed);

            DashboardView::Student {
                stats: student_stats(&published, &completed),
                available: student_quizzes(&published, &attempted, now),
                recent_results: recent_results(&completed, config.recent_results_limit)
                    .into_iter()
                    .cloned()
                    .collect(),
            }
        }
        Role::Unknown => {
            tracing::warn!(user_id = %session.id, "dashboard requested with unknown role");
            DashboardView::UnknownRole
        }
    };

    Ok(Json(view))
}
