// src/handlers/quiz.rs

use std::collections::HashSet;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    aggregation::recent_results,
    config::Config,
    error::{AppError, is_unique_violation},
    lifecycle::{Availability, attemptable, attempted_quiz_ids, availability, visible_to_student},
    models::{
        quiz::{CreateQuizRequest, OwnedQuiz, Quiz, QuizSummary, StudentQuiz},
        response::{QuizResponse, RecentResultsParams, SubmitResponseRequest},
    },
    utils::{json::AppJson, jwt::Claims},
};

/// Upper bound for the `limit` query parameter on result listings.
const MAX_RESULTS_LIMIT: usize = 50;

/// Tags each of a teacher's quizzes with its state at `now`.
pub(crate) fn owned_quizzes(summaries: Vec<QuizSummary>, now: DateTime<Utc>) -> Vec<OwnedQuiz> {
    summaries
        .into_iter()
        .map(|summary| OwnedQuiz {
            availability: availability(&summary.quiz, now),
            summary,
        })
        .collect()
}

/// Keeps the quizzes a student should see and marks which can be started now.
pub(crate) fn student_quizzes(
    published: &[Quiz],
    attempted: &HashSet<Uuid>,
    now: DateTime<Utc>,
) -> Vec<StudentQuiz> {
    published
        .iter()
        .filter(|q| visible_to_student(q, attempted))
        .map(|q| StudentQuiz {
            quiz: q.clone(),
            availability: availability(q, now),
            attemptable: attemptable(q, now, attempted),
        })
        .collect()
}

/// Loads a quiz and checks that `owner_id` authored it.
async fn owned_quiz(pool: &PgPool, id: Uuid, owner_id: Uuid) -> Result<Quiz, AppError> {
    let quiz = Quiz::find(pool, id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    if quiz.owner_id != owner_id {
        return Err(AppError::Forbidden("You do not own this quiz".to_string()));
    }
    Ok(quiz)
}

/// Creates a quiz in draft state.
/// Teacher only.
pub async fn create_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    AppJson(payload): AppJson<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    let payload = payload.sanitized()?;

    let owner_id = claims.user_id()?;
    let quiz = Quiz::create_draft(&pool, owner_id, &payload)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create quiz: {:?}", e);
            AppError::from(e)
        })?;

    tracing::info!(quiz_id = %quiz.id, owner_id = %owner_id, "draft quiz created");

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Publishes a quiz the caller owns. Publishing twice is harmless.
/// Teacher only.
pub async fn publish_quiz(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;

    match Quiz::publish(&pool, id, owner_id).await? {
        Some(quiz) => {
            tracing::info!(quiz_id = %quiz.id, "quiz published");
            Ok(Json(quiz))
        }
        // Nothing updated: either missing or someone else's.
        None => Err(owned_quiz(&pool, id, owner_id)
            .await
            .err()
            .unwrap_or(AppError::NotFound("Quiz not found".to_string()))),
    }
}

/// Lists the caller's quizzes with response counts and current availability.
/// Teacher only.
pub async fn list_my_quizzes(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let summaries = Quiz::by_owner(&pool, owner_id).await?;

    Ok(Json(owned_quizzes(summaries, Utc::now())))
}

/// Lists the responses submitted to one of the caller's quizzes, newest first.
/// Teacher only.
pub async fn list_quiz_responses(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let owner_id = claims.user_id()?;
    let quiz = owned_quiz(&pool, id, owner_id).await?;
    let responses = QuizResponse::by_quiz(&pool, quiz.id).await?;

    Ok(Json(responses))
}

/// Lists published quizzes the student has not attempted yet.
/// Student only.
pub async fn list_available(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let published = Quiz::published(&pool).await?;
    let completed = QuizResponse::by_user(&pool, user_id).await?;
    let attempted = attempted_quiz_ids(&completed);

    Ok(Json(student_quizzes(&published, &attempted, Utc::now())))
}

/// Records the student's one and only response to a quiz.
///
/// * 404 if the quiz is missing or still a draft.
/// * 409 if the student already submitted.
/// * 403 if the quiz is scheduled for later.
///
/// Student only.
pub async fn submit_response(
    State(pool): State<PgPool>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    AppJson(payload): AppJson<SubmitResponseRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let user_id = claims.user_id()?;
    let quiz = Quiz::find(&pool, id)
        .await?
        .ok_or(AppError::NotFound("Quiz not found".to_string()))?;

    let attempted: HashSet<Uuid> = QuizResponse::find_for(&pool, quiz.id, user_id)
        .await?
        .map(|r| r.quiz_id)
        .into_iter()
        .collect();

    let now = Utc::now();
    if !attemptable(&quiz, now, &attempted) {
        if attempted.contains(&quiz.id) {
            return Err(AppError::Conflict(
                "You have already completed this quiz".to_string(),
            ));
        }
        return Err(match availability(&quiz, now) {
            Availability::ScheduledFuture => {
                AppError::Forbidden("This quiz is not open yet".to_string())
            }
            _ => AppError::NotFound("Quiz not found".to_string()),
        });
    }

    let response = QuizResponse::insert(&pool, quiz.id, user_id, payload.total_marks)
        .await
        .map_err(|e| {
            // Lost a race with a concurrent submission.
            if is_unique_violation(&e) {
                AppError::Conflict("You have already completed this quiz".to_string())
            } else {
                tracing::error!("Failed to insert response: {:?}", e);
                AppError::from(e)
            }
        })?;

    tracing::info!(quiz_id = %quiz.id, user_id = %user_id, "response submitted");

    Ok((StatusCode::CREATED, Json(response)))
}

/// Lists the student's most recent results.
/// Student only.
pub async fn list_my_results(
    State(pool): State<PgPool>,
    State(config): State<Config>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<RecentResultsParams>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let limit = params
        .limit
        .unwrap_or(config.recent_results_limit)
        .min(MAX_RESULTS_LIMIT);

    let completed = QuizResponse::by_user(&pool, user_id).await?;
    let recent: Vec<QuizResponse> = recent_results(&completed, limit)
        .into_iter()
        .cloned()
        .collect();

    Ok(Json(recent))
}
