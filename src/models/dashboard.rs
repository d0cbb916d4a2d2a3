// src/models/dashboard.rs

use serde::Serialize;

use crate::{
    aggregation::{QuizCounts, StudentStats},
    models::{
        quiz::{OwnedQuiz, StudentQuiz},
        response::QuizResponse,
    },
};

/// What the dashboard endpoint renders, chosen once from the session role.
#[derive(Debug, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DashboardView {
    Teacher {
        counts: QuizCounts,
        responses_received: i64,
        quizzes: Vec<OwnedQuiz>,
    },
    Student {
        stats: StudentStats,
        available: Vec<StudentQuiz>,
        recent_results: Vec<QuizResponse>,
    },
    UnknownRole,
}
