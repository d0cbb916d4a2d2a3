// src/aggregation.rs

//! Dashboard statistics derived from already-fetched records.

use serde::Serialize;

use crate::{
    lifecycle::{attempted_quiz_ids, visible_to_student},
    models::{
        quiz::{Quiz, QuizSummary},
        response::QuizResponse,
    },
};

/// Number of recent results shown when the caller does not ask for a limit.
pub const DEFAULT_RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct QuizCounts {
    pub total: usize,
    pub published: usize,
    /// Quizzes carrying any schedule, elapsed or not.
    pub scheduled: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StudentStats {
    pub available_count: usize,
    pub completed_count: usize,
    /// Mean of `total_marks`, rounded to the nearest integer. Zero with no responses.
    pub average_score: i64,
}

pub fn quiz_counts(quizzes: &[Quiz]) -> QuizCounts {
    quizzes.iter().fold(QuizCounts::default(), |mut acc, q| {
        acc.total += 1;
        if q.is_published {
            acc.published += 1;
        }
        if q.scheduled_at.is_some() {
            acc.scheduled += 1;
        }
        acc
    })
}

/// `available` is the published set from the store; attempted quizzes are dropped here.
pub fn student_stats(available: &[Quiz], completed: &[QuizResponse]) -> StudentStats {
    let attempted = attempted_quiz_ids(completed);
    let available_count = available
        .iter()
        .filter(|q| visible_to_student(q, &attempted))
        .count();

    StudentStats {
        available_count,
        completed_count: completed.len(),
        average_score: average_score(completed),
    }
}

fn average_score(responses: &[QuizResponse]) -> i64 {
    if responses.is_empty() {
        return 0;
    }
    let sum: f64 = responses.iter().map(|r| r.total_marks).sum();
    (sum / responses.len() as f64).round() as i64
}

/// Total responses across a teacher's quizzes, from counts the store already joined in.
pub fn responses_received(summaries: &[QuizSummary]) -> i64 {
    summaries.iter().map(|s| s.response_count).sum()
}

/// Most-recent-first view over a set of responses, capped at `limit`.
///
/// Holds a sorted list of references, so the caller's slice keeps its order.
/// Iterate it as many times as needed.
#[derive(Debug, Clone)]
pub struct RecentResults<'a> {
    sorted: Vec<&'a QuizResponse>,
    limit: usize,
}

impl<'a> RecentResults<'a> {
    pub fn iter(&self) -> impl Iterator<Item = &'a QuizResponse> + '_ {
        self.sorted.iter().copied().take(self.limit)
    }

    pub fn len(&self) -> usize {
        self.sorted.len().min(self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<'a> IntoIterator for RecentResults<'a> {
    type Item = &'a QuizResponse;
    type IntoIter = std::iter::Take<std::vec::IntoIter<&'a QuizResponse>>;

    fn into_iter(self) -> Self::IntoIter {
        self.sorted.into_iter().take(self.limit)
    }
}

pub fn recent_results(completed: &[QuizResponse], limit: usize) -> RecentResults<'_> {
    let mut sorted: Vec<&QuizResponse> = completed.iter().collect();
    sorted.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    RecentResults { sorted, limit }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::tests::quiz;
    use chrono::{Duration, Utc};
    use uuid::Uuid;

    fn response(quiz_id: Uuid, marks: f64, minutes_ago: i64) -> QuizResponse {
        QuizResponse {
            id: Uuid::new_v4(),
            quiz_id,
            user_id: Uuid::new_v4(),
            total_marks: marks,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn test_quiz_counts_empty() {
        assert_eq!(
            quiz_counts(&[]),
            QuizCounts {
                total: 0,
                published: 0,
                scheduled: 0
            }
        );
    }

    #[test]
    fn test_quiz_counts_includes_elapsed_schedules() {
        let now = Utc::now();
        let quizzes = vec![
            quiz(true, None),
            quiz(true, Some(now - Duration::days(2))),
            quiz(false, Some(now + Duration::days(2))),
            quiz(false, None),
        ];

        let counts = quiz_counts(&quizzes);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.published, 2);
        assert_eq!(counts.scheduled, 2);
    }

    #[test]
    fn test_student_stats_no_responses() {
        let quizzes = vec![quiz(true, None), quiz(true, None)];
        let stats = student_stats(&quizzes, &[]);

        assert_eq!(stats.available_count, 2);
        assert_eq!(stats.completed_count, 0);
        assert_eq!(stats.average_score, 0);
    }

    #[test]
    fn test_student_stats_average_and_exclusion() {
        let quizzes = vec![quiz(true, None), quiz(true, None), quiz(true, None), quiz(true, None)];
        let responses = vec![
            response(quizzes[0].id, 80.0, 3),
            response(quizzes[1].id, 90.0, 2),
            response(Uuid::new_v4(), 70.0, 1),
        ];

        let stats = student_stats(&quizzes, &responses);
        assert_eq!(stats.available_count, 2);
        assert_eq!(stats.completed_count, 3);
        assert_eq!(stats.average_score, 80);
    }

    #[test]
    fn test_average_rounds_to_nearest() {
        let id = Uuid::new_v4();
        let responses = vec![response(id, 70.0, 2), response(id, 75.0, 1)];
        // 72.5 rounds up
        assert_eq!(student_stats(&[], &responses).average_score, 73);

        let responses = vec![response(id, 70.0, 2), response(id, 74.0, 1), response(id, 74.0, 0)];
        // 72.67
        assert_eq!(student_stats(&[], &responses).average_score, 73);
    }

    #[test]
    fn test_recent_results_truncates_and_preserves_input() {
        let id = Uuid::new_v4();
        // Oldest first so sorting has work to do.
        let responses: Vec<QuizResponse> = (0..7)
            .map(|i| response(id, 50.0 + i as f64, 100 - i * 10))
            .collect();
        let before = responses.clone();

        let recent = recent_results(&responses, 5);
        let out: Vec<&QuizResponse> = recent.iter().collect();

        assert_eq!(out.len(), 5);
        assert_eq!(recent.len(), 5);
        for pair in out.windows(2) {
            assert!(pair[0].submitted_at >= pair[1].submitted_at);
        }
        assert_eq!(out[0].id, responses[6].id);
        assert_eq!(responses, before);

        // Restartable.
        assert_eq!(recent.iter().count(), 5);
        assert_eq!(recent.into_iter().count(), 5);
    }

    #[test]
    fn test_recent_results_fewer_than_limit() {
        let responses = vec![response(Uuid::new_v4(), 10.0, 1)];
        let recent = recent_results(&responses, DEFAULT_RECENT_LIMIT);
        assert_eq!(recent.len(), 1);
        assert!(recent_results(&[], DEFAULT_RECENT_LIMIT).is_empty());
    }

    #[test]
    fn test_responses_received_sums_counts() {
        let summaries = vec![
            QuizSummary {
                quiz: quiz(true, None),
                response_count: 4,
            },
            QuizSummary {
                quiz: quiz(false, None),
                response_count: 0,
            },
            QuizSummary {
                quiz: quiz(true, None),
                response_count: 3,
            },
        ];
        assert_eq!(responses_received(&summaries), 7);
    }
}
