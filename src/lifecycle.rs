// src/lifecycle.rs

//! Quiz lifecycle rules.
//!
//! Everything here is a pure function of its arguments. Callers read the clock
//! once per request and pass `now` in; results must not be cached across requests.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::{quiz::Quiz, response::QuizResponse};

/// Where a quiz stands relative to the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    NotPublished,
    ScheduledFuture,
    Available,
}

/// Classifies `quiz` at instant `now`.
///
/// A schedule exactly equal to `now` counts as available.
pub fn availability(quiz: &Quiz, now: DateTime<Utc>) -> Availability {
    if !quiz.is_published {
        return Availability::NotPublished;
    }
    match quiz.scheduled_at {
        Some(at) if at > now => Availability::ScheduledFuture,
        _ => Availability::Available,
    }
}

/// A quiz shows up in a student's list when it is published and not yet attempted.
/// Schedule state does not matter here.
pub fn visible_to_student(quiz: &Quiz, attempted: &HashSet<Uuid>) -> bool {
    quiz.is_published && !attempted.contains(&quiz.id)
}

pub fn attemptable(quiz: &Quiz, now: DateTime<Utc>, attempted: &HashSet<Uuid>) -> bool {
    visible_to_student(quiz, attempted) && availability(quiz, now) == Availability::Available
}

/// Collects the quiz ids a student has already responded to.
pub fn attempted_quiz_ids(responses: &[QuizResponse]) -> HashSet<Uuid> {
    responses.iter().map(|r| r.quiz_id).collect()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::Duration;

    pub(crate) fn quiz(published: bool, scheduled_at: Option<DateTime<Utc>>) -> Quiz {
        Quiz {
            id: Uuid::new_v4(),
            owner_id: Uuid::new_v4(),
            title: "Algebra I".to_string(),
            description: String::new(),
            duration_minutes: 30,
            is_published: published,
            scheduled_at,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_unscheduled_quiz_is_time_independent() {
        let published = quiz(true, None);
        let draft = quiz(false, None);
        let now = Utc::now();

        for offset in [-10_000, -1, 0, 1, 10_000] {
            let at = now + Duration::days(offset);
            assert_eq!(availability(&published, at), Availability::Available);
            assert_eq!(availability(&draft, at), Availability::NotPublished);
        }
    }

    #[test]
    fn test_schedule_boundary_is_inclusive() {
        let t = Utc::now();
        let q = quiz(true, Some(t));

        assert_eq!(
            availability(&q, t - Duration::seconds(1)),
            Availability::ScheduledFuture
        );
        assert_eq!(availability(&q, t), Availability::Available);
        assert_eq!(
            availability(&q, t + Duration::seconds(1)),
            Availability::Available
        );
    }

    #[test]
    fn test_unpublished_never_visible_even_after_schedule() {
        let now = Utc::now();
        let q = quiz(false, Some(now - Duration::days(3)));

        assert_eq!(availability(&q, now), Availability::NotPublished);
        assert!(!visible_to_student(&q, &HashSet::new()));
        assert!(!attemptable(&q, now, &HashSet::new()));
    }

    #[test]
    fn test_past_schedule_is_attemptable() {
        let now = Utc::now();
        let a = quiz(true, Some(now - Duration::days(1)));

        assert!(attemptable(&a, now, &HashSet::new()));
        assert!(visible_to_student(&a, &HashSet::new()));
    }

    #[test]
    fn test_future_schedule_is_visible_but_not_attemptable() {
        let now = Utc::now();
        let b = quiz(true, Some(now + Duration::days(1)));

        assert_eq!(availability(&b, now), Availability::ScheduledFuture);
        assert!(visible_to_student(&b, &HashSet::new()));
        assert!(!attemptable(&b, now, &HashSet::new()));
    }

    #[test]
    fn test_attempted_quiz_is_excluded() {
        let now = Utc::now();
        let schedules = [
            None,
            Some(now - Duration::hours(2)),
            Some(now),
            Some(now + Duration::days(1)),
        ];

        for scheduled_at in schedules {
            let c = quiz(true, scheduled_at);
            let attempted = HashSet::from([c.id]);

            assert!(!visible_to_student(&c, &attempted), "{:?}", scheduled_at);
            assert!(!attemptable(&c, now, &attempted), "{:?}", scheduled_at);
        }
    }

    #[test]
    fn test_attempted_quiz_ids_from_responses() {
        let quiz_id = Uuid::new_v4();
        let responses = vec![QuizResponse {
            id: Uuid::new_v4(),
            quiz_id,
            user_id: Uuid::new_v4(),
            total_marks: 75.0,
            submitted_at: Utc::now(),
        }];

        let ids = attempted_quiz_ids(&responses);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains(&quiz_id));
    }
}
