// src/models/result.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Represents the 'results' table: one immutable row per quiz attempt.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: i64,
    pub student_id: i64,
    pub quiz_id: i64,
    pub score: i64,
    /// Question count of the quiz when the attempt was graded.
    pub total: i64,
    pub taken_at: DateTime<Utc>,
}

/// A result joined with the quiz title and student username for listings.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ResultView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub record: ResultRecord,
    pub quiz_title: String,
    pub student_username: String,
}

/// Body of `POST /api/student/quizzes/{id}/submit`.
///
/// Key: question id. Value: submitted letter, `null` or absent when skipped.
#[derive(Debug, Default, Deserialize)]
pub struct SubmitAnswersRequest {
    #[serde(default)]
    pub answers: HashMap<i64, Option<String>>,
}

/// Per-question feedback returned after a submission.
#[derive(Debug, Clone, Serialize)]
pub struct QuestionReview {
    pub question_id: i64,
    pub text: String,
    pub submitted: Option<String>,
    pub correct: String,
    pub is_correct: bool,
}

/// Outcome of grading and recording one attempt.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    pub result: ResultRecord,
    pub score: i64,
    pub total: i64,
    pub percentage: f64,
    pub review: Vec<QuestionReview>,
}
