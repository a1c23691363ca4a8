// src/models/quiz.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::models::question::{CreateQuestionRequest, PublicQuestion, Question};

/// Represents the 'quizzes' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Quiz {
    pub id: i64,
    /// Unique title.
    pub title: String,
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
}

/// Partial update. Blank fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuizRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

/// Creates a quiz together with all of its questions.
#[derive(Debug, Deserialize, Validate)]
pub struct ImportQuizRequest {
    #[validate(length(min = 1, max = 200, message = "Title is required (max 200 characters)."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 5000))]
    pub description: String,
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
}

/// Admin view of a quiz, answers included.
#[derive(Debug, Serialize)]
pub struct QuizDetail {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

/// Student view of a quiz, answers hidden.
#[derive(Debug, Serialize)]
pub struct PublicQuiz {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<PublicQuestion>,
}
