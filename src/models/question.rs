// src/models/question.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// The four answer letters a question can have.
pub const CHOICE_LETTERS: [&str; 4] = ["A", "B", "C", "D"];

/// Represents the 'questions' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub quiz_id: i64,
    pub text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    /// Always one of `A`..`D`, upper case.
    pub correct: String,
}

/// Question as shown to a student taking the quiz (no `correct`).
#[derive(Debug, Clone, Serialize)]
pub struct PublicQuestion {
    pub id: i64,
    pub text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
}

impl From<Question> for PublicQuestion {
    fn from(q: Question) -> Self {
        Self {
            id: q.id,
            text: q.text,
            choice_a: q.choice_a,
            choice_b: q.choice_b,
            choice_c: q.choice_c,
            choice_d: q.choice_d,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub text: String,
    #[validate(length(min = 1, max = 300))]
    pub choice_a: String,
    #[validate(length(min = 1, max = 300))]
    pub choice_b: String,
    #[validate(length(min = 1, max = 300))]
    pub choice_c: String,
    #[validate(length(min = 1, max = 300))]
    pub choice_d: String,
    #[validate(custom(function = validate_choice_letter))]
    pub correct: String,
}

/// Partial update. Blank fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuestionRequest {
    pub text: Option<String>,
    pub choice_a: Option<String>,
    pub choice_b: Option<String>,
    pub choice_c: Option<String>,
    pub choice_d: Option<String>,
    pub correct: Option<String>,
}

/// Trims and upper-cases an answer letter, rejecting anything outside `A`..`D`.
pub fn normalize_choice(raw: &str) -> Option<String> {
    let letter = raw.trim().to_ascii_uppercase();
    CHOICE_LETTERS.contains(&letter.as_str()).then_some(letter)
}

pub fn validate_choice_letter(raw: &str) -> Result<(), ValidationError> {
    match normalize_choice(raw) {
        Some(_) => Ok(()),
        None => Err(ValidationError::new("correct_must_be_a_to_d")
            .with_message("Correct answer must be one of A, B, C, D.".into())),
    }
}
