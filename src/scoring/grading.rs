// src/scoring/grading.rs

use std::collections::HashMap;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqlitePool;

use crate::{
    db::{questions, quizzes, results, users},
    error::AppError,
    models::{
        question::Question,
        result::{QuestionReview, SubmissionOutcome},
    },
    scoring::percentage,
};

/// Score of one graded submission. `0 <= score <= total` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Grade {
    pub score: i64,
    pub total: i64,
}

impl Grade {
    pub fn percentage(&self) -> f64 {
        percentage(self.score, self.total)
    }
}

/// Compares a submitted letter with the correct one, ignoring case and
/// surrounding whitespace. No answer is never correct.
pub fn is_correct(submitted: Option<&str>, correct: &str) -> bool {
    match submitted {
        Some(answer) => {
            let answer = answer.trim();
            !answer.is_empty() && answer.eq_ignore_ascii_case(correct.trim())
        }
        None => false,
    }
}

fn submitted_for<'a>(answers: &'a HashMap<i64, Option<String>>, question_id: i64) -> Option<&'a str> {
    answers.get(&question_id).and_then(|a| a.as_deref())
}

/// Grades answers against a quiz's questions.
///
/// `total` is the number of questions. Answers for ids that are not part
/// of `questions` are ignored; missing or null answers count as wrong.
pub fn grade(questions: &[Question], answers: &HashMap<i64, Option<String>>) -> Grade {
    let score = questions
        .iter()
        .filter(|q| is_correct(submitted_for(answers, q.id), &q.correct))
        .count();

    Grade {
        score: score as i64,
        total: questions.len() as i64,
    }
}

/// Per-question feedback in quiz order.
pub fn review(questions: &[Question], answers: &HashMap<i64, Option<String>>) -> Vec<QuestionReview> {
    questions
        .iter()
        .map(|q| {
            let submitted = submitted_for(answers, q.id);
            QuestionReview {
                question_id: q.id,
                text: q.text.clone(),
                submitted: submitted.map(str::to_owned),
                correct: q.correct.clone(),
                is_correct: is_correct(submitted, &q.correct),
            }
        })
        .collect()
}

/// Grades a student's submission for a quiz and stores it as a new result.
///
/// Checks both ids, reads the questions and appends the result in one
/// transaction, so the stored `total` matches the questions that were
/// graded. Earlier attempts are left untouched. A missing student or quiz
/// is `AppError::NotFound` and writes nothing.
pub async fn grade_submission(
    pool: &SqlitePool,
    student_id: i64,
    quiz_id: i64,
    answers: &HashMap<i64, Option<String>>,
) -> Result<SubmissionOutcome, AppError> {
    let mut tx = pool.begin().await?;

    if users::find_user(&mut *tx, student_id).await?.is_none() {
        tx.rollback().await?;
        return Err(AppError::NotFound("Student not found".to_string()));
    }

    if quizzes::find_quiz(&mut *tx, quiz_id).await?.is_none() {
        tx.rollback().await?;
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    let questions = questions::questions_for_quiz(&mut *tx, quiz_id).await?;
    let graded = grade(&questions, answers);

    let result = results::record_result(
        &mut *tx,
        student_id,
        quiz_id,
        graded.score,
        graded.total,
        Utc::now(),
    )
    .await?;

    tx.commit().await?;

    Ok(SubmissionOutcome {
        result,
        score: graded.score,
        total: graded.total,
        percentage: graded.percentage(),
        review: review(&questions, answers),
    })
}
