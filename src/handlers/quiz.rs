// src/handlers/quiz.rs

//! Quiz and question authoring. Admin only.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::{RequestContext, requires_role},
    db::{
        questions::{self, NewQuestion, QuestionChanges},
        quizzes, results,
    },
    error::AppError,
    models::{
        provided,
        question::{CreateQuestionRequest, UpdateQuestionRequest, normalize_choice},
        quiz::{CreateQuizRequest, ImportQuizRequest, QuizDetail, UpdateQuizRequest},
        user::Role,
    },
    scoring::{analytics, round_to},
    utils::html::sanitize_text,
};

fn new_question(payload: &CreateQuestionRequest) -> NewQuestion {
    NewQuestion {
        text: sanitize_text(&payload.text),
        choice_a: sanitize_text(&payload.choice_a),
        choice_b: sanitize_text(&payload.choice_b),
        choice_c: sanitize_text(&payload.choice_c),
        choice_d: sanitize_text(&payload.choice_d),
        correct: payload.correct.clone(),
    }
}

/// Creates a quiz. A duplicate title is rejected with 409.
pub async fn create_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<CreateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;
    payload.validate()?;

    let title = sanitize_text(&payload.title);
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let quiz = quizzes::add_quiz(&pool, &title, &sanitize_text(&payload.description))
        .await?
        .ok_or_else(|| AppError::Conflict("Quiz with this title already exists.".to_string()))?;

    tracing::info!(admin_id = ctx.user_id, quiz_id = quiz.id, "Quiz '{}' added", quiz.title);

    Ok((StatusCode::CREATED, Json(quiz)))
}

/// Creates a quiz with all its questions in a single transaction.
pub async fn import_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<ImportQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;
    payload.validate()?;

    let title = sanitize_text(&payload.title);
    if title.is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let new_questions: Vec<NewQuestion> = payload.questions.iter().map(new_question).collect();

    let detail = quizzes::import_quiz(
        &pool,
        &title,
        &sanitize_text(&payload.description),
        &new_questions,
    )
    .await?
    .ok_or_else(|| AppError::Conflict("Quiz with this title already exists.".to_string()))?;

    tracing::info!(
        admin_id = ctx.user_id,
        quiz_id = detail.quiz.id,
        questions = detail.questions.len(),
        "Quiz '{}' imported",
        detail.quiz.title
    );

    Ok((StatusCode::CREATED, Json(detail)))
}

#[derive(Debug, Serialize)]
pub struct AdminQuizView {
    #[serde(flatten)]
    pub detail: QuizDetail,
    pub attempts: usize,
    /// Unweighted mean percent over all attempts, 2 decimals.
    pub average: f64,
}

/// Quiz with its questions, correct answers included, plus attempt stats.
pub async fn get_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    let quiz = quizzes::find_quiz(&pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;
    let questions = questions::questions_for_quiz(&pool, id).await?;
    let attempts = results::results_for_quiz(&pool, id).await?;

    Ok(Json(AdminQuizView {
        attempts: attempts.len(),
        average: round_to(analytics::per_quiz_average(id, &attempts), 2),
        detail: QuizDetail { quiz, questions },
    }))
}

pub async fn update_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuizRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    let title = provided(payload.title)
        .map(|t| sanitize_text(&t))
        .filter(|t| !t.is_empty());
    if let Some(title) = &title {
        if quizzes::title_taken_by_other(&pool, title, id).await? {
            return Err(AppError::Conflict("Quiz with this title already exists.".to_string()));
        }
    }
    let description = provided(payload.description).map(|d| sanitize_text(&d));

    let quiz = quizzes::update_quiz(&pool, id, title, description)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!(admin_id = ctx.user_id, quiz_id = quiz.id, "Quiz updated");

    Ok(Json(quiz))
}

/// Deletes a quiz together with its questions and results.
pub async fn delete_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    if !quizzes::delete_quiz(&pool, id).await? {
        return Err(AppError::NotFound("Quiz not found".to_string()));
    }

    tracing::info!(admin_id = ctx.user_id, quiz_id = id, "Quiz deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn create_question(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;
    payload.validate()?;

    let question = questions::add_question(&pool, quiz_id, &new_question(&payload))
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    tracing::info!(admin_id = ctx.user_id, quiz_id, question_id = question.id, "Question added");

    Ok((StatusCode::CREATED, Json(question)))
}

pub async fn update_question(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    let correct = match provided(payload.correct) {
        Some(raw) => Some(normalize_choice(&raw).ok_or_else(|| {
            AppError::BadRequest("Correct answer must be one of A, B, C, D.".to_string())
        })?),
        None => None,
    };

    let changes = QuestionChanges {
        text: provided(payload.text).map(|t| sanitize_text(&t)),
        choice_a: provided(payload.choice_a).map(|t| sanitize_text(&t)),
        choice_b: provided(payload.choice_b).map(|t| sanitize_text(&t)),
        choice_c: provided(payload.choice_c).map(|t| sanitize_text(&t)),
        choice_d: provided(payload.choice_d).map(|t| sanitize_text(&t)),
        correct,
    };

    let question = questions::update_question(&pool, id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("Question not found".to_string()))?;

    tracing::info!(admin_id = ctx.user_id, question_id = question.id, "Question updated");

    Ok(Json(question))
}

pub async fn delete_question(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    if !questions::delete_question(&pool, id).await? {
        return Err(AppError::NotFound("Question not found".to_string()));
    }

    tracing::info!(admin_id = ctx.user_id, question_id = id, "Question deleted");

    Ok(StatusCode::NO_CONTENT)
}
