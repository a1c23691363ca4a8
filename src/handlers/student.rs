// src/handlers/student.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use serde::Serialize;
use sqlx::SqlitePool;
use validator::Validate;

use crate::{
    auth::{RequestContext, requires_role},
    db::{
        questions, quizzes, results,
        users::{self, UserChanges},
    },
    error::AppError,
    models::{
        provided,
        question::PublicQuestion,
        quiz::PublicQuiz,
        result::{ResultView, SubmitAnswersRequest},
        user::{Role, UpdateProfileRequest},
    },
    scoring::{
        analytics::{self, StudentResultsSummary},
        grading,
    },
    utils::password::hash_password,
};

/// Attempts and weighted averages per quiz for the calling student.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Student)?;

    let quiz_list = quizzes::list_quizzes(&pool).await?;
    let own_results = results::results_for_student(&pool, ctx.user_id).await?;

    Ok(Json(analytics::student_dashboard(&quiz_list, &own_results)))
}

/// The quiz as shown to a student: questions without answers.
pub async fn take_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(quiz_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Student)?;

    let quiz = quizzes::find_quiz(&pool, quiz_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Quiz not found".to_string()))?;

    let questions = questions::questions_for_quiz(&pool, quiz_id)
        .await?
        .into_iter()
        .map(PublicQuestion::from)
        .collect();

    Ok(Json(PublicQuiz { quiz, questions }))
}

/// Grades the submitted answers, stores the attempt and returns the review.
pub async fn submit_quiz(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(quiz_id): Path<i64>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Student)?;

    let outcome = grading::grade_submission(&pool, ctx.user_id, quiz_id, &payload.answers).await?;

    tracing::info!(
        student_id = ctx.user_id,
        quiz_id,
        score = outcome.score,
        total = outcome.total,
        "Quiz completed"
    );

    Ok(Json(outcome))
}

#[derive(Debug, Serialize)]
pub struct StudentResultsResponse {
    pub results: Vec<ResultView>,
    #[serde(flatten)]
    pub summary: StudentResultsSummary,
}

/// The caller's attempts with tier counts and mean score.
pub async fn my_results(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Student)?;

    let views = results::result_views_for_student(&pool, ctx.user_id).await?;
    let summary = analytics::student_results_summary(&views);

    Ok(Json(StudentResultsResponse {
        results: views,
        summary,
    }))
}

/// Changes the caller's username and, when given, password.
pub async fn update_profile(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Student)?;
    payload.validate()?;

    let username = payload.username.trim().to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username cannot be empty.".to_string()));
    }

    if users::username_taken_by_other(&pool, &username, ctx.user_id).await? {
        return Err(AppError::Conflict("Username already taken.".to_string()));
    }

    let password_hash = match provided(payload.password) {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    let changes = UserChanges {
        username: Some(username),
        password_hash,
        ..UserChanges::default()
    };

    let user = users::update_user(&pool, ctx.user_id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(user))
}
