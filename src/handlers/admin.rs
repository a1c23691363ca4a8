// src/handlers/admin.rs

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
        questions, quizzes, results,
        users::{self, UserChanges},
    },
    error::AppError,
    models::{
        provided,
        quiz::Quiz,
        result::ResultView,
        user::{AdminCreateUserRequest, AdminUpdateUserRequest, Role, User},
    },
    scoring::analytics::{self, AnalyticsSummary, QuizAverage, TierPolicy},
    utils::password::hash_password,
};

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub total_users: i64,
    pub total_active: i64,
    pub total_quizzes: i64,
    pub total_questions: i64,
    pub users: Vec<User>,
    pub quizzes: Vec<Quiz>,
}

/// Site-wide counts plus the user and quiz lists.
pub async fn dashboard(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    Ok(Json(AdminDashboard {
        total_users: users::count_users(&pool).await?,
        total_active: users::count_active_users(&pool).await?,
        total_quizzes: quizzes::count_quizzes(&pool).await?,
        total_questions: questions::count_questions(&pool).await?,
        users: users::list_users(&pool).await?,
        quizzes: quizzes::list_quizzes(&pool).await?,
    }))
}

pub async fn list_users(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    Ok(Json(users::list_users(&pool).await?))
}

/// Creates an account with an explicit role.
pub async fn create_user(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Json(payload): Json<AdminCreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;
    payload.validate()?;

    let username = payload.username.trim();
    if username.is_empty() {
        return Err(AppError::BadRequest("Username is required".to_string()));
    }

    let hashed_password = hash_password(&payload.password)?;

    let user = users::create_user(&pool, username, &hashed_password, payload.role)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("User '{}' already exists", username)))?;

    tracing::info!(admin_id = ctx.user_id, user_id = user.id, role = %user.role, "User created");

    Ok((StatusCode::CREATED, Json(user)))
}

/// Partial update of username, password, role and activation.
pub async fn update_user(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
    Json(payload): Json<AdminUpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    if users::find_user(&pool, id).await?.is_none() {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    let username = provided(payload.username).map(|u| u.trim().to_string());
    if let Some(username) = &username {
        if users::username_taken_by_other(&pool, username, id).await? {
            return Err(AppError::Conflict(format!("Username '{}' already taken", username)));
        }
    }

    let password_hash = match provided(payload.password) {
        Some(password) => Some(hash_password(&password)?),
        None => None,
    };

    let changes = UserChanges {
        username,
        password_hash,
        role: payload.role,
        is_active: payload.is_active,
    };

    let user = users::update_user(&pool, id, changes)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(admin_id = ctx.user_id, user_id = user.id, "User updated");

    Ok(Json(user))
}

/// Deletes an account and its results. An admin cannot delete themselves.
pub async fn delete_user(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    if id == ctx.user_id {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    if !users::delete_user(&pool, id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(admin_id = ctx.user_id, user_id = id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    /// Newest attempt first.
    pub results: Vec<ResultView>,
    pub chart: Vec<QuizAverage>,
    pub total_quizzes: usize,
    pub total_students: i64,
    pub total_results: usize,
    pub total_questions: i64,
    pub summary: AnalyticsSummary,
}

/// Performance analytics over every stored attempt.
pub async fn analysis(
    State(pool): State<SqlitePool>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, AppError> {
    requires_role(&ctx, Role::Admin)?;

    let quiz_list = quizzes::list_quizzes(&pool).await?;
    let views = results::all_result_views(&pool).await?;

    let records: Vec<_> = views.iter().map(|v| v.record.clone()).collect();
    let chart = analytics::quiz_averages(&quiz_list, &records);
    let summary = analytics::aggregate(&records, TierPolicy::ADMIN);

    Ok(Json(AnalysisResponse {
        total_quizzes: quiz_list.len(),
        total_students: users::count_by_role(&pool, Role::Student).await?,
        total_results: views.len(),
        total_questions: questions::count_questions(&pool).await?,
        results: views,
        chart,
        summary,
    }))
}
