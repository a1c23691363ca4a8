// src/seed.rs

use sqlx::SqlitePool;

use crate::{
    config::Config,
    db::{
        questions::{self, NewQuestion},
        quizzes, users,
    },
    error::AppError,
    models::user::Role,
    utils::password::hash_password,
};

pub const SAMPLE_QUIZ_TITLE: &str = "Sample Quiz";

/// Creates the admin account from `ADMIN_USERNAME`/`ADMIN_PASSWORD` if it
/// does not exist yet. Returns whether an account was created.
pub async fn seed_admin_user(pool: &SqlitePool, config: &Config) -> Result<bool, AppError> {
    let (Some(username), Some(password)) = (&config.admin_username, &config.admin_password) else {
        return Ok(false);
    };

    if users::find_by_username(pool, username).await?.is_some() {
        return Ok(false);
    }

    let hashed = hash_password(password)?;
    let created = users::create_user(pool, username, &hashed, Role::Admin)
        .await?
        .is_some();

    if created {
        tracing::info!("Seeded admin user '{}'", username);
    }
    Ok(created)
}

/// Adds a one-question demo quiz unless a quiz with that title exists.
pub async fn seed_sample_quiz(pool: &SqlitePool) -> Result<bool, AppError> {
    let Some(quiz) = quizzes::add_quiz(pool, SAMPLE_QUIZ_TITLE, "This is a test quiz.").await? else {
        return Ok(false);
    };

    let question = NewQuestion {
        text: "What is 2 + 2?".to_string(),
        choice_a: "3".to_string(),
        choice_b: "4".to_string(),
        choice_c: "5".to_string(),
        choice_d: "6".to_string(),
        correct: "B".to_string(),
    };
    questions::add_question(pool, quiz.id, &question).await?;

    tracing::info!(quiz_id = quiz.id, "Seeded sample quiz");
    Ok(true)
}
