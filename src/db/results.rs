// src/db/results.rs

use chrono::{DateTime, Utc};
use sqlx::SqliteExecutor;

use crate::models::result::{ResultRecord, ResultView};

const RESULT_COLUMNS: &str = "id, student_id, quiz_id, score, total, taken_at";

const VIEW_SELECT: &str = "SELECT r.id, r.student_id, r.quiz_id, r.score, r.total, r.taken_at,
            q.title AS quiz_title, u.username AS student_username
     FROM results r
     JOIN quizzes q ON q.id = r.quiz_id
     JOIN users u ON u.id = r.student_id";

/// Appends one attempt. Results are never updated afterwards.
pub async fn record_result<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: i64,
    quiz_id: i64,
    score: i64,
    total: i64,
    taken_at: DateTime<Utc>,
) -> Result<ResultRecord, sqlx::Error> {
    sqlx::query_as::<_, ResultRecord>(&format!(
        "INSERT INTO results (student_id, quiz_id, score, total, taken_at)
         VALUES (?, ?, ?, ?, ?)
         RETURNING {RESULT_COLUMNS}"
    ))
    .bind(student_id)
    .bind(quiz_id)
    .bind(score)
    .bind(total)
    .bind(taken_at)
    .fetch_one(executor)
    .await
}

/// Every attempt in insertion order.
pub async fn list_results<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<ResultRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResultRecord>(&format!("SELECT {RESULT_COLUMNS} FROM results ORDER BY id"))
        .fetch_all(executor)
        .await
}

pub async fn results_for_student<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: i64,
) -> Result<Vec<ResultRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResultRecord>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE student_id = ? ORDER BY id"
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}

pub async fn results_for_quiz<'e>(
    executor: impl SqliteExecutor<'e>,
    quiz_id: i64,
) -> Result<Vec<ResultRecord>, sqlx::Error> {
    sqlx::query_as::<_, ResultRecord>(&format!(
        "SELECT {RESULT_COLUMNS} FROM results WHERE quiz_id = ? ORDER BY id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

/// All attempts with quiz title and username, newest first.
pub async fn all_result_views<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<ResultView>, sqlx::Error> {
    sqlx::query_as::<_, ResultView>(&format!("{VIEW_SELECT} ORDER BY r.taken_at DESC, r.id DESC"))
        .fetch_all(executor)
        .await
}

/// One student's attempts with quiz titles, oldest first.
pub async fn result_views_for_student<'e>(
    executor: impl SqliteExecutor<'e>,
    student_id: i64,
) -> Result<Vec<ResultView>, sqlx::Error> {
    sqlx::query_as::<_, ResultView>(&format!(
        "{VIEW_SELECT} WHERE r.student_id = ? ORDER BY r.id"
    ))
    .bind(student_id)
    .fetch_all(executor)
    .await
}
