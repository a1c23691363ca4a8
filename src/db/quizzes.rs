// src/db/quizzes.rs

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::{
    db::questions::{self, NewQuestion},
    models::quiz::{Quiz, QuizDetail},
};

pub async fn find_quiz<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT id, title, description FROM quizzes WHERE id = ?")
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_title<'e>(
    executor: impl SqliteExecutor<'e>,
    title: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT id, title, description FROM quizzes WHERE title = ?")
        .bind(title)
        .fetch_optional(executor)
        .await
}

/// All quizzes in insertion order.
pub async fn list_quizzes<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>("SELECT id, title, description FROM quizzes ORDER BY id")
        .fetch_all(executor)
        .await
}

pub async fn count_quizzes<'e>(executor: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM quizzes")
        .fetch_one(executor)
        .await
}

/// Creates a quiz unless the title is already used.
/// A duplicate title yields `None` and writes nothing.
pub async fn add_quiz<'e>(
    executor: impl SqliteExecutor<'e>,
    title: &str,
    description: &str,
) -> Result<Option<Quiz>, sqlx::Error> {
    sqlx::query_as::<_, Quiz>(
        "INSERT INTO quizzes (title, description) VALUES (?, ?)
         ON CONFLICT(title) DO NOTHING
         RETURNING id, title, description",
    )
    .bind(title)
    .bind(description)
    .fetch_optional(executor)
    .await
}

pub async fn title_taken_by_other<'e>(
    executor: impl SqliteExecutor<'e>,
    title: &str,
    quiz_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM quizzes WHERE title = ? AND id <> ?")
        .bind(title)
        .bind(quiz_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

/// Partial update. Returns `None` when the quiz does not exist.
pub async fn update_quiz(
    pool: &SqlitePool,
    id: i64,
    title: Option<String>,
    description: Option<String>,
) -> Result<Option<Quiz>, sqlx::Error> {
    if title.is_none() && description.is_none() {
        return find_quiz(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE quizzes SET ");
    let mut separated = builder.separated(", ");

    if let Some(title) = title {
        separated.push("title = ");
        separated.push_bind_unseparated(title);
    }

    if let Some(description) = description {
        separated.push("description = ");
        separated.push_bind_unseparated(description);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(" RETURNING id, title, description");

    builder.build_query_as::<Quiz>().fetch_optional(pool).await
}

/// Deletes a quiz with its questions and results in one transaction.
/// Returns `false` (and writes nothing) when the quiz does not exist.
pub async fn delete_quiz(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let questions = sqlx::query("DELETE FROM questions WHERE quiz_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let results = sqlx::query("DELETE FROM results WHERE quiz_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let quiz = sqlx::query("DELETE FROM quizzes WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    if quiz.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }

    tx.commit().await?;

    tracing::debug!(
        quiz_id = id,
        questions = questions.rows_affected(),
        results = results.rows_affected(),
        "Quiz deleted with its questions and results"
    );

    Ok(true)
}

/// Creates a quiz and all of its questions atomically.
/// A duplicate title yields `None` and writes nothing.
pub async fn import_quiz(
    pool: &SqlitePool,
    title: &str,
    description: &str,
    new_questions: &[NewQuestion],
) -> Result<Option<QuizDetail>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let Some(quiz) = add_quiz(&mut *tx, title, description).await? else {
        tx.rollback().await?;
        return Ok(None);
    };

    let mut created = Vec::with_capacity(new_questions.len());
    for new_question in new_questions {
        // The quiz was inserted above within this transaction.
        if let Some(question) = questions::add_question(&mut *tx, quiz.id, new_question).await? {
            created.push(question);
        }
    }

    tx.commit().await?;

    Ok(Some(QuizDetail {
        quiz,
        questions: created,
    }))
}
