// src/db/questions.rs

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::question::Question;

const QUESTION_COLUMNS: &str = "id, quiz_id, text, choice_a, choice_b, choice_c, choice_d, correct";

/// Input for `add_question`. `correct` is trimmed and upper-cased on write.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub text: String,
    pub choice_a: String,
    pub choice_b: String,
    pub choice_c: String,
    pub choice_d: String,
    pub correct: String,
}

/// Field changes for `update_question`. `None` leaves the column as is.
#[derive(Debug, Default)]
pub struct QuestionChanges {
    pub text: Option<String>,
    pub choice_a: Option<String>,
    pub choice_b: Option<String>,
    pub choice_c: Option<String>,
    pub choice_d: Option<String>,
    pub correct: Option<String>,
}

impl QuestionChanges {
    pub fn is_empty(&self) -> bool {
        self.text.is_none()
            && self.choice_a.is_none()
            && self.choice_b.is_none()
            && self.choice_c.is_none()
            && self.choice_d.is_none()
            && self.correct.is_none()
    }
}

pub async fn find_question<'e>(
    executor: impl SqliteExecutor<'e>,
    id: i64,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

/// Questions of one quiz in insertion order.
pub async fn questions_for_quiz<'e>(
    executor: impl SqliteExecutor<'e>,
    quiz_id: i64,
) -> Result<Vec<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM questions WHERE quiz_id = ? ORDER BY id"
    ))
    .bind(quiz_id)
    .fetch_all(executor)
    .await
}

pub async fn count_questions<'e>(executor: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM questions")
        .fetch_one(executor)
        .await
}

/// Adds a question to an existing quiz.
/// Returns `None` without writing when the quiz does not exist.
pub async fn add_question<'e>(
    executor: impl SqliteExecutor<'e>,
    quiz_id: i64,
    question: &NewQuestion,
) -> Result<Option<Question>, sqlx::Error> {
    sqlx::query_as::<_, Question>(&format!(
        "INSERT INTO questions (quiz_id, text, choice_a, choice_b, choice_c, choice_d, correct)
         SELECT ?, ?, ?, ?, ?, ?, ?
         WHERE EXISTS (SELECT 1 FROM quizzes WHERE id = ?)
         RETURNING {QUESTION_COLUMNS}"
    ))
    .bind(quiz_id)
    .bind(&question.text)
    .bind(&question.choice_a)
    .bind(&question.choice_b)
    .bind(&question.choice_c)
    .bind(&question.choice_d)
    .bind(question.correct.trim().to_ascii_uppercase())
    .bind(quiz_id)
    .fetch_optional(executor)
    .await
}

/// Partial update. Returns `None` when the question does not exist.
pub async fn update_question(
    pool: &SqlitePool,
    id: i64,
    changes: QuestionChanges,
) -> Result<Option<Question>, sqlx::Error> {
    if changes.is_empty() {
        return find_question(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE questions SET ");
    let mut separated = builder.separated(", ");

    let columns = [
        ("text = ", changes.text),
        ("choice_a = ", changes.choice_a),
        ("choice_b = ", changes.choice_b),
        ("choice_c = ", changes.choice_c),
        ("choice_d = ", changes.choice_d),
        ("correct = ", changes.correct.map(|c| c.trim().to_ascii_uppercase())),
    ];

    for (column, value) in columns {
        if let Some(value) = value {
            separated.push(column);
            separated.push_bind_unseparated(value);
        }
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {QUESTION_COLUMNS}"));

    builder.build_query_as::<Question>().fetch_optional(pool).await
}

pub async fn delete_question<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM questions WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}
