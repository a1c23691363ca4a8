// src/db/users.rs

use sqlx::{QueryBuilder, Sqlite, SqliteExecutor, SqlitePool};

use crate::models::user::{Role, User};

const USER_COLUMNS: &str = "id, username, password, role, is_active";

/// Field changes for `update_user`. `None` leaves the column as is.
/// The password must already be hashed.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.password_hash.is_none()
            && self.role.is_none()
            && self.is_active.is_none()
    }
}

pub async fn find_user<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub async fn find_by_username<'e>(
    executor: impl SqliteExecutor<'e>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?"))
        .bind(username)
        .fetch_optional(executor)
        .await
}

pub async fn list_users<'e>(executor: impl SqliteExecutor<'e>) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
        .fetch_all(executor)
        .await
}

/// Inserts a user unless the username is already taken, in which case
/// `None` is returned and nothing is written.
pub async fn create_user<'e>(
    executor: impl SqliteExecutor<'e>,
    username: &str,
    password_hash: &str,
    role: Role,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (username, password, role, is_active) VALUES (?, ?, ?, 1)
         ON CONFLICT(username) DO NOTHING
         RETURNING {USER_COLUMNS}"
    ))
    .bind(username)
    .bind(password_hash)
    .bind(role)
    .fetch_optional(executor)
    .await
}

/// True when `username` belongs to an account other than `user_id`.
pub async fn username_taken_by_other<'e>(
    executor: impl SqliteExecutor<'e>,
    username: &str,
    user_id: i64,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE username = ? AND id <> ?")
        .bind(username)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;

    Ok(row.is_some())
}

/// Applies the provided changes. Returns `None` when the user does not exist.
pub async fn update_user(
    pool: &SqlitePool,
    id: i64,
    changes: UserChanges,
) -> Result<Option<User>, sqlx::Error> {
    if changes.is_empty() {
        return find_user(pool, id).await;
    }

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE users SET ");
    let mut separated = builder.separated(", ");

    if let Some(username) = changes.username {
        separated.push("username = ");
        separated.push_bind_unseparated(username);
    }

    if let Some(password_hash) = changes.password_hash {
        separated.push("password = ");
        separated.push_bind_unseparated(password_hash);
    }

    if let Some(role) = changes.role {
        separated.push("role = ");
        separated.push_bind_unseparated(role);
    }

    if let Some(is_active) = changes.is_active {
        separated.push("is_active = ");
        separated.push_bind_unseparated(is_active);
    }

    builder.push(" WHERE id = ");
    builder.push_bind(id);
    builder.push(format!(" RETURNING {USER_COLUMNS}"));

    builder.build_query_as::<User>().fetch_optional(pool).await
}

/// Removes the account. Its results go with it (FK cascade).
pub async fn delete_user<'e>(executor: impl SqliteExecutor<'e>, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_users<'e>(executor: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(executor)
        .await
}

pub async fn count_active_users<'e>(executor: impl SqliteExecutor<'e>) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_active = 1")
        .fetch_one(executor)
        .await
}

pub async fn count_by_role<'e>(executor: impl SqliteExecutor<'e>, role: Role) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = ?")
        .bind(role)
        .fetch_one(executor)
        .await
}
