// src/db/mod.rs

//! Explicit query functions over the SQLite store.
//!
//! Single-statement functions accept any `SqliteExecutor` (a pool or an open
//! transaction). Multi-statement operations take the pool and run inside
//! their own transaction.

pub mod questions;
pub mod quizzes;
pub mod results;
pub mod users;

use std::{str::FromStr, time::Duration};

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

/// Opens the pool, creating the database file if needed, and applies
/// pending migrations.
pub async fn connect(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
