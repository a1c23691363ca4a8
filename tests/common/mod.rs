// tests/common/mod.rs

#![allow(dead_code)]

use std::str::FromStr;

use quizdesk::{
    config::Config,
    db::{self, users},
    models::user::{Role, User},
    routes,
    state::AppState,
    utils::password::hash_password,
};
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};

pub const TEST_SECRET: &str = "test_secret_for_integration_tests";

/// Fresh in-memory database with the schema applied.
///
/// A single connection that never expires, since every in-memory
/// connection is its own database.
pub async fn memory_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid sqlite url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");

    db::migrate(&pool).await.expect("Failed to migrate database");
    pool
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        admin_username: None,
        admin_password: None,
        seed_sample_quiz: false,
    }
}

/// Spawns the app on a random port.
/// Returns the base URL and a handle on the same database.
pub async fn spawn_app() -> (String, SqlitePool) {
    let pool = memory_pool().await;
    let state = AppState {
        pool: pool.clone(),
        config: test_config(),
    };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://127.0.0.1:{}", port), pool)
}

/// Inserts an account directly, bypassing registration.
pub async fn insert_user(pool: &SqlitePool, username: &str, password: &str, role: Role) -> User {
    let hashed = hash_password(password).unwrap();
    users::create_user(pool, username, &hashed, role)
        .await
        .unwrap()
        .expect("username should be free")
}

/// Logs in through the API and returns the bearer token.
pub async fn login(client: &reqwest::Client, address: &str, username: &str, password: &str) -> String {
    let body: serde_json::Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({ "username": username, "password": password }))
        .send()
        .await
        .expect("Login failed")
        .json()
        .await
        .expect("Failed to parse login json");

    body["token"].as_str().expect("Token not found").to_string()
}
