// src/main.rs

use quizdesk::{config::Config, db, routes, seed, state::AppState};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    // Opens (or creates) the database and applies migrations.
    let pool = db::connect(&config.database_url).await?;
    tracing::info!("Database ready at {}", config.database_url);

    if let Err(e) = seed::seed_admin_user(&pool, &config).await {
        tracing::error!("Failed to seed admin user: {}", e);
    }

    if config.seed_sample_quiz {
        if let Err(e) = seed::seed_sample_quiz(&pool).await {
            tracing::error!("Failed to seed sample quiz: {}", e);
        }
    }

    let bind_addr = config.bind_addr.clone();
    let state = AppState { pool, config };
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
