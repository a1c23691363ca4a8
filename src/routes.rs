// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, auth, quiz, student},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * `/api/auth` is public.
/// * Everything else sits behind `auth_middleware`; role checks happen in
///   the handlers.
/// * Trace and CORS layers wrap the whole tree.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            HeaderValue::from_static("http://localhost:3000"),
            HeaderValue::from_static("http://127.0.0.1:3000"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let admin_routes = Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/analysis", get(admin::analysis))
        .route("/users", get(admin::list_users).post(admin::create_user))
        .route(
            "/users/{id}",
            put(admin::update_user).delete(admin::delete_user),
        )
        .route("/quizzes", post(quiz::create_quiz))
        .route("/quizzes/import", post(quiz::import_quiz))
        .route(
            "/quizzes/{id}",
            get(quiz::get_quiz)
                .put(quiz::update_quiz)
                .delete(quiz::delete_quiz),
        )
        .route("/quizzes/{id}/questions", post(quiz::create_question))
        .route(
            "/questions/{id}",
            put(quiz::update_question).delete(quiz::delete_question),
        );

    let student_routes = Router::new()
        .route("/dashboard", get(student::dashboard))
        .route("/quizzes/{id}", get(student::take_quiz))
        .route("/quizzes/{id}/submit", post(student::submit_quiz))
        .route("/results", get(student::my_results))
        .route("/profile", put(student::update_profile));

    // route_layer: unmatched paths fall through to 404 instead of 401.
    let protected = Router::new()
        .route("/api/me", get(auth::me))
        .nest("/api/admin", admin_routes)
        .nest("/api/student", student_routes)
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
