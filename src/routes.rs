// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, dashboard, quiz},
    state::AppState,
    utils::jwt::{auth_middleware, student_middleware, teacher_middleware},
};

/// Assembles the main application router.
///
/// * Merges the auth, teacher, student and dashboard sub-routers.
/// * Role routers are layered: auth first, then the role check.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .merge(
            Router::new()
                .route("/logout", post(auth::logout))
                .route("/me", get(auth::me))
                .layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        );

    let teacher_routes = Router::new()
        .route("/", post(quiz::create_quiz))
        .route("/mine", get(quiz::list_my_quizzes))
        .route("/{id}/publish", put(quiz::publish_quiz))
        .route("/{id}/responses", get(quiz::list_quiz_responses))
        .layer(middleware::from_fn(teacher_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let student_routes = Router::new()
        .route("/available", get(quiz::list_available))
        .route("/{id}/submit", post(quiz::submit_response))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let result_routes = Router::new()
        .route("/mine", get(quiz::list_my_results))
        .layer(middleware::from_fn(student_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::get_dashboard))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/quizzes", teacher_routes.merge(student_routes))
        .nest("/api/responses", result_routes)
        .nest("/api/dashboard", dashboard_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
