//! Router configuration for the HTTP API.
//!
//! Sets up all routes and middleware (CORS, tracing) and creates the axum
//! router ready for serving.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration - permissive for development, should be restricted in production
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let persons = Router::new()
        .route(
            "/persons/",
            get(handlers::list_persons)
                .post(handlers::create_person)
                .put(handlers::update_person)
                .delete(handlers::delete_person),
        )
        .route("/persons/getById/", get(handlers::get_person));

    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/person", persons)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
