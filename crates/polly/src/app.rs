use axum::{
    http::{header, Method, StatusCode},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    config::Config,
    handlers::{
        api::get_poll,
        health::{livez, readyz},
        pages::{index, new_poll, show_poll},
        polls::create_poll,
        votes::cast_vote,
    },
    state::AppState,
};

/// Create the application router with all routes and middleware.
pub fn create_app(state: AppState, config: &Config) -> Router {
    // CORS configuration for API endpoints
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE]);

    // API routes with CORS
    let api_routes = Router::new()
        .route("/polls/{id}", get(get_poll))
        .layer(cors);

    // Main application router
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_poll))
        .route("/add", post(create_poll))
        .route("/poll/{id}", get(show_poll))
        .route("/vote/{poll_id}/{option_id}", post(cast_vote))
        .route("/livez", get(livez))
        .route("/readyz", get(readyz))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            config.request_timeout(),
        ))
        .with_state(state)
}
