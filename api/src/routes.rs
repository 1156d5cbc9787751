use std::time::Duration;

use axum::{routing::get, routing::post, Router};
use tower::ServiceBuilder;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{self, redirect};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Create the main application router with all routes and middleware
#[tracing::instrument(skip(state))]
pub fn create_router(state: AppState) -> Router {
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/", get(|| async { redirect("/repositories") }))
        .route(
            "/login",
            get(handlers::login::login_page).post(handlers::login::login_submit),
        )
        .route("/logout", post(handlers::login::logout))
        .route("/health", get(handlers::health::health_check))
        // No authentication for Prometheus scraping
        .route("/metrics", get(handlers::metrics::metrics_handler));

    // Repository routes; the auth gate runs only for matched routes so
    // unknown paths still answer 404
    let repository_routes = Router::new()
        .route(
            "/repositories",
            get(handlers::repositories::index).post(handlers::repositories::store),
        )
        .route("/repositories/create", get(handlers::repositories::create))
        .route(
            "/repositories/:id",
            get(handlers::repositories::show)
                .put(handlers::repositories::update)
                .delete(handlers::repositories::destroy)
                .post(handlers::repositories::method_override),
        )
        .route("/repositories/:id/edit", get(handlers::repositories::edit))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(repository_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::new(request_timeout)),
        )
        .with_state(state)
}
