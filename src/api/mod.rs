pub mod handlers;
pub mod middleware;
pub mod state;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, trace::TraceLayer};

use crate::{config::Settings, service::ServiceContext, web};
use state::AppState;

/// The full application: JSON API, health check and dashboard pages.
pub fn create_app(service_context: Arc<ServiceContext>, settings: Arc<Settings>) -> Router {
    let app_state = AppState::new(service_context, settings);

    Router::new()
        .route("/", get(handlers::root::root))
        .route("/health", get(handlers::root::health_check))
        .nest("/api", api_routes(app_state.clone()))
        .merge(web::create_web_routes(app_state.clone()))
        .with_state(app_state)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
}

fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/members",
            get(handlers::members::list).post(handlers::members::create),
        )
        .route("/members/:id", get(handlers::members::get))
        .route("/billing", get(handlers::billing::overview))
        .route("/billing/plans", post(handlers::billing::create_plan))
        .route("/dashboard", get(handlers::dashboard::summary))
        .route(
            "/settings",
            get(handlers::settings::get_club_info).put(handlers::settings::update_club_info),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state,
            middleware::auth::require_admin,
        ))
}
