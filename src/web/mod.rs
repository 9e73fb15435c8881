pub mod dashboard;
pub mod templates;

use axum::{routing::get, Router};

use crate::api::state::AppState;

pub fn create_web_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            get(templates::auth::login_page).post(templates::auth::login_handler),
        )
        .route("/unauthorized", get(templates::auth::unauthorized_page))
        .merge(dashboard::create_dashboard_routes(state))
}
