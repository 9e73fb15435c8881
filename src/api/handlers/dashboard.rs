use axum::{extract::State, Json};

use crate::{api::state::AppState, service::dashboard_service::DashboardSummary};

pub async fn summary(State(state): State<AppState>) -> Json<DashboardSummary> {
    Json(state.service_context.dashboard_service.summary().await)
}
