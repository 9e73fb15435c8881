use axum::{extract::State, http::StatusCode, Json};

use crate::{
    api::state::AppState,
    domain::{CreatePlanRequest, SubscriptionPlan},
    error::Result,
    service::billing_service::BillingOverview,
};

pub async fn overview(State(state): State<AppState>) -> Json<BillingOverview> {
    Json(state.service_context.billing_service.overview().await)
}

pub async fn create_plan(
    State(state): State<AppState>,
    Json(request): Json<CreatePlanRequest>,
) -> Result<(StatusCode, Json<SubscriptionPlan>)> {
    let plan = state.service_context.billing_service.create_plan(request).await?;
    Ok((StatusCode::CREATED, Json(plan)))
}
