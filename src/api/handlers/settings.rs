use axum::{extract::State, Json};

use crate::{api::state::AppState, domain::ClubInfo, error::Result};

pub async fn get_club_info(State(state): State<AppState>) -> Result<Json<ClubInfo>> {
    let info = state.service_context.settings_service.club_info().await?;
    Ok(Json(info))
}

pub async fn update_club_info(
    State(state): State<AppState>,
    Json(info): Json<ClubInfo>,
) -> Result<Json<ClubInfo>> {
    let saved = state.service_context.settings_service.save_club_info(info).await?;
    Ok(Json(saved))
}
