use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::{CreateMemberRequest, Member},
    error::{AppError, Result},
    service::member_service::{filter_members, MemberDetail, MemberFilter, StatusFilter},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    q: String,
    #[serde(default)]
    status: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    members: Vec<Member>,
    /// Size of the whole directory, before filtering.
    total: usize,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>> {
    let status: StatusFilter = params.status.parse().map_err(AppError::BadRequest)?;
    let filter = MemberFilter {
        query: params.q,
        status,
    };

    let members = state.service_context.member_service.list().await?;
    let total = members.len();

    Ok(Json(ListResponse {
        members: filter_members(&members, &filter),
        total,
    }))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MemberDetail>> {
    let detail = state.service_context.member_service.get(id).await?;
    Ok(Json(detail))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Json(request): Json<CreateMemberRequest>,
) -> Result<(StatusCode, Json<Member>)> {
    let member = state.service_context.member_service.create(request).await?;
    tracing::debug!("Member {} added by {}", member.member_number, admin.email);
    Ok((StatusCode::CREATED, Json(member)))
}
