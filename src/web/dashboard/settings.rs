use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use super::{base_context, verify_csrf};
use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::ClubInfo,
    web::templates::{BaseContext, HtmlTemplate},
};

#[derive(Template)]
#[template(path = "dashboard/settings.html")]
pub struct SettingsTemplate {
    pub base: BaseContext,
    pub info: ClubInfo,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
}

pub async fn settings_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> Response {
    let mut warnings = Vec::new();
    let info = match state.service_context.settings_service.club_info().await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!("Failed to load club settings: {}", e);
            warnings.push(format!("Could not load saved settings, showing defaults: {}", e));
            ClubInfo::default()
        }
    };

    HtmlTemplate(SettingsTemplate {
        base: base_context(&state, &admin, "settings").await,
        info,
        success_message: None,
        error_message: None,
        warnings,
    })
    .into_response()
}

pub async fn update_settings(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Form(form): Form<SettingsForm>,
) -> Response {
    if let Err(rejection) = verify_csrf(&state, &admin, &form.csrf_token).await {
        return rejection;
    }

    let submitted = ClubInfo {
        name: form.name,
        address: form.address,
        city: form.city,
        phone: form.phone,
        email: form.email,
    };

    let (info, success_message, error_message) = match state
        .service_context
        .settings_service
        .save_club_info(submitted.clone())
        .await
    {
        Ok(saved) => (saved, Some("Settings saved".to_string()), None),
        Err(e) => {
            tracing::error!("Failed to save club settings: {}", e);
            (submitted, None, Some(format!("Could not save settings: {}", e)))
        }
    };

    HtmlTemplate(SettingsTemplate {
        base: base_context(&state, &admin, "settings").await,
        info,
        success_message,
        error_message,
        warnings: Vec::new(),
    })
    .into_response()
}
