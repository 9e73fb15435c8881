//! Server-rendered admin pages. Every route here sits behind the admin gate.
//!
//! Form posts re-render the page they came from with a success or error
//! message instead of redirecting.

mod billing;
mod members;
mod overview;
mod settings;

use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Router,
};
use chrono::{DateTime, Utc};

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    error::AppError,
    web::templates::{auth, BaseContext, HtmlTemplate},
};

pub fn create_dashboard_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(overview::overview_page))
        .route(
            "/dashboard/members",
            get(members::members_page).post(members::create_member),
        )
        .route("/dashboard/members/:id", get(members::member_detail_page))
        .route("/dashboard/billing", get(billing::billing_page))
        .route("/dashboard/billing/plans", post(billing::create_plan))
        .route("/dashboard/schedule", get(schedule_page))
        .route("/dashboard/staff", get(staff_page))
        .route(
            "/dashboard/settings",
            get(settings::settings_page).post(settings::update_settings),
        )
        .route("/logout", post(auth::logout_handler))
        .route_layer(middleware::from_fn_with_state(
            state,
            crate::api::middleware::auth::require_admin_redirect,
        ))
}

async fn base_context(state: &AppState, admin: &CurrentAdmin, active_nav: &'static str) -> BaseContext {
    let csrf_token = state
        .service_context
        .csrf_service
        .generate_token(&admin.session_id)
        .await
        .unwrap_or_else(|e| {
            tracing::error!("Failed to issue CSRF token: {}", e);
            String::new()
        });

    BaseContext {
        admin_name: admin.display_name.clone(),
        admin_email: admin.email.clone(),
        csrf_token,
        active_nav,
    }
}

/// Rejects a form post whose token does not belong to the session.
async fn verify_csrf(state: &AppState, admin: &CurrentAdmin, token: &str) -> Result<(), Response> {
    state
        .service_context
        .csrf_service
        .require(&admin.session_id, token)
        .await
        .map_err(|e| match e {
            AppError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Invalid or expired form token. Reload the page and try again.",
            )
                .into_response(),
            other => other.into_response(),
        })
}

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

#[derive(Template)]
#[template(path = "dashboard/error.html")]
struct ErrorTemplate {
    base: BaseContext,
    title: String,
    message: String,
}

async fn error_page(state: &AppState, admin: &CurrentAdmin, error: AppError) -> Response {
    let (status, title, message) = match &error {
        AppError::NotFound(message) => (StatusCode::NOT_FOUND, "Not found", message.clone()),
        other => (StatusCode::BAD_GATEWAY, "Something went wrong", other.to_string()),
    };
    tracing::warn!("Dashboard page failed: {}", error);

    (
        status,
        HtmlTemplate(ErrorTemplate {
            base: base_context(state, admin, "").await,
            title: title.to_string(),
            message,
        }),
    )
        .into_response()
}

#[derive(Template)]
#[template(path = "dashboard/placeholder.html")]
struct PlaceholderTemplate {
    base: BaseContext,
    title: &'static str,
    description: &'static str,
}

async fn schedule_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> impl IntoResponse {
    HtmlTemplate(PlaceholderTemplate {
        base: base_context(&state, &admin, "schedule").await,
        title: "Schedule",
        description: "Class schedules and bookings will appear here.",
    })
}

async fn staff_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> impl IntoResponse {
    HtmlTemplate(PlaceholderTemplate {
        base: base_context(&state, &admin, "staff").await,
        title: "Staff",
        description: "Trainer and front-desk staff management will appear here.",
    })
}
