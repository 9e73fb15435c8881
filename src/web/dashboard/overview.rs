use askama::Template;
use axum::{extract::State, response::IntoResponse, Extension};

use super::{base_context, format_timestamp};
use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    web::templates::{BaseContext, HtmlTemplate},
};

pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub caption: String,
}

pub struct ActivityRow {
    pub message: String,
    pub when: String,
}

#[derive(Template)]
#[template(path = "dashboard/overview.html")]
pub struct OverviewTemplate {
    pub base: BaseContext,
    pub cards: Vec<StatCard>,
    pub activity: Vec<ActivityRow>,
    pub warnings: Vec<String>,
}

pub async fn overview_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> impl IntoResponse {
    let summary = state.service_context.dashboard_service.summary().await;
    let stats = &summary.stats;
    let window = state.settings.dashboard.expiring_window_days;

    let cards = vec![
        StatCard {
            title: "Total Members",
            value: stats.total_members.to_string(),
            caption: format!("{} active", stats.active_members),
        },
        StatCard {
            title: "Monthly Revenue",
            value: stats.monthly_revenue.formatted(),
            caption: "Successful payments this month".to_string(),
        },
        StatCard {
            title: "New Members",
            value: stats.new_members_this_month.to_string(),
            caption: "Joined this month".to_string(),
        },
        StatCard {
            title: "Expiring Soon",
            value: stats.expiring_subscriptions.to_string(),
            caption: format!("Subscriptions ending within {} days", window),
        },
    ];

    let activity = summary
        .recent_activity
        .iter()
        .map(|item| ActivityRow {
            message: item.message.clone(),
            when: format_timestamp(item.timestamp),
        })
        .collect();

    HtmlTemplate(OverviewTemplate {
        base: base_context(&state, &admin, "overview").await,
        cards,
        activity,
        warnings: summary.warnings,
    })
}
