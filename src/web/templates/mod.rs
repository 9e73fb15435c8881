pub mod auth;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Data every dashboard page's layout needs.
#[derive(Debug, Clone)]
pub struct BaseContext {
    pub admin_name: String,
    pub admin_email: String,
    /// Fresh token for the forms on this page, logout included.
    pub csrf_token: String,
    pub active_nav: &'static str,
}

/// A `<select>` entry.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl SelectOption {
    pub fn list<T: Copy>(
        all: &[T],
        selected: &str,
        value: fn(T) -> &'static str,
        label: fn(T) -> &'static str,
    ) -> Vec<SelectOption> {
        all.iter()
            .map(|item| SelectOption {
                value: value(*item),
                label: label(*item),
                selected: value(*item) == selected,
            })
            .collect()
    }
}

// Make askama templates work with axum
pub struct HtmlTemplate<T>(pub T);

impl<T> IntoResponse for HtmlTemplate<T>
where
    T: Template,
{
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Failed to render template: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to render template: {}", err),
                )
                    .into_response()
            }
        }
    }
}
