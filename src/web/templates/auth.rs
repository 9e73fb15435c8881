use askama::Template;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use axum_extra::extract::CookieJar;
use serde::Deserialize;

use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    auth::{AuthService, Gate, SESSION_COOKIE},
    error::{AppError, Result},
    web::templates::HtmlTemplate,
};

pub const ACCESS_DENIED: &str = "Access denied. Admin privileges required.";

#[derive(Template)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub email: String,
    pub error_message: Option<String>,
}

#[derive(Template)]
#[template(path = "auth/unauthorized.html")]
pub struct UnauthorizedTemplate {
    pub login_url: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CsrfForm {
    #[serde(default)]
    pub csrf_token: String,
}

// GET /login
pub async fn login_page(State(state): State<AppState>, jar: CookieJar) -> Response {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());
    if token.is_some() {
        if let Ok(Gate::Admin(..)) = state.service_context.auth_service.check_admin(token).await {
            return Redirect::to("/dashboard").into_response();
        }
    }

    HtmlTemplate(LoginTemplate {
        email: String::new(),
        error_message: None,
    })
    .into_response()
}

// POST /login
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let auth_service = &state.service_context.auth_service;

    let (status, message) = match auth_service.login(&form.email, &form.password).await {
        Ok((_session, token)) => {
            let cookie = auth_service.create_session_cookie(&token, state.settings.server.secure_cookies);
            return (jar.add(cookie), Redirect::to("/dashboard")).into_response();
        }
        Err(AppError::Forbidden) => (StatusCode::FORBIDDEN, ACCESS_DENIED.to_string()),
        Err(AppError::Authentication(message)) => (StatusCode::UNAUTHORIZED, message),
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Sign-in is unavailable right now. Please try again.".to_string(),
            )
        }
    };

    (
        status,
        HtmlTemplate(LoginTemplate {
            email: form.email,
            error_message: Some(message),
        }),
    )
        .into_response()
}

// GET /unauthorized
pub async fn unauthorized_page() -> impl IntoResponse {
    (StatusCode::FORBIDDEN, HtmlTemplate(UnauthorizedTemplate { login_url: "/login" }))
}

// POST /logout
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    jar: CookieJar,
    Form(form): Form<CsrfForm>,
) -> Result<Response> {
    state
        .service_context
        .csrf_service
        .require(&admin.session_id, &form.csrf_token)
        .await?;

    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.service_context.auth_service.logout(cookie.value()).await?;
    }
    tracing::info!("Admin {} signed out", admin.email);

    Ok((jar.add(AuthService::create_logout_cookie()), Redirect::to("/login")).into_response())
}
