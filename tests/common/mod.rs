#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use gym_admin::{
    api,
    backend::{Backend, MemoryBackend, RecordStore},
    config::Settings,
    domain::Role,
    service::ServiceContext,
};
use serde_json::{json, Value};
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_EMAIL: &str = "admin@test.gym";
pub const ADMIN_PASSWORD: &str = "admin-pass";
pub const STAFF_EMAIL: &str = "coach@test.gym";
pub const STAFF_PASSWORD: &str = "coach-pass";

pub struct TestApp {
    pub backend: Arc<MemoryBackend>,
    pub context: Arc<ServiceContext>,
    pub router: Router,
    pub admin_id: Uuid,
}

pub async fn spawn_app() -> anyhow::Result<TestApp> {
    // A single connection that never expires keeps the in-memory database alive.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let backend = Arc::new(MemoryBackend::new());
    let admin_id = backend.register_user(ADMIN_EMAIL, ADMIN_PASSWORD, Role::Admin).await?;
    backend.register_user(STAFF_EMAIL, STAFF_PASSWORD, Role::Staff).await?;

    let settings = Settings::default();
    let context = Arc::new(ServiceContext::new(
        Backend::memory(backend.clone()),
        pool,
        &settings,
    ));
    let router = api::create_app(context.clone(), Arc::new(settings));

    Ok(TestApp {
        backend,
        context,
        router,
        admin_id,
    })
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> anyhow::Result<Response<Body>> {
        Ok(self.router.clone().oneshot(request).await?)
    }

    pub async fn get(&self, path: &str, cookie: Option<&str>) -> anyhow::Result<Response<Body>> {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty())?).await
    }

    pub async fn post_form(
        &self,
        path: &str,
        cookie: Option<&str>,
        fields: &[(&str, &str)],
    ) -> anyhow::Result<Response<Body>> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form_body(fields)))?).await
    }

    pub async fn send_json(
        &self,
        method: &str,
        path: &str,
        cookie: &str,
        body: Value,
    ) -> anyhow::Result<Response<Body>> {
        let request = Request::builder()
            .method(method)
            .uri(path)
            .header(header::COOKIE, cookie)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))?;
        self.send(request).await
    }

    /// Signs in through the login form and returns the `session=...` cookie.
    pub async fn login(&self, email: &str, password: &str) -> anyhow::Result<String> {
        let response = self
            .post_form("/login", None, &[("email", email), ("password", password)])
            .await?;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).ok_or_else(|| anyhow::anyhow!("login did not set a session cookie"))
    }

    pub async fn login_admin(&self) -> anyhow::Result<String> {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    /// Loads a dashboard page and pulls the form token out of it.
    pub async fn csrf_token(&self, cookie: &str) -> anyhow::Result<String> {
        let html = body_text(self.get("/dashboard/settings", Some(cookie)).await?).await?;
        extract_csrf_token(&html).ok_or_else(|| anyhow::anyhow!("no csrf token on page"))
    }

    pub async fn insert(&self, table: &str, row: Value) -> anyhow::Result<Value> {
        Ok(self.backend.insert(table, row).await?)
    }
}

pub fn session_cookie<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|value| value.split(';').next())
        .find(|pair| pair.starts_with("session=") && pair.len() > "session=".len())
        .map(str::to_string)
}

pub fn location<B>(response: &Response<B>) -> Option<String> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

pub async fn body_text(response: Response<Body>) -> anyhow::Result<String> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub async fn body_json(response: Response<Body>) -> anyhow::Result<Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = r#"name="csrf_token" value=""#;
    let start = html.find(marker)? + marker.len();
    let end = start + html[start..].find('"')?;
    Some(html[start..end].to_string())
}

fn form_body(fields: &[(&str, &str)]) -> String {
    fields
        .iter()
        .map(|(key, value)| format!("{}={}", encode(key), encode(value)))
        .collect::<Vec<_>>()
        .join("&")
}

fn encode(value: &str) -> String {
    value
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => (b as char).to_string(),
            b' ' => "+".to_string(),
            other => format!("%{:02X}", other),
        })
        .collect()
}

pub fn member_row(name: &str, email: &str, number: &str, status: &str, join_date: &str) -> Value {
    json!({
        "member_number": number,
        "full_name": name,
        "email": email,
        "status": status,
        "gender": "prefer_not_to_say",
        "join_date": join_date,
        "created_at": format!("{}T09:00:00Z", join_date),
    })
}
