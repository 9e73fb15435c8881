//! HTTP client for a Supabase-compatible project: PostgREST under
//! `/rest/v1` and GoTrue under `/auth/v1`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AuthSession, IdentityProvider, RecordStore, Rows, Select, Update};
use crate::{
    config::BackendConfig,
    error::{AppError, Result},
};

pub struct RestBackend {
    client: Client,
    base_url: String,
    service_key: String,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if config.url.is_empty() {
            return Err(AppError::Config("backend.url is not set".to_string()));
        }
        if config.service_key.is_empty() {
            return Err(AppError::Config("backend.service_key is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    /// Record-store calls run with the service key; the server does its own
    /// admin gating before any of them happen.
    fn with_service_key(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = error_message(&body).unwrap_or(body);

        Err(match status {
            StatusCode::NOT_FOUND => AppError::NotFound(message),
            StatusCode::CONFLICT => AppError::Conflict(message),
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => AppError::BadRequest(message),
            _ => AppError::Backend(format!("{}: {}", status, message)),
        })
    }
}

#[async_trait]
impl RecordStore for RestBackend {
    async fn select(&self, query: &Select) -> Result<Rows> {
        let mut request = self
            .with_service_key(self.client.get(self.table_url(&query.table)))
            .query(&query.to_params());
        if query.count {
            request = request.header("Prefer", "count=exact");
        }

        tracing::debug!("select from {}", query.table);
        let response = Self::check(request.send().await?).await?;

        let count = response
            .headers()
            .get(header::CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_content_range);
        let rows: Vec<Value> = response.json().await?;

        Ok(Rows { rows, count })
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        let request = self
            .with_service_key(self.client.post(self.table_url(table)))
            .header("Prefer", "return=representation")
            .json(&row);

        tracing::debug!("insert into {}", table);
        let response = Self::check(request.send().await?).await?;
        let rows: Vec<Value> = response.json().await?;

        rows.into_iter()
            .next()
            .ok_or_else(|| AppError::Backend(format!("Insert into {} returned no row", table)))
    }

    async fn update(&self, update: &Update) -> Result<Vec<Value>> {
        let request = self
            .with_service_key(self.client.patch(self.table_url(&update.table)))
            .query(&update.to_params())
            .header("Prefer", "return=representation")
            .json(&update.values);

        tracing::debug!("update {}", update.table);
        let response = Self::check(request.send().await?).await?;
        Ok(response.json().await?)
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    user: super::AuthUser,
}

#[async_trait]
impl IdentityProvider for RestBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let response = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .header("apikey", &self.service_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| "Invalid login credentials".to_string());
            return Err(AppError::Authentication(message));
        }

        let token: TokenResponse = Self::check(response).await?.json().await?;
        Ok(AuthSession {
            access_token: token.access_token,
            user: token.user,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.auth_url("logout"))
            .header("apikey", &self.service_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        // An already expired token is as signed out as it gets.
        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(());
        }
        Self::check(response).await?;
        Ok(())
    }
}

/// Total from a `Content-Range` header such as `0-9/42` or `*/0`.
fn parse_content_range(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}

/// PostgREST reports `message`; GoTrue uses `error_description` or `msg`.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error_description", "msg", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BackendKind;

    #[test]
    fn content_range_totals() {
        assert_eq!(parse_content_range("0-9/42"), Some(42));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-9/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn extracts_error_messages() {
        assert_eq!(
            error_message(r#"{"code":"23505","message":"duplicate key value"}"#),
            Some("duplicate key value".to_string())
        );
        assert_eq!(
            error_message(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#),
            Some("Invalid login credentials".to_string())
        );
        assert_eq!(error_message("not json"), None);
    }

    #[test]
    fn refuses_to_start_without_credentials() {
        let config = BackendConfig {
            kind: BackendKind::Rest,
            url: "https://example.supabase.co".to_string(),
            service_key: String::new(),
            timeout_secs: 5,
            demo_admin_email: String::new(),
            demo_admin_password: String::new(),
            demo_members: 0,
        };
        assert!(matches!(RestBackend::new(&config), Err(AppError::Config(_))));
    }
}
