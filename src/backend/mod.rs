//! Client side of the hosted backend-as-a-service.
//!
//! The club's data and user accounts live in a remote service: a PostgREST
//! record store and a GoTrue-style identity provider. Everything above this
//! module talks to the two traits below, so the REST client and the
//! in-process [`MemoryBackend`] are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{
    config::BackendConfig,
    error::Result,
};

pub mod memory;
pub mod query;
pub mod rest;

pub use memory::MemoryBackend;
pub use query::{Filter, FilterOp, Order, Rows, Select, Update};
pub use rest::RestBackend;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn select(&self, query: &Select) -> Result<Rows>;
    /// Inserts one row and returns it as stored, defaults filled in.
    async fn insert(&self, table: &str, row: Value) -> Result<Value>;
    /// Returns the rows after the update; empty when nothing matched.
    async fn update(&self, update: &Update) -> Result<Vec<Value>>;
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession>;
    async fn sign_out(&self, access_token: &str) -> Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: AuthUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    pub email: Option<String>,
}

/// The pair of remote services a running server talks to.
#[derive(Clone)]
pub struct Backend {
    pub store: Arc<dyn RecordStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backend {
    pub fn rest(config: &BackendConfig) -> Result<Self> {
        let client = Arc::new(RestBackend::new(config)?);
        Ok(Self {
            store: client.clone(),
            identity: client,
        })
    }

    pub fn memory(backend: Arc<MemoryBackend>) -> Self {
        Self {
            store: backend.clone(),
            identity: backend,
        }
    }
}
