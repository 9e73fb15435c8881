//! In-process stand-in for the hosted backend.
//!
//! Rows are kept as JSON values per table and queried with the same
//! [`Select`] / [`Update`] descriptions the REST client sends, so pages behave
//! the same in demo mode and in tests as they do against the real service.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    query::compare_values, AuthSession, AuthUser, IdentityProvider, RecordStore, Rows, Select,
    Update,
};
use crate::{
    domain::Role,
    error::{AppError, Result},
};

/// Columns the real schema declares unique, besides every table's `id`.
const UNIQUE_COLUMNS: &[(&str, &str)] = &[
    ("members", "member_number"),
    ("system_settings", "setting_key"),
];

struct DemoUser {
    id: Uuid,
    email: String,
    password_hash: String,
}

#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, Vec<Value>>>,
    users: RwLock<HashMap<String, DemoUser>>,
    tokens: RwLock<HashMap<String, Uuid>>,
    failing: RwLock<HashSet<String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a login and its profile row.
    pub async fn register_user(&self, email: &str, password: &str, role: Role) -> Result<Uuid> {
        let email = email.trim().to_lowercase();
        if self.users.read().await.contains_key(&email) {
            return Err(AppError::Conflict(format!("User already registered: {}", email)));
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
            .to_string();

        let id = Uuid::new_v4();
        self.users.write().await.insert(
            email.clone(),
            DemoUser {
                id,
                email,
                password_hash,
            },
        );
        self.insert("profiles", json!({ "id": id, "role": role })).await?;

        Ok(id)
    }

    /// Makes every read of `table` fail until cleared, for exercising the
    /// "failed query stays empty" paths.
    pub async fn fail_table(&self, table: &str) {
        self.failing.write().await.insert(table.to_string());
    }

    pub async fn clear_failures(&self) {
        self.failing.write().await.clear();
    }

    /// Snapshot of a table's raw rows.
    pub async fn rows(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn active_tokens(&self) -> usize {
        self.tokens.read().await.len()
    }

    async fn check_failing(&self, table: &str) -> Result<()> {
        if self.failing.read().await.contains(table) {
            return Err(AppError::Backend(format!("{} is unavailable", table)));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryBackend {
    async fn select(&self, query: &Select) -> Result<Rows> {
        self.check_failing(&query.table).await?;

        let tables = self.tables.read().await;
        let empty = Vec::new();
        let source = tables.get(&query.table).unwrap_or(&empty);

        let mut matched: Vec<&Value> = source
            .iter()
            .filter(|row| query.filters.iter().all(|f| f.matches(row)))
            .collect();

        if let Some(order) = &query.order {
            matched.sort_by(|a, b| {
                let ordering = compare_values(
                    a.get(&order.column).unwrap_or(&Value::Null),
                    b.get(&order.column).unwrap_or(&Value::Null),
                )
                .unwrap_or(Ordering::Equal);
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        let count = query.count.then_some(matched.len() as u64);
        let columns = parse_columns(&query.columns);

        let rows = matched
            .into_iter()
            .take(query.limit.unwrap_or(usize::MAX))
            .map(|row| project(row, &columns, &tables))
            .collect();

        Ok(Rows { rows, count })
    }

    async fn insert(&self, table: &str, row: Value) -> Result<Value> {
        self.check_failing(table).await?;

        let Value::Object(mut fields) = row else {
            return Err(AppError::BadRequest("Row must be a JSON object".to_string()));
        };
        fields
            .entry("id")
            .or_insert_with(|| json!(Uuid::new_v4()));
        fields
            .entry("created_at")
            .or_insert_with(|| json!(Utc::now()));
        let row = Value::Object(fields);

        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();

        let unique: Vec<&str> = std::iter::once("id")
            .chain(
                UNIQUE_COLUMNS
                    .iter()
                    .filter(|(t, _)| *t == table)
                    .map(|(_, column)| *column),
            )
            .collect();
        for column in unique {
            let Some(value) = row.get(column) else { continue };
            if rows.iter().any(|existing| existing.get(column) == Some(value)) {
                return Err(AppError::Conflict(format!(
                    "duplicate key value violates unique constraint \"{}_{}_key\"",
                    table, column
                )));
            }
        }

        rows.push(row.clone());
        Ok(row)
    }

    async fn update(&self, update: &Update) -> Result<Vec<Value>> {
        self.check_failing(&update.table).await?;

        let Value::Object(values) = &update.values else {
            return Err(AppError::BadRequest("Update must be a JSON object".to_string()));
        };

        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&update.table) else {
            return Ok(Vec::new());
        };

        let mut updated = Vec::new();
        for row in rows.iter_mut() {
            if !update.filters.iter().all(|f| f.matches(row)) {
                continue;
            }
            if let Value::Object(fields) = row {
                for (key, value) in values {
                    fields.insert(key.clone(), value.clone());
                }
            }
            updated.push(row.clone());
        }

        Ok(updated)
    }
}

#[async_trait]
impl IdentityProvider for MemoryBackend {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession> {
        let invalid = || AppError::Authentication("Invalid login credentials".to_string());

        let users = self.users.read().await;
        let user = users.get(&email.trim().to_lowercase()).ok_or_else(invalid)?;

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|e| AppError::Internal(format!("Invalid password hash: {}", e)))?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(invalid());
        }

        let access_token = generate_token();
        self.tokens.write().await.insert(access_token.clone(), user.id);

        Ok(AuthSession {
            access_token,
            user: AuthUser {
                id: user.id,
                email: Some(user.email.clone()),
            },
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.tokens.write().await.remove(access_token);
        Ok(())
    }
}

#[derive(Debug, PartialEq)]
enum Column {
    All,
    Named(String),
    /// `members(full_name)`: the referenced row, found through `member_id`.
    Embed { table: String, columns: Vec<Column> },
}

fn parse_columns(raw_list: &str) -> Vec<Column> {
    let mut columns = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;

    for (i, ch) in raw_list.char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                columns.extend(parse_column(&raw_list[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    columns.extend(parse_column(&raw_list[start..]));
    columns
}

fn parse_column(raw: &str) -> Option<Column> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw == "*" {
        return Some(Column::All);
    }
    match raw.split_once('(') {
        Some((table, inner)) => Some(Column::Embed {
            table: table.trim().to_string(),
            columns: parse_columns(inner.trim_end_matches(')')),
        }),
        None => Some(Column::Named(raw.to_string())),
    }
}

fn project(row: &Value, columns: &[Column], tables: &HashMap<String, Vec<Value>>) -> Value {
    let mut out = Map::new();

    for column in columns {
        match column {
            Column::All => {
                if let Value::Object(fields) = row {
                    out.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
            }
            Column::Named(name) => {
                if let Some(value) = row.get(name) {
                    out.insert(name.clone(), value.clone());
                }
            }
            Column::Embed { table, columns } => {
                let foreign_key = format!("{}_id", table.trim_end_matches('s'));
                let embedded = row
                    .get(&foreign_key)
                    .and_then(|key| {
                        tables
                            .get(table)?
                            .iter()
                            .find(|candidate| candidate.get("id") == Some(key))
                    })
                    .map(|target| project(target, columns, tables))
                    .unwrap_or(Value::Null);
                out.insert(table.clone(), embedded);
            }
        }
    }

    Value::Object(out)
}

fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
