use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
    backend::{RecordStore, Select},
    domain::{Headcount, Member, MemberStatus, NewMember},
    error::{AppError, Result},
    repository::MemberRepository,
};

const TABLE: &str = "members";

pub struct BackendMemberRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendMemberRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl MemberRepository for BackendMemberRepository {
    async fn list(&self) -> Result<Vec<Member>> {
        self.store
            .select(&Select::from(TABLE).order("created_at", false))
            .await?
            .decode()
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>> {
        self.store
            .select(&Select::from(TABLE).eq("id", id.to_string()).limit(1))
            .await?
            .first()
    }

    async fn create(&self, member: NewMember) -> Result<Member> {
        let row = serde_json::to_value(&member)?;
        let created = self.store.insert(TABLE, row).await?;
        serde_json::from_value(created)
            .map_err(|e| AppError::Backend(format!("Unexpected member row: {}", e)))
    }

    async fn headcount(&self) -> Result<Headcount> {
        let all = Select::from(TABLE).columns("id").exact_count();
        let active = Select::from(TABLE)
            .columns("id")
            .eq("status", MemberStatus::Active.as_str())
            .exact_count();

        let (all, active) = tokio::try_join!(self.store.select(&all), self.store.select(&active))?;

        Ok(Headcount {
            total: all.total(),
            active: active.total(),
        })
    }

    async fn count_joined_since(&self, date: NaiveDate) -> Result<u64> {
        let rows = self
            .store
            .select(
                &Select::from(TABLE)
                    .columns("id")
                    .gte("join_date", date.format("%Y-%m-%d").to_string())
                    .exact_count(),
            )
            .await?;
        Ok(rows.total())
    }
}
