use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::{
    backend::{RecordStore, Select},
    domain::CheckIn,
    error::Result,
    repository::ActivityRepository,
};

pub struct BackendActivityRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendActivityRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ActivityRepository for BackendActivityRepository {
    async fn recent_check_ins(&self, limit: usize) -> Result<Vec<CheckIn>> {
        self.store
            .select(
                &Select::from("check_ins")
                    .columns("id, member_id, check_in_time, members(full_name)")
                    .order("check_in_time", false)
                    .limit(limit),
            )
            .await?
            .decode()
    }

    async fn count_expiring_subscriptions(&self, until: NaiveDate) -> Result<u64> {
        let rows = self
            .store
            .select(
                &Select::from("member_subscriptions")
                    .columns("id")
                    .eq("status", "active")
                    .lte("end_date", until.format("%Y-%m-%d").to_string())
                    .exact_count(),
            )
            .await?;
        Ok(rows.total())
    }
}
