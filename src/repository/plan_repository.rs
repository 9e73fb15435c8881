use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    backend::{RecordStore, Select},
    domain::{NewPlan, SubscriptionPlan},
    error::{AppError, Result},
    repository::PlanRepository,
};

const TABLE: &str = "subscription_plans";

pub struct BackendPlanRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendPlanRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl PlanRepository for BackendPlanRepository {
    async fn list(&self) -> Result<Vec<SubscriptionPlan>> {
        self.store
            .select(&Select::from(TABLE).order("created_at", false))
            .await?
            .decode()
    }

    async fn create(&self, plan: NewPlan) -> Result<SubscriptionPlan> {
        let created = self.store.insert(TABLE, serde_json::to_value(&plan)?).await?;
        serde_json::from_value(created)
            .map_err(|e| AppError::Backend(format!("Unexpected plan row: {}", e)))
    }
}
