use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    backend::{RecordStore, Select},
    domain::Profile,
    error::Result,
    repository::ProfileRepository,
};

pub struct BackendProfileRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendProfileRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ProfileRepository for BackendProfileRepository {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>> {
        self.store
            .select(
                &Select::from("profiles")
                    .columns("id, role, full_name")
                    .eq("id", user_id.to_string())
                    .limit(1),
            )
            .await?
            .first()
    }
}
