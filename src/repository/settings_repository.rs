use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use crate::{
    backend::{RecordStore, Select, Update},
    domain::{ClubInfo, CLUB_INFO_KEY},
    error::Result,
    repository::SettingsRepository,
};

const TABLE: &str = "system_settings";

#[derive(Deserialize)]
struct SettingRow {
    setting_value: ClubInfo,
}

pub struct BackendSettingsRepository {
    store: Arc<dyn RecordStore>,
}

impl BackendSettingsRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SettingsRepository for BackendSettingsRepository {
    async fn load_club_info(&self) -> Result<Option<ClubInfo>> {
        let row: Option<SettingRow> = self
            .store
            .select(
                &Select::from(TABLE)
                    .columns("setting_value")
                    .eq("setting_key", CLUB_INFO_KEY)
                    .limit(1),
            )
            .await?
            .first()?;

        Ok(row.map(|row| row.setting_value))
    }

    async fn save_club_info(&self, info: &ClubInfo) -> Result<ClubInfo> {
        let updated = self
            .store
            .update(
                &Update::table(
                    TABLE,
                    json!({ "setting_value": info, "updated_at": Utc::now() }),
                )
                .eq("setting_key", CLUB_INFO_KEY),
            )
            .await?;

        if updated.is_empty() {
            tracing::info!("No {} record yet, inserting one", CLUB_INFO_KEY);
            self.store
                .insert(
                    TABLE,
                    json!({ "setting_key": CLUB_INFO_KEY, "setting_value": info }),
                )
                .await?;
        }

        Ok(info.clone())
    }
}
