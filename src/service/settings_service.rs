use std::sync::Arc;

use crate::{domain::ClubInfo, error::Result, repository::SettingsRepository};

pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>) -> Self {
        Self { repo }
    }

    /// The stored club information, or the defaults when none was saved yet.
    pub async fn club_info(&self) -> Result<ClubInfo> {
        Ok(self.repo.load_club_info().await?.unwrap_or_default())
    }

    /// Replaces the whole record.
    pub async fn save_club_info(&self, info: ClubInfo) -> Result<ClubInfo> {
        let info = ClubInfo {
            name: info.name.trim().to_string(),
            address: info.address.trim().to_string(),
            city: info.city.trim().to_string(),
            phone: info.phone.trim().to_string(),
            email: info.email.trim().to_string(),
        };
        let saved = self.repo.save_club_info(&info).await?;
        tracing::info!("Club information updated");
        Ok(saved)
    }
}
