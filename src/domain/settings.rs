use serde::{Deserialize, Serialize};

/// Key under which the club contact record lives in `system_settings`.
pub const CLUB_INFO_KEY: &str = "club_info";

/// Club contact details. Stored as one JSON value and replaced wholesale on
/// save; missing keys fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClubInfo {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
}

impl Default for ClubInfo {
    fn default() -> Self {
        Self {
            name: "Elite Fitness Club".to_string(),
            address: "123 Main Street".to_string(),
            city: "New York".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            email: "info@elitefitness.com".to_string(),
        }
    }
}
