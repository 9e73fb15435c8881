use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::member::MemberRef;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
    pub id: Uuid,
    pub member_id: Option<Uuid>,
    pub check_in_time: DateTime<Utc>,
    #[serde(default, rename = "members", skip_serializing_if = "Option::is_none")]
    pub member: Option<MemberRef>,
}

/// One line of the dashboard activity feed.
#[derive(Debug, Clone, Serialize)]
pub struct Activity {
    pub id: Uuid,
    pub kind: &'static str,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<CheckIn> for Activity {
    fn from(check_in: CheckIn) -> Self {
        let name = check_in
            .member
            .map(|m| m.full_name)
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Member".to_string());

        Self {
            id: check_in.id,
            kind: "check_in",
            message: format!("{} checked in", name),
            timestamp: check_in.check_in_time,
        }
    }
}
