use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub member_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "super::null_as_default")]
    pub gender: Gender,
    pub address: Option<String>,
    pub city: Option<String>,
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    pub status: MemberStatus,
    pub join_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Set by staff in the backend; nothing here moves a member between states.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum MemberStatus {
    Active,
    Frozen,
    Expired,
    Cancelled,
}

impl MemberStatus {
    pub const ALL: [MemberStatus; 4] = [
        MemberStatus::Active,
        MemberStatus::Frozen,
        MemberStatus::Expired,
        MemberStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Frozen => "frozen",
            MemberStatus::Expired => "expired",
            MemberStatus::Cancelled => "cancelled",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MemberStatus::Active => "Active",
            MemberStatus::Frozen => "Frozen",
            MemberStatus::Expired => "Expired",
            MemberStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MemberStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemberStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("Unknown member status: {}", s))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    PreferNotToSay,
}

impl Gender {
    pub const ALL: [Gender; 4] = [
        Gender::Male,
        Gender::Female,
        Gender::Other,
        Gender::PreferNotToSay,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
            Gender::PreferNotToSay => "prefer_not_to_say",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
            Gender::PreferNotToSay => "Prefer not to say",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            "other" => Ok(Gender::Other),
            "" | "prefer_not_to_say" => Ok(Gender::PreferNotToSay),
            _ => Err(format!("Unknown gender: {}", s)),
        }
    }
}

/// Admin-entered member details. Only the name and email are required; every
/// other field may be left blank.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateMemberRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
}

impl CreateMemberRequest {
    pub fn trimmed(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            date_of_birth: self.date_of_birth.trim().to_string(),
            gender: self.gender,
            address: self.address.trim().to_string(),
            city: self.city.trim().to_string(),
            emergency_contact_name: self.emergency_contact_name.trim().to_string(),
            emergency_contact_phone: self.emergency_contact_phone.trim().to_string(),
        }
    }
}

/// The row written to the `members` collection.
#[derive(Debug, Clone, Serialize)]
pub struct NewMember {
    pub member_number: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Gender,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact_phone: Option<String>,
    pub status: MemberStatus,
    pub join_date: NaiveDate,
}

impl NewMember {
    /// Builds the insert row from an already validated request.
    pub fn from_request(
        request: &CreateMemberRequest,
        member_number: String,
        join_date: NaiveDate,
    ) -> Result<Self, String> {
        let date_of_birth = match request.date_of_birth.as_str() {
            "" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .map_err(|_| format!("Invalid date of birth: {}", raw))?,
            ),
        };

        Ok(Self {
            member_number,
            full_name: request.full_name.clone(),
            email: request.email.clone(),
            phone: non_empty(&request.phone),
            date_of_birth,
            gender: request.gender,
            address: non_empty(&request.address),
            city: non_empty(&request.city),
            emergency_contact_name: non_empty(&request.emergency_contact_name),
            emergency_contact_phone: non_empty(&request.emergency_contact_phone),
            status: MemberStatus::Active,
            join_date,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Headline counts for the dashboard.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Headcount {
    pub total: u64,
    pub active: u64,
}

/// Minimal member projection embedded in payment and check-in rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRef {
    pub full_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_its_wire_name() {
        for status in MemberStatus::ALL {
            assert_eq!(status.as_str().parse::<MemberStatus>(), Ok(status));
        }
        assert!("archived".parse::<MemberStatus>().is_err());
    }

    #[test]
    fn new_member_drops_blank_optionals() {
        let request = CreateMemberRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            city: "Boston".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            ..Default::default()
        };
        let join_date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        let row = NewMember::from_request(&request, "EF123456007".to_string(), join_date).unwrap();
        let json = serde_json::to_value(&row).unwrap();

        assert_eq!(json["city"], "Boston");
        assert_eq!(json["date_of_birth"], "1990-04-12");
        assert_eq!(json["status"], "active");
        assert_eq!(json["gender"], "prefer_not_to_say");
        assert!(json.get("phone").is_none());
    }

    #[test]
    fn null_gender_reads_as_unspecified() {
        let member: Member = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "member_number": "EF123456007",
            "full_name": "Jane Doe",
            "email": "jane@example.com",
            "gender": null,
            "status": "active",
            "join_date": "2026-10-17",
            "created_at": "2026-10-17T09:00:00Z",
        }))
        .unwrap();

        assert_eq!(member.gender, Gender::PreferNotToSay);
    }

    #[test]
    fn new_member_rejects_bad_birth_date() {
        let request = CreateMemberRequest {
            full_name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            date_of_birth: "12/04/1990".to_string(),
            ..Default::default()
        };
        let join_date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();

        assert!(NewMember::from_request(&request, "EF000000000".to_string(), join_date).is_err());
    }
}
