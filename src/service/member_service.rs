use std::{str::FromStr, sync::Arc};

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

use crate::{
    domain::{CreateMemberRequest, Member, MemberStatus, NewMember, Payment},
    error::{AppError, Result},
    repository::{MemberRepository, PaymentRepository},
};

/// Attempts at a fresh member number before a unique-key clash is reported.
const MEMBER_NUMBER_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(MemberStatus),
}

impl StatusFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Only(status) => status.as_str(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" | "all" => Ok(StatusFilter::All),
            other => other.parse().map(StatusFilter::Only),
        }
    }
}

/// Search box plus status dropdown of the member directory.
#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub query: String,
    pub status: StatusFilter,
}

impl MemberFilter {
    pub fn matches(&self, member: &Member) -> bool {
        let status_ok = match self.status {
            StatusFilter::All => true,
            StatusFilter::Only(status) => member.status == status,
        };

        let needle = self.query.to_lowercase();
        let text_ok = needle.is_empty()
            || [&member.full_name, &member.email, &member.member_number]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));

        status_ok && text_ok
    }
}

/// Keeps the members `filter` accepts, preserving their order.
pub fn filter_members(members: &[Member], filter: &MemberFilter) -> Vec<Member> {
    members
        .iter()
        .filter(|member| filter.matches(member))
        .cloned()
        .collect()
}

/// `EF` + last six digits of the millisecond clock + three random digits.
pub fn member_number_from(millis: i64, random: u16) -> String {
    format!("EF{:06}{:03}", millis.rem_euclid(1_000_000), random % 1000)
}

pub fn generate_member_number() -> String {
    let random = rand::thread_rng().gen_range(0..1000);
    member_number_from(Utc::now().timestamp_millis(), random)
}

#[derive(Debug, Clone, Serialize)]
pub struct MemberDetail {
    pub member: Member,
    pub payments: Vec<Payment>,
}

pub struct MemberService {
    member_repo: Arc<dyn MemberRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
}

impl MemberService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            member_repo,
            payment_repo,
        }
    }

    pub async fn list(&self) -> Result<Vec<Member>> {
        self.member_repo.list().await
    }

    pub async fn get(&self, id: Uuid) -> Result<MemberDetail> {
        let member = self
            .member_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member not found: {}", id)))?;
        let payments = self.payment_repo.find_by_member(id).await?;

        Ok(MemberDetail { member, payments })
    }

    /// Validates the form and inserts the member. Nothing reaches the backend
    /// when a required field is missing.
    pub async fn create(&self, request: CreateMemberRequest) -> Result<Member> {
        let request = request.trimmed();
        request.validate()?;

        let join_date = Utc::now().date_naive();
        let mut attempt = 1;
        loop {
            let member = NewMember::from_request(&request, generate_member_number(), join_date)
                .map_err(AppError::Validation)?;
            let number = member.member_number.clone();

            match self.member_repo.create(member).await {
                Ok(created) => {
                    tracing::info!("Created member {} ({})", created.full_name, created.member_number);
                    return Ok(created);
                }
                Err(AppError::Conflict(message)) if attempt < MEMBER_NUMBER_ATTEMPTS => {
                    tracing::warn!("Member number {} rejected ({}), retrying", number, message);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Gender;
    use chrono::NaiveDate;

    fn member(name: &str, email: &str, number: &str, status: MemberStatus) -> Member {
        Member {
            id: Uuid::new_v4(),
            member_number: number.to_string(),
            full_name: name.to_string(),
            email: email.to_string(),
            phone: None,
            date_of_birth: None,
            gender: Gender::default(),
            address: None,
            city: None,
            emergency_contact_name: None,
            emergency_contact_phone: None,
            status,
            join_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn roster() -> Vec<Member> {
        vec![
            member("Ada Lovelace", "ada@example.com", "EF123456001", MemberStatus::Active),
            member("Grace Hopper", "grace@navy.mil", "EF654321002", MemberStatus::Frozen),
            member("Alan Turing", "alan@bletchley.uk", "EF111111003", MemberStatus::Expired),
            member("Katherine Johnson", "kj@nasa.gov", "EF222222004", MemberStatus::Cancelled),
        ]
    }

    #[test]
    fn search_is_a_case_insensitive_subset() {
        let members = roster();
        for query in ["", "a", "ADA", "navy", "ef6543", "zzz", "  turing  "] {
            let filter = MemberFilter {
                query: query.to_string(),
                status: StatusFilter::All,
            };
            let found = filter_members(&members, &filter);
            let needle = query.to_lowercase();

            assert!(found.len() <= members.len());
            for m in &found {
                assert!(members.iter().any(|original| original.id == m.id));
                assert!(
                    [&m.full_name, &m.email, &m.member_number]
                        .iter()
                        .any(|f| f.to_lowercase().contains(&needle)),
                    "{} should not match {:?}",
                    m.full_name,
                    query
                );
            }
        }
    }

    #[test]
    fn surrounding_spaces_are_part_of_the_query() {
        let members = roster();
        let filter = MemberFilter {
            query: "  turing  ".to_string(),
            status: StatusFilter::All,
        };
        assert!(filter_members(&members, &filter).is_empty());

        let filter = MemberFilter {
            query: "ada lov".to_string(),
            status: StatusFilter::All,
        };
        let found = filter_members(&members, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].full_name, "Ada Lovelace");
    }

    #[test]
    fn all_status_is_identity() {
        let members = roster();
        let found = filter_members(&members, &MemberFilter::default());
        let ids: Vec<_> = found.iter().map(|m| m.id).collect();
        let expected: Vec<_> = members.iter().map(|m| m.id).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn status_filter_is_exact() {
        let members = roster();
        for status in MemberStatus::ALL {
            let filter = MemberFilter {
                query: String::new(),
                status: StatusFilter::Only(status),
            };
            let found = filter_members(&members, &filter);
            assert_eq!(found.len(), 1);
            assert!(found.iter().all(|m| m.status == status));
        }
    }

    #[test]
    fn parses_status_filter() {
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!("".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "frozen".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(MemberStatus::Frozen))
        );
        assert!("vip".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn member_numbers_follow_the_pattern() {
        assert_eq!(member_number_from(1_760_000_123_456, 7), "EF123456007");
        assert_eq!(member_number_from(42, 999), "EF000042999");

        for _ in 0..50 {
            let number = generate_member_number();
            assert_eq!(number.len(), 11);
            assert!(number.starts_with("EF"));
            assert!(number[2..].chars().all(|c| c.is_ascii_digit()));
        }
    }
}
