//! Typed access to the club's collections in the hosted record store.
//!
//! Each trait covers one collection; the `Backend*` implementations build
//! [`Select`](crate::backend::Select) queries and decode the JSON rows.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::*;
use crate::error::Result;

pub mod activity_repository;
pub mod member_repository;
pub mod payment_repository;
pub mod plan_repository;
pub mod profile_repository;
pub mod settings_repository;

pub use activity_repository::BackendActivityRepository;
pub use member_repository::BackendMemberRepository;
pub use payment_repository::BackendPaymentRepository;
pub use plan_repository::BackendPlanRepository;
pub use profile_repository::BackendProfileRepository;
pub use settings_repository::BackendSettingsRepository;

#[async_trait]
pub trait MemberRepository: Send + Sync {
    /// Every member, newest first.
    async fn list(&self) -> Result<Vec<Member>>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Member>>;
    async fn create(&self, member: NewMember) -> Result<Member>;
    async fn headcount(&self) -> Result<Headcount>;
    async fn count_joined_since(&self, date: NaiveDate) -> Result<u64>;
}

#[async_trait]
pub trait PlanRepository: Send + Sync {
    /// Every subscription plan, newest first.
    async fn list(&self) -> Result<Vec<SubscriptionPlan>>;
    async fn create(&self, plan: NewPlan) -> Result<SubscriptionPlan>;
}

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// The latest payments by payment date, member name embedded.
    async fn recent(&self, limit: usize) -> Result<Vec<Payment>>;
    async fn find_by_member(&self, member_id: Uuid) -> Result<Vec<Payment>>;
    /// Amounts of successful payments dated within `[from, to]`.
    async fn successful_amounts_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Money>>;
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn load_club_info(&self) -> Result<Option<ClubInfo>>;
    async fn save_club_info(&self, info: &ClubInfo) -> Result<ClubInfo>;
}

#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Profile>>;
}

#[async_trait]
pub trait ActivityRepository: Send + Sync {
    async fn recent_check_ins(&self, limit: usize) -> Result<Vec<CheckIn>>;
    /// Active subscriptions whose end date is on or before `until`.
    async fn count_expiring_subscriptions(&self, until: NaiveDate) -> Result<u64>;
}
