use std::sync::Arc;

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::{
    config::DashboardConfig,
    domain::{Activity, Headcount, Money},
    repository::{ActivityRepository, MemberRepository, PaymentRepository},
    service::settle,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardStats {
    pub total_members: u64,
    pub active_members: u64,
    pub monthly_revenue: Money,
    pub new_members_this_month: u64,
    pub expiring_subscriptions: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSummary {
    pub stats: DashboardStats,
    pub recent_activity: Vec<Activity>,
    pub warnings: Vec<String>,
}

/// First day of `now`'s month, and the first and last instants of it (UTC).
pub fn month_bounds(now: DateTime<Utc>) -> (NaiveDate, DateTime<Utc>, DateTime<Utc>) {
    let today = now.date_naive();
    let first = today - Days::new(u64::from(today.day0()));
    let later = first + Days::new(32);
    let next_first = later - Days::new(u64::from(later.day0()));

    let start = DateTime::from_naive_utc_and_offset(first.and_time(NaiveTime::MIN), Utc);
    let end = DateTime::from_naive_utc_and_offset(next_first.and_time(NaiveTime::MIN), Utc)
        - Duration::milliseconds(1);

    (first, start, end)
}

pub struct DashboardService {
    member_repo: Arc<dyn MemberRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    activity_repo: Arc<dyn ActivityRepository>,
    config: DashboardConfig,
}

impl DashboardService {
    pub fn new(
        member_repo: Arc<dyn MemberRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        activity_repo: Arc<dyn ActivityRepository>,
        config: DashboardConfig,
    ) -> Self {
        Self {
            member_repo,
            payment_repo,
            activity_repo,
            config,
        }
    }

    pub async fn summary(&self) -> DashboardSummary {
        self.summary_at(Utc::now()).await
    }

    /// Runs every read at once; a failed read counts as zero or empty.
    pub async fn summary_at(&self, now: DateTime<Utc>) -> DashboardSummary {
        let (month_start_date, month_start, month_end) = month_bounds(now);
        let expiring_until =
            now.date_naive() + Duration::days(self.config.expiring_window_days.max(0));

        let (headcount, revenue, new_members, expiring, check_ins) = tokio::join!(
            self.member_repo.headcount(),
            self.payment_repo
                .successful_amounts_between(month_start, month_end),
            self.member_repo.count_joined_since(month_start_date),
            self.activity_repo
                .count_expiring_subscriptions(expiring_until),
            self.activity_repo
                .recent_check_ins(self.config.check_in_feed_limit),
        );

        let mut warnings = Vec::new();
        let headcount = settle(headcount, Headcount::default(), "member counts", &mut warnings);
        let revenue = settle(revenue, Vec::new(), "monthly revenue", &mut warnings);
        let new_members = settle(new_members, 0, "new members", &mut warnings);
        let expiring = settle(expiring, 0, "expiring subscriptions", &mut warnings);
        let check_ins = settle(check_ins, Vec::new(), "recent check-ins", &mut warnings);

        DashboardSummary {
            stats: DashboardStats {
                total_members: headcount.total,
                active_members: headcount.active,
                monthly_revenue: revenue.into_iter().sum(),
                new_members_this_month: new_members,
                expiring_subscriptions: expiring,
            },
            recent_activity: check_ins.into_iter().map(Activity::from).collect(),
            warnings,
        }
    }
}
