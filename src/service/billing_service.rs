use std::sync::Arc;

use serde::Serialize;
use validator::Validate;

use crate::{
    domain::{CreatePlanRequest, NewPlan, Payment, PaymentSummary, SubscriptionPlan},
    error::{AppError, Result},
    repository::{PaymentRepository, PlanRepository},
    service::settle,
};

#[derive(Debug, Clone, Default, Serialize)]
pub struct BillingOverview {
    pub plans: Vec<SubscriptionPlan>,
    pub payments: Vec<Payment>,
    pub summary: PaymentSummary,
    /// Reads that failed; their section is shown empty.
    pub warnings: Vec<String>,
}

pub struct BillingService {
    plan_repo: Arc<dyn PlanRepository>,
    payment_repo: Arc<dyn PaymentRepository>,
    recent_payments_limit: usize,
}

impl BillingService {
    pub fn new(
        plan_repo: Arc<dyn PlanRepository>,
        payment_repo: Arc<dyn PaymentRepository>,
        recent_payments_limit: usize,
    ) -> Self {
        Self {
            plan_repo,
            payment_repo,
            recent_payments_limit,
        }
    }

    /// Plans and recent payments, loaded together. The summary only covers
    /// the payments that were loaded.
    pub async fn overview(&self) -> BillingOverview {
        let (plans, payments) = tokio::join!(
            self.plan_repo.list(),
            self.payment_repo.recent(self.recent_payments_limit),
        );

        let mut warnings = Vec::new();
        let plans = settle(plans, Vec::new(), "subscription plans", &mut warnings);
        let payments = settle(payments, Vec::new(), "payments", &mut warnings);
        let summary = PaymentSummary::from_payments(&payments);

        BillingOverview {
            plans,
            payments,
            summary,
            warnings,
        }
    }

    /// A form missing its name or price, or with an unparseable price, never
    /// reaches the backend.
    pub async fn create_plan(&self, request: CreatePlanRequest) -> Result<SubscriptionPlan> {
        let request = request.trimmed();
        request.validate()?;
        let plan = NewPlan::from_request(&request).map_err(AppError::Validation)?;

        let created = self.plan_repo.create(plan).await?;
        tracing::info!("Created subscription plan {}", created.name);
        Ok(created)
    }
}
