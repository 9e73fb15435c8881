pub mod billing_service;
pub mod dashboard_service;
pub mod member_service;
pub mod settings_service;

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::{
    auth::{AuthService, CsrfService},
    backend::Backend,
    config::Settings,
    error::Result,
    repository::*,
};
use billing_service::BillingService;
use dashboard_service::DashboardService;
use member_service::MemberService;
use settings_service::SettingsService;

pub struct ServiceContext {
    pub member_service: Arc<MemberService>,
    pub billing_service: Arc<BillingService>,
    pub dashboard_service: Arc<DashboardService>,
    pub settings_service: Arc<SettingsService>,
    pub auth_service: Arc<AuthService>,
    pub csrf_service: Arc<CsrfService>,
    pub db_pool: SqlitePool,
}

impl ServiceContext {
    pub fn new(backend: Backend, db_pool: SqlitePool, settings: &Settings) -> Self {
        let store = backend.store.clone();

        let member_repo: Arc<dyn MemberRepository> =
            Arc::new(BackendMemberRepository::new(store.clone()));
        let plan_repo: Arc<dyn PlanRepository> = Arc::new(BackendPlanRepository::new(store.clone()));
        let payment_repo: Arc<dyn PaymentRepository> =
            Arc::new(BackendPaymentRepository::new(store.clone()));
        let activity_repo: Arc<dyn ActivityRepository> =
            Arc::new(BackendActivityRepository::new(store.clone()));
        let settings_repo: Arc<dyn SettingsRepository> =
            Arc::new(BackendSettingsRepository::new(store.clone()));
        let profile_repo: Arc<dyn ProfileRepository> = Arc::new(BackendProfileRepository::new(store));

        let member_service = Arc::new(MemberService::new(member_repo.clone(), payment_repo.clone()));
        let billing_service = Arc::new(BillingService::new(
            plan_repo,
            payment_repo.clone(),
            settings.dashboard.recent_payments_limit,
        ));
        let dashboard_service = Arc::new(DashboardService::new(
            member_repo,
            payment_repo,
            activity_repo,
            settings.dashboard.clone(),
        ));
        let settings_service = Arc::new(SettingsService::new(settings_repo));

        let auth_service = Arc::new(AuthService::new(
            db_pool.clone(),
            backend.identity,
            profile_repo,
            settings.auth.session_duration_hours,
        ));
        let csrf_service = Arc::new(CsrfService::new(db_pool.clone()));

        Self {
            member_service,
            billing_service,
            dashboard_service,
            settings_service,
            auth_service,
            csrf_service,
            db_pool,
        }
    }
}

/// Unwraps one of several independent reads. A failed read is logged, noted
/// in `warnings` and replaced by `fallback` so the rest of the page renders.
pub(crate) fn settle<T>(result: Result<T>, fallback: T, what: &str, warnings: &mut Vec<String>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::error!("Failed to load {}: {}", what, e);
            warnings.push(format!("Could not load {}: {}", what, e));
            fallback
        }
    }
}
