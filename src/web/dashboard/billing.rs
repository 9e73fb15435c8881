use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;

use super::{base_context, format_timestamp, verify_csrf};
use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::{BillingCycle, CreatePlanRequest, Payment, PlanType, SubscriptionPlan},
    web::templates::{BaseContext, HtmlTemplate, SelectOption},
};

pub struct PlanCard {
    pub name: String,
    pub description: String,
    pub price: String,
    pub period: &'static str,
    pub plan_type: &'static str,
    pub duration: String,
    pub is_active: bool,
}

impl From<&SubscriptionPlan> for PlanCard {
    fn from(plan: &SubscriptionPlan) -> Self {
        Self {
            name: plan.name.clone(),
            description: plan.description.clone().unwrap_or_default(),
            price: plan.price.formatted(),
            period: plan.billing_cycle.period(),
            plan_type: plan.plan_type.label(),
            duration: match plan.duration_months {
                1 => "1 month".to_string(),
                n => format!("{} months", n),
            },
            is_active: plan.is_active,
        }
    }
}

pub struct PaymentRow {
    pub member_name: String,
    pub amount: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub method: String,
    pub invoice: String,
    pub date: String,
}

impl From<&Payment> for PaymentRow {
    fn from(payment: &Payment) -> Self {
        Self {
            member_name: payment.member_name().to_string(),
            amount: payment.amount.formatted(),
            status: payment.status.as_str(),
            status_label: payment.status.label(),
            method: payment.payment_method.clone().unwrap_or_default(),
            invoice: payment.invoice_number.clone().unwrap_or_default(),
            date: format_timestamp(payment.payment_date),
        }
    }
}

/// The create-plan form, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub plan_type: String,
    #[serde(default)]
    pub billing_cycle: String,
    #[serde(default)]
    pub duration_months: String,
}

impl PlanForm {
    fn to_request(&self) -> Result<CreatePlanRequest, String> {
        let duration_months = match self.duration_months.trim() {
            "" => None,
            raw => Some(
                raw.parse::<i32>()
                    .map_err(|_| format!("Invalid duration: {}", raw))?,
            ),
        };

        Ok(CreatePlanRequest {
            name: self.name.clone(),
            description: self.description.clone(),
            plan_type: self.plan_type.trim().parse()?,
            billing_cycle: self.billing_cycle.trim().parse()?,
            price: self.price.clone(),
            duration_months,
        })
    }
}

#[derive(Template)]
#[template(path = "dashboard/billing.html")]
pub struct BillingTemplate {
    pub base: BaseContext,
    pub plans: Vec<PlanCard>,
    pub payments: Vec<PaymentRow>,
    pub total_revenue: String,
    pub successful_count: usize,
    pub outstanding_count: usize,
    pub form: PlanForm,
    pub plan_type_options: Vec<SelectOption>,
    pub billing_cycle_options: Vec<SelectOption>,
    pub show_form: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
}

pub async fn billing_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
) -> Response {
    render_billing(&state, &admin, PlanForm::default(), None, None).await
}

pub async fn create_plan(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Form(form): Form<PlanForm>,
) -> Response {
    if let Err(rejection) = verify_csrf(&state, &admin, &form.csrf_token).await {
        return rejection;
    }

    let created = match form.to_request() {
        Ok(request) => state
            .service_context
            .billing_service
            .create_plan(request)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };

    match created {
        Ok(plan) => {
            let message = format!("Plan \"{}\" created", plan.name);
            render_billing(&state, &admin, PlanForm::default(), Some(message), None).await
        }
        Err(message) => {
            tracing::warn!("Could not create plan: {}", message);
            render_billing(&state, &admin, form, None, Some(message)).await
        }
    }
}

async fn render_billing(
    state: &AppState,
    admin: &CurrentAdmin,
    form: PlanForm,
    success_message: Option<String>,
    error_message: Option<String>,
) -> Response {
    let overview = state.service_context.billing_service.overview().await;

    let plan_type = if form.plan_type.is_empty() {
        PlanType::default().as_str().to_string()
    } else {
        form.plan_type.clone()
    };
    let billing_cycle = if form.billing_cycle.is_empty() {
        BillingCycle::default().as_str().to_string()
    } else {
        form.billing_cycle.clone()
    };

    HtmlTemplate(BillingTemplate {
        base: base_context(state, admin, "billing").await,
        plans: overview.plans.iter().map(PlanCard::from).collect(),
        payments: overview.payments.iter().map(PaymentRow::from).collect(),
        total_revenue: overview.summary.total_revenue.formatted(),
        successful_count: overview.summary.successful_count,
        outstanding_count: overview.summary.outstanding_count,
        plan_type_options: SelectOption::list(&PlanType::ALL, &plan_type, PlanType::as_str, PlanType::label),
        billing_cycle_options: SelectOption::list(
            &BillingCycle::ALL,
            &billing_cycle,
            BillingCycle::as_str,
            BillingCycle::label,
        ),
        show_form: error_message.is_some(),
        form,
        success_message,
        error_message,
        warnings: overview.warnings,
    })
    .into_response()
}
