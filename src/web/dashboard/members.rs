use askama::Template;
use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
    Extension, Form,
};
use serde::Deserialize;
use uuid::Uuid;

use super::{base_context, billing::PaymentRow, error_page, verify_csrf};
use crate::{
    api::{middleware::auth::CurrentAdmin, state::AppState},
    domain::{CreateMemberRequest, Gender, Member, MemberStatus, PaymentSummary},
    error::AppError,
    service::member_service::{filter_members, MemberFilter, StatusFilter},
    web::templates::{BaseContext, HtmlTemplate, SelectOption},
};

pub struct MemberRow {
    pub id: String,
    pub member_number: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub status: &'static str,
    pub status_label: &'static str,
    pub join_date: String,
}

impl From<&Member> for MemberRow {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.to_string(),
            member_number: member.member_number.clone(),
            full_name: member.full_name.clone(),
            email: member.email.clone(),
            phone: member.phone.clone().unwrap_or_default(),
            status: member.status.as_str(),
            status_label: member.status.label(),
            join_date: member.join_date.format("%b %-d, %Y").to_string(),
        }
    }
}

/// The add-member form, as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberForm {
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub date_of_birth: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub emergency_contact_name: String,
    #[serde(default)]
    pub emergency_contact_phone: String,
}

impl MemberForm {
    fn to_request(&self) -> Result<CreateMemberRequest, String> {
        Ok(CreateMemberRequest {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            date_of_birth: self.date_of_birth.clone(),
            gender: self.gender.trim().parse()?,
            address: self.address.clone(),
            city: self.city.clone(),
            emergency_contact_name: self.emergency_contact_name.clone(),
            emergency_contact_phone: self.emergency_contact_phone.clone(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct MembersQuery {
    #[serde(default)]
    pub q: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Template)]
#[template(path = "dashboard/members.html")]
pub struct MembersTemplate {
    pub base: BaseContext,
    pub query: String,
    pub status_options: Vec<SelectOption>,
    pub members: Vec<MemberRow>,
    pub total: usize,
    pub form: MemberForm,
    pub gender_options: Vec<SelectOption>,
    pub show_form: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub warnings: Vec<String>,
}

struct Notice {
    success: Option<String>,
    error: Option<String>,
    /// Reopen the add-member form with what was typed.
    show_form: bool,
}

pub async fn members_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Query(query): Query<MembersQuery>,
) -> Response {
    let (status, error) = match query.status.parse::<StatusFilter>() {
        Ok(status) => (status, None),
        Err(e) => (StatusFilter::All, Some(e)),
    };
    let filter = MemberFilter {
        query: query.q,
        status,
    };

    render_members(
        &state,
        &admin,
        filter,
        MemberForm::default(),
        Notice {
            success: None,
            error,
            show_form: false,
        },
    )
    .await
}

pub async fn create_member(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Form(form): Form<MemberForm>,
) -> Response {
    if let Err(rejection) = verify_csrf(&state, &admin, &form.csrf_token).await {
        return rejection;
    }

    let created = match form.to_request() {
        Ok(request) => state
            .service_context
            .member_service
            .create(request)
            .await
            .map_err(|e| e.to_string()),
        Err(e) => Err(e),
    };

    let (form, notice) = match created {
        Ok(member) => (
            MemberForm::default(),
            Notice {
                success: Some(format!(
                    "{} added with member number {}",
                    member.full_name, member.member_number
                )),
                error: None,
                show_form: false,
            },
        ),
        Err(message) => {
            tracing::warn!("Could not add member: {}", message);
            (
                form,
                Notice {
                    success: None,
                    error: Some(message),
                    show_form: true,
                },
            )
        }
    };

    render_members(&state, &admin, MemberFilter::default(), form, notice).await
}

async fn render_members(
    state: &AppState,
    admin: &CurrentAdmin,
    filter: MemberFilter,
    form: MemberForm,
    notice: Notice,
) -> Response {
    let mut warnings = Vec::new();
    let members = match state.service_context.member_service.list().await {
        Ok(members) => members,
        Err(e) => {
            tracing::error!("Failed to load members: {}", e);
            warnings.push(format!("Could not load members: {}", e));
            Vec::new()
        }
    };

    let rows = filter_members(&members, &filter)
        .iter()
        .map(MemberRow::from)
        .collect();
    let gender = if form.gender.is_empty() {
        Gender::default().as_str().to_string()
    } else {
        form.gender.clone()
    };

    HtmlTemplate(MembersTemplate {
        base: base_context(state, admin, "members").await,
        status_options: status_options(filter.status),
        query: filter.query,
        members: rows,
        total: members.len(),
        gender_options: SelectOption::list(&Gender::ALL, &gender, Gender::as_str, Gender::label),
        form,
        show_form: notice.show_form,
        success_message: notice.success,
        error_message: notice.error,
        warnings,
    })
    .into_response()
}

fn status_options(current: StatusFilter) -> Vec<SelectOption> {
    let mut options = vec![SelectOption {
        value: "all",
        label: "All statuses",
        selected: current == StatusFilter::All,
    }];
    options.extend(SelectOption::list(
        &MemberStatus::ALL,
        current.as_str(),
        MemberStatus::as_str,
        MemberStatus::label,
    ));
    options
}

const NOT_PROVIDED: &str = "Not provided";

#[derive(Template)]
#[template(path = "dashboard/member_detail.html")]
pub struct MemberDetailTemplate {
    pub base: BaseContext,
    pub member: MemberRow,
    pub fields: Vec<(&'static str, String)>,
    pub payments: Vec<PaymentRow>,
    pub total_paid: String,
}

pub async fn member_detail_page(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentAdmin>,
    Path(id): Path<String>,
) -> Response {
    let Ok(id) = Uuid::parse_str(&id) else {
        return error_page(&state, &admin, AppError::NotFound(format!("Member not found: {}", id))).await;
    };

    let detail = match state.service_context.member_service.get(id).await {
        Ok(detail) => detail,
        Err(e) => return error_page(&state, &admin, e).await,
    };
    let member = &detail.member;

    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| NOT_PROVIDED.to_string());
    let fields = vec![
        ("Phone", optional(&member.phone)),
        (
            "Date of birth",
            member
                .date_of_birth
                .map(|d| d.format("%b %-d, %Y").to_string())
                .unwrap_or_else(|| NOT_PROVIDED.to_string()),
        ),
        ("Gender", member.gender.label().to_string()),
        ("Address", optional(&member.address)),
        ("City", optional(&member.city)),
        ("Emergency contact", optional(&member.emergency_contact_name)),
        ("Emergency phone", optional(&member.emergency_contact_phone)),
    ];

    let total_paid = PaymentSummary::from_payments(&detail.payments).total_revenue;
    let payments = detail.payments.iter().map(PaymentRow::from).collect();

    HtmlTemplate(MemberDetailTemplate {
        base: base_context(&state, &admin, "members").await,
        member: MemberRow::from(member),
        fields,
        payments,
        total_paid: total_paid.formatted(),
    })
    .into_response()
}
