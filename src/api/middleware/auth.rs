use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::{
    api::state::AppState,
    auth::{AuthService, Gate, Session, SESSION_COOKIE},
    domain::Profile,
    error::AppError,
};

/// The signed-in admin, available to handlers behind either gate.
#[derive(Clone, Debug)]
pub struct CurrentAdmin {
    pub session_id: String,
    pub user_id: Uuid,
    pub email: String,
    /// Profile name, or the email when the profile has none.
    pub display_name: String,
}

impl CurrentAdmin {
    pub fn new(session: Session, profile: &Profile) -> Self {
        let email = session.email.unwrap_or_default();
        Self {
            session_id: session.id,
            user_id: session.user_id,
            display_name: profile.display_name(&email),
            email,
        }
    }
}

async fn resolve(state: &AppState, jar: &CookieJar) -> Result<Gate, AppError> {
    let token = jar.get(SESSION_COOKIE).map(|cookie| cookie.value());
    state.service_context.auth_service.check_admin(token).await
}

/// JSON API gate: 401 without a session, 403 for non-admins.
pub async fn require_admin(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    match resolve(&state, &jar).await? {
        Gate::Admin(session, profile) => {
            request.extensions_mut().insert(CurrentAdmin::new(session, &profile));
            Ok(next.run(request).await)
        }
        Gate::SignedOut => Err(AppError::Unauthorized),
        Gate::NotAdmin => Ok((
            jar.add(AuthService::create_logout_cookie()),
            AppError::Forbidden,
        )
            .into_response()),
    }
}

/// Page gate: sends signed-out browsers to `/login` and non-admins to
/// `/unauthorized`. The page itself never runs for either.
pub async fn require_admin_redirect(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let gate = match resolve(&state, &jar).await {
        Ok(gate) => gate,
        Err(e) => {
            tracing::error!("Session check failed: {}", e);
            return e.into_response();
        }
    };

    match gate {
        Gate::Admin(session, profile) => {
            request.extensions_mut().insert(CurrentAdmin::new(session, &profile));
            next.run(request).await
        }
        Gate::SignedOut => {
            let jar = if jar.get(SESSION_COOKIE).is_some() {
                jar.add(AuthService::create_logout_cookie())
            } else {
                jar
            };
            (jar, Redirect::to("/login")).into_response()
        }
        Gate::NotAdmin => (
            jar.add(AuthService::create_logout_cookie()),
            Redirect::to("/unauthorized"),
        )
            .into_response(),
    }
}
