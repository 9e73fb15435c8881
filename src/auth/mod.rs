//! Admin sign-in and the session gate in front of the dashboard.
//!
//! Passwords are checked by the identity provider. Whether the signed-in
//! user may use the dashboard is decided by their `profiles` role, and only
//! admins ever get a local session.

use std::sync::Arc;

use chrono::{Duration, Utc};
use cookie::{Cookie, SameSite};
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::{
    backend::IdentityProvider,
    error::{AppError, Result},
    domain::Profile,
    repository::ProfileRepository,
};

pub mod csrf;
pub mod session;

pub use csrf::CsrfService;
pub use session::Session;
use session::{NewSession, SessionStore};

pub const SESSION_COOKIE: &str = "session";

/// Outcome of checking a request's session cookie.
#[derive(Debug)]
pub enum Gate {
    Admin(Session, Profile),
    /// No cookie, or the session is unknown or expired.
    SignedOut,
    /// Signed in without the admin role. The session has been terminated.
    NotAdmin,
}

pub struct AuthService {
    session_store: SessionStore,
    identity: Arc<dyn IdentityProvider>,
    profiles: Arc<dyn ProfileRepository>,
    session_duration_hours: i64,
}

impl AuthService {
    pub fn new(
        pool: SqlitePool,
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileRepository>,
        session_duration_hours: i64,
    ) -> Self {
        Self {
            session_store: SessionStore::new(pool),
            identity,
            profiles,
            session_duration_hours,
        }
    }

    /// Signs in at the identity provider and opens a local session for
    /// admins. Anyone else is signed out again and gets `Forbidden`.
    pub async fn login(&self, email: &str, password: &str) -> Result<(Session, String)> {
        let auth = self
            .identity
            .sign_in_with_password(email.trim(), password)
            .await?;

        if self.admin_profile(auth.user.id).await.is_none() {
            tracing::warn!("Refused dashboard login for non-admin user {}", auth.user.id);
            if let Err(e) = self.identity.sign_out(&auth.access_token).await {
                tracing::error!("Failed to sign out non-admin user: {}", e);
            }
            return Err(AppError::Forbidden);
        }

        match self.session_store.cleanup_expired().await {
            Ok(0) => {}
            Ok(purged) => tracing::debug!("Purged {} expired sessions", purged),
            Err(e) => tracing::warn!("Failed to purge expired sessions: {}", e),
        }

        let token = generate_token();
        let session = self
            .session_store
            .create(
                NewSession {
                    user_id: auth.user.id,
                    email: auth.user.email.as_deref(),
                    access_token: &auth.access_token,
                    expires_at: Utc::now() + Duration::hours(self.session_duration_hours),
                },
                &token,
            )
            .await?;

        tracing::info!("Admin {} signed in", auth.user.email.as_deref().unwrap_or("unknown"));
        Ok((session, token))
    }

    /// The user's profile if it carries the admin role. A missing or
    /// unreadable profile counts as not admin.
    async fn admin_profile(&self, user_id: Uuid) -> Option<Profile> {
        match self.profiles.find_by_user(user_id).await {
            Ok(profile) => profile.filter(Profile::is_admin),
            Err(e) => {
                tracing::warn!("Failed to load profile for {}: {}", user_id, e);
                None
            }
        }
    }

    /// Resolves the session behind `token` and re-checks the admin role.
    pub async fn check_admin(&self, token: Option<&str>) -> Result<Gate> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Gate::SignedOut);
        };
        let Some(session) = self.session_store.find_by_token(token).await? else {
            return Ok(Gate::SignedOut);
        };

        match self.admin_profile(session.user_id).await {
            Some(profile) => Ok(Gate::Admin(session, profile)),
            None => {
                self.end_session(&session).await?;
                Ok(Gate::NotAdmin)
            }
        }
    }

    /// Logs out: drops the local session and revokes the provider token.
    pub async fn logout(&self, token: &str) -> Result<()> {
        if let Some(session) = self.session_store.find_by_token(token).await? {
            self.end_session(&session).await?;
        }
        Ok(())
    }

    async fn end_session(&self, session: &Session) -> Result<()> {
        self.session_store.delete(&session.id).await?;
        if let Err(e) = self.identity.sign_out(&session.access_token).await {
            tracing::warn!("Identity provider sign-out failed: {}", e);
        }
        Ok(())
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        self.session_store.cleanup_expired().await
    }

    pub fn create_session_cookie(&self, token: &str, secure: bool) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, token.to_string()))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .secure(secure)
            .max_age(cookie::time::Duration::hours(self.session_duration_hours))
            .build()
    }

    pub fn create_logout_cookie() -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, ""))
            .path("/")
            .same_site(SameSite::Lax)
            .http_only(true)
            .max_age(cookie::time::Duration::seconds(0))
            .build()
    }
}

pub(crate) fn generate_token() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_random_hex() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn only_hashes_are_stored() {
        let hash = session::hash_token("secret");
        assert_eq!(hash, session::hash_token("secret"));
        assert_ne!(hash, "secret");
        assert_eq!(hash.len(), 64);
    }
}
