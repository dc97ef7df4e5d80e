//! Persistence of the student session in the cookie-backed server session.

use super::context::AuthState;
use crate::models::{LoginCredential, Student};
use crate::services::student_auth::StudentAuthApi;
use crate::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tower_sessions::Session;

const TOKEN_KEY: &str = "student_token";
const STUDENT_KEY: &str = "student";

/// The auth state for one request plus the session it is stored in.
pub struct AuthContext {
    session: Session,
    state: AuthState,
    token: Option<String>,
}

impl AuthContext {
    /// Restore from the stored token, probing the auth API.
    pub async fn restore(session: Session, api: &dyn StudentAuthApi) -> Self {
        let token: Option<String> = session.get(TOKEN_KEY).await.unwrap_or(None);
        let mut state = AuthState::new();
        state.restore(api, token.as_deref()).await;

        let mut context = Self {
            session,
            state,
            token,
        };

        match context.state.current_student().cloned() {
            Some(student) => context.cache_student(&student).await,
            None if context.token.is_some() => {
                // Stored token was rejected
                context.forget().await;
                context.token = None;
            }
            None => {}
        }

        context
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub async fn login(&mut self, api: &dyn StudentAuthApi, credential: &LoginCredential) -> bool {
        let Some(token) = self.state.login(api, credential).await else {
            return false;
        };

        // New session id on privilege change
        if let Err(e) = self.session.cycle_id().await {
            tracing::warn!(error = %e, "Failed to rotate session id");
        }

        if let Err(e) = self.session.insert(TOKEN_KEY, &token).await {
            tracing::error!(error = %e, "Failed to store student session");
            self.state.logout();
            self.state
                .fail("Impossibile avviare la sessione. Riprova.");
            return false;
        }

        if let Some(student) = self.state.current_student().cloned() {
            self.cache_student(&student).await;
        }
        self.token = Some(token);
        true
    }

    /// Clear the local session now; revoke the token remotely in the
    /// background without waiting for it.
    pub async fn logout(&mut self, api: Arc<dyn StudentAuthApi>) {
        self.state.logout();
        let token = self.token.take();
        self.forget().await;

        if let Some(token) = token {
            tokio::spawn(async move {
                match api.logout(&token).await {
                    Ok(()) => tracing::info!("Student session revoked"),
                    Err(e) => tracing::error!("Failed to revoke student session: {}", e),
                }
            });
        }
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.state.fail(message);
    }

    async fn cache_student(&self, student: &Student) {
        if let Err(e) = self.session.insert(STUDENT_KEY, student).await {
            tracing::warn!(error = %e, "Failed to cache student in session");
        }
    }

    async fn forget(&self) {
        if let Err(e) = self.session.flush().await {
            tracing::warn!(error = %e, "Failed to clear session");
        }
    }
}

/// Student cached in the session, without contacting the auth API.
///
/// Used by public pages to show the logged-in navigation. Guarded pages go
/// through the route guard, which re-validates the session.
pub struct CurrentStudent(pub Option<Student>);

#[async_trait]
impl FromRequestParts<AppState> for CurrentStudent {
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to extract session",
                )
                    .into_response()
            })?;

        let student: Option<Student> = session.get(STUDENT_KEY).await.unwrap_or(None);
        Ok(CurrentStudent(student))
    }
}
