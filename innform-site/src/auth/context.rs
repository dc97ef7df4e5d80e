use crate::models::{LoginCredential, Student};
use crate::services::eduplan::UserMessage;
use crate::services::student_auth::{AuthApiError, StudentAuthApi};

#[derive(Debug, Clone, PartialEq)]
pub enum AuthStatus {
    /// Session restore has not finished yet.
    Initializing,
    Authenticated(Student),
    Anonymous,
}

/// Who is logged in, as seen by one request.
///
/// `Initializing -> Authenticated | Anonymous`, and
/// `Authenticated -> Anonymous` on logout or when the stored session turns
/// out to be invalid.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    status: AuthStatus,
    error: Option<String>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthState {
    pub fn new() -> Self {
        Self {
            status: AuthStatus::Initializing,
            error: None,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            status: AuthStatus::Anonymous,
            error: None,
        }
    }

    pub fn status(&self) -> &AuthStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == AuthStatus::Initializing
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self.status, AuthStatus::Authenticated(_))
    }

    pub fn current_student(&self) -> Option<&Student> {
        match &self.status {
            AuthStatus::Authenticated(student) => Some(student),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Resolve the initial state from a stored session token.
    pub async fn restore(&mut self, api: &dyn StudentAuthApi, token: Option<&str>) {
        let Some(token) = token else {
            self.status = AuthStatus::Anonymous;
            return;
        };

        match api.probe(token).await {
            Ok(student) => self.status = AuthStatus::Authenticated(student),
            Err(AuthApiError::InvalidSession) => {
                tracing::debug!("Stored student session is no longer valid");
                self.status = AuthStatus::Anonymous;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session probe failed");
                self.status = AuthStatus::Anonymous;
            }
        }
    }

    /// Issue one lookup for `credential`. Returns the session token on success.
    pub async fn login(
        &mut self,
        api: &dyn StudentAuthApi,
        credential: &LoginCredential,
    ) -> Option<String> {
        self.error = None;

        match api.login(credential).await {
            Ok(auth) => {
                tracing::info!(
                    student_id = %auth.student.id,
                    method = credential.kind(),
                    "Student logged in"
                );
                self.status = AuthStatus::Authenticated(auth.student);
                Some(auth.token)
            }
            Err(e) => {
                tracing::info!(method = credential.kind(), error = %e, "Student login failed");
                self.status = AuthStatus::Anonymous;
                self.error = Some(e.user_message());
                None
            }
        }
    }

    /// Record a failure that happened before any lookup, e.g. a malformed
    /// identifier.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = AuthStatus::Anonymous;
        self.error = Some(message.into());
    }

    pub fn logout(&mut self) {
        self.status = AuthStatus::Anonymous;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
