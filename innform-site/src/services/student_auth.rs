//! Student authentication.
//!
//! [`AuthClient`] talks to the live student-auth API. When no auth API is
//! configured, [`BackendLookupAuth`] authenticates by looking the student up
//! in EduPlan and keeps opaque session tokens in memory.

use crate::config::StudentAuthSettings;
use crate::models::{LoginCredential, Student};
use crate::services::eduplan::{BackendError, EduPlanBackend, UserMessage};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use service_core::observability::TracedClientExt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum AuthApiError {
    #[error("no student matches the credential")]
    UnknownStudent,

    #[error("session is no longer valid")]
    InvalidSession,

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl UserMessage for AuthApiError {
    fn user_message(&self) -> String {
        match self {
            AuthApiError::UnknownStudent => {
                "Nessuno studente trovato con i dati inseriti.".to_string()
            }
            AuthApiError::InvalidSession => {
                "La sessione è scaduta. Accedi di nuovo.".to_string()
            }
            AuthApiError::Backend(err) => err.user_message(),
        }
    }
}

/// Result of a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticatedStudent {
    pub token: String,
    pub student: Student,
}

#[async_trait]
pub trait StudentAuthApi: Send + Sync {
    async fn login(
        &self,
        credential: &LoginCredential,
    ) -> Result<AuthenticatedStudent, AuthApiError>;

    /// Check a stored token and return the student it belongs to.
    async fn probe(&self, token: &str) -> Result<Student, AuthApiError>;

    async fn logout(&self, token: &str) -> Result<(), AuthApiError>;
}

pub struct AuthClient {
    client: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct SessionResponse {
    student: Student,
}

#[derive(Deserialize, Default)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

impl AuthClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn rejected(response: reqwest::Response) -> BackendError {
        let status = response.status().as_u16();
        let body: ErrorResponse = response.json().await.unwrap_or_default();
        BackendError::Rejected {
            status,
            message: body.error,
        }
    }
}

#[async_trait]
impl StudentAuthApi for AuthClient {
    async fn login(
        &self,
        credential: &LoginCredential,
    ) -> Result<AuthenticatedStudent, AuthApiError> {
        let url = self.url("/auth/student/login");
        let response = self
            .client
            .traced_post(&url)
            .json(credential)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send POST request to {}: {}", url, e);
                BackendError::from(e)
            })?;

        match response.status() {
            status if status.is_success() => Ok(response
                .json::<AuthenticatedStudent>()
                .await
                .map_err(BackendError::from)?),
            StatusCode::NOT_FOUND | StatusCode::UNAUTHORIZED => Err(AuthApiError::UnknownStudent),
            _ => Err(Self::rejected(response).await.into()),
        }
    }

    async fn probe(&self, token: &str) -> Result<Student, AuthApiError> {
        let url = self.url("/auth/student/session");
        let response = self
            .client
            .traced_get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to send GET request to {}: {}", url, e);
                BackendError::from(e)
            })?;

        match response.status() {
            status if status.is_success() => {
                let body: SessionResponse = response.json().await.map_err(BackendError::from)?;
                Ok(body.student)
            }
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                Err(AuthApiError::InvalidSession)
            }
            _ => Err(Self::rejected(response).await.into()),
        }
    }

    async fn logout(&self, token: &str) -> Result<(), AuthApiError> {
        let url = self.url("/auth/student/logout");
        let response = self
            .client
            .traced_post(&url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(BackendError::from)?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::rejected(response).await.into())
        }
    }
}

/// Authenticates against EduPlan's student records directly.
///
/// Tokens live in memory and expire `ttl` after login. Expired entries are
/// evicted when probed and on every new login.
pub struct BackendLookupAuth {
    backend: Arc<dyn EduPlanBackend>,
    sessions: DashMap<String, IssuedToken>,
    ttl: Duration,
}

struct IssuedToken {
    student: Student,
    expires_at: DateTime<Utc>,
}

impl BackendLookupAuth {
    pub fn new(backend: Arc<dyn EduPlanBackend>) -> Self {
        Self::with_ttl(backend, Duration::hours(24))
    }

    pub fn with_ttl(backend: Arc<dyn EduPlanBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            sessions: DashMap::new(),
            ttl,
        }
    }

    fn evict_expired(&self, now: DateTime<Utc>) {
        self.sessions.retain(|_, issued| issued.expires_at > now);
    }
}

#[async_trait]
impl StudentAuthApi for BackendLookupAuth {
    async fn login(
        &self,
        credential: &LoginCredential,
    ) -> Result<AuthenticatedStudent, AuthApiError> {
        let student = self
            .backend
            .find_student(credential)
            .await?
            .ok_or(AuthApiError::UnknownStudent)?;

        let now = Utc::now();
        self.evict_expired(now);

        let token = Uuid::new_v4().to_string();
        self.sessions.insert(
            token.clone(),
            IssuedToken {
                student: student.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(AuthenticatedStudent { token, student })
    }

    async fn probe(&self, token: &str) -> Result<Student, AuthApiError> {
        let now = Utc::now();
        let expired = match self.sessions.get(token) {
            Some(issued) if issued.expires_at > now => return Ok(issued.student.clone()),
            Some(_) => true,
            None => false,
        };

        if expired {
            self.sessions.remove(token);
            tracing::debug!("Student session token expired");
        }
        Err(AuthApiError::InvalidSession)
    }

    async fn logout(&self, token: &str) -> Result<(), AuthApiError> {
        self.sessions.remove(token);
        Ok(())
    }
}

/// Pick the authenticator for the configuration.
pub fn build_student_auth(
    settings: &StudentAuthSettings,
    backend: Arc<dyn EduPlanBackend>,
    session_ttl_hours: i64,
) -> Arc<dyn StudentAuthApi> {
    match &settings.url {
        Some(url) => {
            tracing::info!(url = %url, "Using student-auth API");
            Arc::new(AuthClient::new(url.clone()))
        }
        None => {
            tracing::info!("No student-auth API configured, authenticating via EduPlan lookup");
            Arc::new(BackendLookupAuth::with_ttl(
                backend,
                Duration::hours(session_ttl_hours),
            ))
        }
    }
}
