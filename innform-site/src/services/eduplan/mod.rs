//! EduPlan backend integration.
//!
//! The site talks to EduPlan through [`EduPlanBackend`]. One implementation is
//! chosen from [`BackendMode`] when the application starts; call sites never
//! branch on the mode.

pub mod api;
pub mod local;
pub mod supabase;

pub use api::EduPlanApiClient;
pub use local::LocalBackend;
pub use supabase::SupabaseClient;

use crate::config::{BackendMode, EduPlanSettings};
use crate::models::{
    Enrollment, Lead, LeadInput, LoginCredential, NewEnrollment, NewStudent, Student,
};
use async_trait::async_trait;
use service_core::error::AppError;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    /// The request did not complete.
    #[error("transport error: {0}")]
    Transport(String),

    /// The request completed and the backend reported a failure.
    #[error("backend rejected request ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    #[error("not found")]
    NotFound,

    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Text shown to the visitor when an operation fails.
pub trait UserMessage {
    fn user_message(&self) -> String;
}

pub const RETRY_MESSAGE: &str =
    "Servizio momentaneamente non raggiungibile. Riprova tra qualche minuto.";

impl UserMessage for BackendError {
    fn user_message(&self) -> String {
        match self {
            BackendError::Rejected {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            BackendError::Rejected { .. } => {
                "La richiesta non è stata accettata. Verifica i dati inseriti.".to_string()
            }
            BackendError::NotFound => "Elemento non trovato.".to_string(),
            BackendError::Transport(_) | BackendError::Decode(_) => RETRY_MESSAGE.to_string(),
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            BackendError::Decode(err.to_string())
        } else {
            BackendError::Transport(err.to_string())
        }
    }
}

/// Operations the site consumes from EduPlan. All canonical state (ids,
/// statuses, timestamps) is assigned by the implementation's backing system.
#[async_trait]
pub trait EduPlanBackend: Send + Sync {
    fn mode(&self) -> BackendMode;

    async fn create_lead(&self, lead: &LeadInput) -> Result<Lead, BackendError>;

    async fn create_student(&self, student: &NewStudent) -> Result<Student, BackendError>;

    /// Look a student up by email or fiscal code. `Ok(None)` when unknown.
    async fn find_student(
        &self,
        credential: &LoginCredential,
    ) -> Result<Option<Student>, BackendError>;

    async fn create_enrollment(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, BackendError>;

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, BackendError>;
}

/// Select the backend for the configured mode.
pub fn build_backend(settings: &EduPlanSettings) -> Result<Arc<dyn EduPlanBackend>, AppError> {
    let backend: Arc<dyn EduPlanBackend> = match settings.mode {
        BackendMode::Local => Arc::new(LocalBackend::new()),
        BackendMode::Api => {
            let url = settings.api_url.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!("eduplan.api_url is required in api mode"))
            })?;
            Arc::new(EduPlanApiClient::new(url, settings.api_key.clone()))
        }
        BackendMode::Supabase => {
            let url = settings.supabase_url.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "eduplan.supabase_url is required in supabase mode"
                ))
            })?;
            let key = settings.supabase_anon_key.clone().ok_or_else(|| {
                AppError::ConfigError(anyhow::anyhow!(
                    "eduplan.supabase_anon_key is required in supabase mode"
                ))
            })?;
            Arc::new(SupabaseClient::new(url, key))
        }
    };

    tracing::info!(mode = %backend.mode(), "EduPlan backend selected");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::Secret;

    fn settings(mode: BackendMode) -> EduPlanSettings {
        EduPlanSettings {
            mode,
            api_url: None,
            api_key: None,
            supabase_url: None,
            supabase_anon_key: None,
        }
    }

    #[test]
    fn selects_backend_by_mode() {
        let local = build_backend(&settings(BackendMode::Local)).unwrap();
        assert_eq!(local.mode(), BackendMode::Local);

        let api = build_backend(&EduPlanSettings {
            api_url: Some("http://eduplan.test".to_string()),
            ..settings(BackendMode::Api)
        })
        .unwrap();
        assert_eq!(api.mode(), BackendMode::Api);

        let supabase = build_backend(&EduPlanSettings {
            supabase_url: Some("http://supabase.test".to_string()),
            supabase_anon_key: Some(Secret::new("anon".to_string())),
            ..settings(BackendMode::Supabase)
        })
        .unwrap();
        assert_eq!(supabase.mode(), BackendMode::Supabase);
    }

    #[test]
    fn remote_modes_require_urls() {
        assert!(matches!(
            build_backend(&settings(BackendMode::Api)),
            Err(AppError::ConfigError(_))
        ));
        assert!(matches!(
            build_backend(&settings(BackendMode::Supabase)),
            Err(AppError::ConfigError(_))
        ));
    }

    #[test]
    fn user_messages_follow_error_kind() {
        let rejected = BackendError::Rejected {
            status: 409,
            message: Some("Preiscrizione già presente".to_string()),
        };
        assert_eq!(rejected.user_message(), "Preiscrizione già presente");

        let transport = BackendError::Transport("connection refused".to_string());
        assert_eq!(transport.user_message(), RETRY_MESSAGE);

        let silent = BackendError::Rejected {
            status: 500,
            message: None,
        };
        assert!(silent.user_message().contains("non è stata accettata"));
    }
}
