pub mod auth;
pub mod config;
pub mod forms;
pub mod handlers;
pub mod models;
pub mod seo;
pub mod services;
pub mod startup;

use config::Settings;
use service_core::error::AppError;
use services::eduplan::{build_backend, EduPlanBackend};
use services::lms::LmsClient;
use services::student_auth::{build_student_auth, StudentAuthApi};
use std::sync::Arc;

/// Shared application state: configuration and the external service clients.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub backend: Arc<dyn EduPlanBackend>,
    pub student_auth: Arc<dyn StudentAuthApi>,
    pub lms: Option<Arc<LmsClient>>,
}

impl AppState {
    /// Build the service clients selected by `settings`.
    pub fn new(settings: Settings) -> Result<Self, AppError> {
        let backend = build_backend(&settings.eduplan)?;
        let student_auth = build_student_auth(
            &settings.student_auth,
            backend.clone(),
            settings.server.session_ttl_hours,
        );
        let lms = settings
            .lms
            .url
            .as_ref()
            .map(|url| Arc::new(LmsClient::new(url.clone())));

        Ok(Self::from_parts(settings, backend, student_auth, lms))
    }

    pub fn from_parts(
        settings: Settings,
        backend: Arc<dyn EduPlanBackend>,
        student_auth: Arc<dyn StudentAuthApi>,
        lms: Option<Arc<LmsClient>>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            backend,
            student_auth,
            lms,
        }
    }
}
