//! EduPlan REST API client.
//!
//! Every endpoint answers with an envelope: `{"success": true, "data": ...}`
//! or `{"success": false, "error": "..."}`.

use super::{BackendError, EduPlanBackend};
use crate::config::BackendMode;
use crate::models::{
    Enrollment, Lead, LeadInput, LoginCredential, NewEnrollment, NewStudent, Student,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use service_core::observability::{TracedClientExt, TracedRequest};

pub struct EduPlanApiClient {
    client: Client,
    base_url: String,
    api_key: Option<Secret<String>>,
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    success: bool,
    data: Option<T>,
    #[serde(default)]
    error: Option<String>,
}

impl EduPlanApiClient {
    pub fn new(base_url: impl Into<String>, api_key: Option<Secret<String>>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: TracedRequest) -> TracedRequest {
        match &self.api_key {
            Some(key) => request.bearer_auth(key.expose_secret()),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: TracedRequest) -> Result<T, BackendError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!(error = %e, "EduPlan request failed");
            BackendError::from(e)
        })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::NotFound);
        }

        let envelope: Envelope<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(BackendError::Decode(e.to_string())),
            Err(_) => {
                return Err(BackendError::Rejected {
                    status: status.as_u16(),
                    message: None,
                })
            }
        };

        if status.is_success() && envelope.success {
            return envelope
                .data
                .ok_or_else(|| BackendError::Decode("envelope without data".to_string()));
        }

        tracing::warn!(
            status = status.as_u16(),
            error = envelope.error.as_deref().unwrap_or(""),
            "EduPlan reported a failure"
        );
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message: envelope.error,
        })
    }
}

#[async_trait]
impl EduPlanBackend for EduPlanApiClient {
    fn mode(&self) -> BackendMode {
        BackendMode::Api
    }

    async fn create_lead(&self, lead: &LeadInput) -> Result<Lead, BackendError> {
        let request = self
            .client
            .traced_post(&self.url("/leads"))
            .json(&lead.record());
        self.send(request).await
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student, BackendError> {
        let request = self.client.traced_post(&self.url("/students")).json(student);
        self.send(request).await
    }

    async fn find_student(
        &self,
        credential: &LoginCredential,
    ) -> Result<Option<Student>, BackendError> {
        let request = self
            .client
            .traced_get(&self.url("/students/lookup"))
            .query(&[(credential.kind(), credential.value())]);

        match self.send(request).await {
            Ok(student) => Ok(Some(student)),
            Err(BackendError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_enrollment(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, BackendError> {
        let request = self
            .client
            .traced_post(&self.url("/enrollments"))
            .json(enrollment);
        self.send(request).await
    }

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, BackendError> {
        let path = format!("/students/{}/enrollments", urlencoding::encode(student_id));
        let request = self.client.traced_get(&self.url(&path));
        self.send(request).await
    }
}
