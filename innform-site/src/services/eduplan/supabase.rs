//! EduPlan tables through Supabase's PostgREST interface.

use super::{BackendError, EduPlanBackend};
use crate::config::BackendMode;
use crate::models::{
    Enrollment, Lead, LeadInput, LoginCredential, NewEnrollment, NewStudent, Student,
};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use service_core::observability::{TracedClientExt, TracedRequest};

pub struct SupabaseClient {
    client: Client,
    rest_url: String,
    anon_key: Secret<String>,
}

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

/// Unique-constraint violation in Postgres.
const UNIQUE_VIOLATION: &str = "23505";

impl SupabaseClient {
    pub fn new(project_url: impl Into<String>, anon_key: Secret<String>) -> Self {
        let project_url = project_url.into();
        Self {
            client: Client::new(),
            rest_url: format!("{}/rest/v1", project_url.trim_end_matches('/')),
            anon_key,
        }
    }

    fn authorize(&self, request: TracedRequest) -> TracedRequest {
        let key = self.anon_key.expose_secret();
        request.header("apikey", key).bearer_auth(key)
    }

    async fn rows<T: DeserializeOwned>(&self, request: TracedRequest) -> Result<Vec<T>, BackendError> {
        let response = self.authorize(request).send().await.map_err(|e| {
            tracing::error!(error = %e, "Supabase request failed");
            BackendError::from(e)
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: Option<PostgrestError> = response.json().await.ok();
        let message = body.and_then(|err| {
            if err.code.as_deref() == Some(UNIQUE_VIOLATION) {
                Some("Risulta già una richiesta con questi dati.".to_string())
            } else {
                err.message
            }
        });

        tracing::warn!(status = status.as_u16(), "Supabase reported a failure");
        Err(BackendError::Rejected {
            status: status.as_u16(),
            message,
        })
    }

    async fn insert<B, T>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self
            .client
            .traced_post(&format!("{}/{}", self.rest_url, table))
            .header("Prefer", "return=representation")
            .json(body);

        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::Decode(format!("insert into {} returned no row", table)))
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        order: Option<&str>,
    ) -> Result<Vec<T>, BackendError> {
        let mut query: Vec<(&str, String)> = vec![("select", "*".to_string())];
        query.extend(
            filters
                .iter()
                .map(|(column, value)| (*column, format!("eq.{}", value))),
        );
        if let Some(order) = order {
            query.push(("order", order.to_string()));
        }

        let request = self
            .client
            .traced_get(&format!("{}/{}", self.rest_url, table))
            .query(&query);
        self.rows(request).await
    }
}

#[async_trait]
impl EduPlanBackend for SupabaseClient {
    fn mode(&self) -> BackendMode {
        BackendMode::Supabase
    }

    async fn create_lead(&self, lead: &LeadInput) -> Result<Lead, BackendError> {
        self.insert("leads", &lead.record()).await
    }

    async fn create_student(&self, student: &NewStudent) -> Result<Student, BackendError> {
        self.insert("students", student).await
    }

    async fn find_student(
        &self,
        credential: &LoginCredential,
    ) -> Result<Option<Student>, BackendError> {
        let students: Vec<Student> = self
            .select(
                "students",
                &[(credential.kind(), credential.value().to_string())],
                None,
            )
            .await?;
        Ok(students.into_iter().next())
    }

    async fn create_enrollment(
        &self,
        enrollment: &NewEnrollment,
    ) -> Result<Enrollment, BackendError> {
        self.insert("enrollments", enrollment).await
    }

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, BackendError> {
        self.select(
            "enrollments",
            &[("student_id", student_id.to_string())],
            Some("created_at.desc"),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> SupabaseClient {
        SupabaseClient::new(server.uri(), Secret::new("anon-key".to_string()))
    }

    #[tokio::test]
    async fn insert_sends_keys_and_returns_first_row() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/students"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
                "id": "stu-9",
                "first_name": "Luca",
                "last_name": "Bianchi",
                "email": "luca@example.com"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let student = client(&server)
            .create_student(&NewStudent {
                first_name: "Luca".into(),
                last_name: "Bianchi".into(),
                email: "luca@example.com".into(),
                fiscal_code: None,
                phone: None,
            })
            .await
            .unwrap();

        assert_eq!(student.id, "stu-9");
    }

    #[tokio::test]
    async fn lookup_uses_eq_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/students"))
            .and(query_param("email", "eq.x@example.com"))
            .and(query_param("select", "*"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let found = client(&server)
            .find_student(&LoginCredential::Email("x@example.com".into()))
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn unique_violation_maps_to_readable_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/leads"))
            .respond_with(ResponseTemplate::new(409).set_body_json(json!({
                "code": "23505",
                "message": "duplicate key value violates unique constraint"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .create_lead(&LeadInput {
                name: "Maria".into(),
                email: "maria@example.com".into(),
                message: "Info".into(),
                privacy_consent: true,
                ..Default::default()
            })
            .await
            .unwrap_err();

        match err {
            BackendError::Rejected { status, message } => {
                assert_eq!(status, 409);
                assert_eq!(
                    message.as_deref(),
                    Some("Risulta già una richiesta con questi dati.")
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
