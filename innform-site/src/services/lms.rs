//! Read-only client for the learning platform where enrolled students follow
//! their courses.

use crate::services::eduplan::BackendError;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use service_core::observability::TracedClientExt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CourseAccess {
    pub course_id: String,
    pub title: String,
    /// Completion percentage, 0 to 100.
    #[serde(default)]
    pub progress: u8,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub last_access: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct CoursesResponse {
    #[serde(default)]
    courses: Vec<CourseAccess>,
}

pub struct LmsClient {
    client: Client,
    base_url: String,
}

impl LmsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Courses the student can open on the platform, authorised with the
    /// student's session token.
    pub async fn list_courses(
        &self,
        student_id: &str,
        token: &str,
    ) -> Result<Vec<CourseAccess>, BackendError> {
        let url = format!(
            "{}/students/{}/courses",
            self.base_url,
            urlencoding::encode(student_id)
        );

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
                let body: CoursesResponse = response.json().await?;
                Ok(body.courses)
            }
            StatusCode::NOT_FOUND => Ok(Vec::new()),
            status => Err(BackendError::Rejected {
                status: status.as_u16(),
                message: None,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn lists_courses_with_progress() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/students/stu-1/courses"))
            .and(header("authorization", "Bearer tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "courses": [
                    {"course_id": "c-1", "title": "HACCP", "progress": 40, "url": "https://lms.test/c-1"}
                ]
            })))
            .mount(&server)
            .await;

        let courses = LmsClient::new(server.uri())
            .list_courses("stu-1", "tok-1")
            .await
            .unwrap();
        assert_eq!(courses.len(), 1);
        assert_eq!(courses[0].progress, 40);
    }

    #[tokio::test]
    async fn unknown_student_has_no_courses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/students/stu-2/courses"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let courses = LmsClient::new(server.uri())
            .list_courses("stu-2", "tok")
            .await
            .unwrap();
        assert!(courses.is_empty());
    }
}
