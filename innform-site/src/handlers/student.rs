use super::Layout;
use crate::auth::StudentSession;
use crate::models::{Enrollment, EnrollmentKind, EnrollmentStatus, PaymentStatus};
use crate::seo::{DocumentMeta, SeoHead};
use crate::services::eduplan::UserMessage;
use crate::services::lms::CourseAccess;
use crate::AppState;
use askama::Template;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Extension,
};

/// One enrollment as listed in the student area.
pub struct EnrollmentRow {
    pub program_id: String,
    pub program_title: String,
    pub kind: &'static str,
    pub status: EnrollmentStatus,
    pub payment_status: PaymentStatus,
    pub created_on: String,
}

impl From<&Enrollment> for EnrollmentRow {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            program_id: enrollment.program_id.clone(),
            program_title: enrollment.program_title().to_string(),
            kind: match enrollment.kind {
                EnrollmentKind::PreEnrollment => "Preiscrizione",
                EnrollmentKind::Enrollment => "Iscrizione",
            },
            status: enrollment.status,
            payment_status: enrollment.payment_status,
            created_on: enrollment.created_at.format("%d/%m/%Y").to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate<'a> {
    pub layout: Layout<'a>,
    pub enrollments: Vec<EnrollmentRow>,
    pub enrollments_error: Option<String>,
    pub courses: Vec<CourseAccess>,
    pub courses_error: Option<String>,
    pub lms_enabled: bool,
}

pub async fn dashboard_handler(
    State(state): State<AppState>,
    Extension(current): Extension<StudentSession>,
) -> Response {
    let student = &current.student;

    let (enrollments, enrollments_error) = match state.backend.list_enrollments(&student.id).await
    {
        Ok(enrollments) => (enrollments.iter().map(EnrollmentRow::from).collect(), None),
        Err(e) => {
            tracing::error!(student_id = %student.id, error = %e, "Failed to list enrollments");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let (courses, courses_error) = match &state.lms {
        Some(lms) => match lms.list_courses(&student.id, &current.token).await {
            Ok(courses) => (courses, None),
            Err(e) => {
                tracing::warn!(student_id = %student.id, error = %e, "Failed to list LMS courses");
                (Vec::new(), Some(e.user_message()))
            }
        },
        None => (Vec::new(), None),
    };

    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/area-studenti")
        .title("Area studenti")
        .noindex()
        .mount(&mut meta);

    DashboardTemplate {
        layout: Layout::new(&head, site, Some(student), "student"),
        enrollments,
        enrollments_error,
        courses,
        courses_error,
        lms_enabled: state.lms.is_some(),
    }
    .into_response()
}
