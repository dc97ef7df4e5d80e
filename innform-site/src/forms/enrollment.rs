use super::FormState;
use crate::models::{Enrollment, EnrollmentInput, LoginCredential, Student};
use crate::services::eduplan::{BackendError, EduPlanBackend};

pub type EnrollmentForm = FormState<EnrollmentInput, Enrollment>;

impl EnrollmentForm {
    pub fn enrollment() -> Self {
        FormState::new("enrollment")
    }
}

/// The registered student matching both identifiers, `None` for a new
/// student, or a rejection when email and fiscal code belong to different
/// records.
async fn registered_student(
    backend: &dyn EduPlanBackend,
    email: &str,
    fiscal_code: Option<&str>,
) -> Result<Option<Student>, BackendError> {
    let by_email = backend
        .find_student(&LoginCredential::Email(email.to_string()))
        .await?;
    let by_code = match fiscal_code {
        Some(code) => {
            backend
                .find_student(&LoginCredential::FiscalCode(code.to_string()))
                .await?
        }
        None => None,
    };

    match (by_email, by_code) {
        (None, None) => Ok(None),
        (Some(a), Some(b)) if a.id == b.id => Ok(Some(a)),
        (Some(student), None) if student.fiscal_code.is_none() || fiscal_code.is_none() => {
            Ok(Some(student))
        }
        _ => Err(BackendError::Rejected {
            status: 409,
            message: Some(IDENTITY_MISMATCH.to_string()),
        }),
    }
}

const IDENTITY_MISMATCH: &str =
    "Email e codice fiscale risultano associati a studenti diversi. Contattaci per completare l'iscrizione.";

async fn enroll(
    backend: &dyn EduPlanBackend,
    input: EnrollmentInput,
) -> Result<Enrollment, BackendError> {
    let new_student = input.student();
    let existing =
        registered_student(backend, &new_student.email, new_student.fiscal_code.as_deref())
            .await?;

    let student = match existing {
        Some(student) => student,
        None => backend.create_student(&new_student).await?,
    };

    backend.create_enrollment(&input.request(&student.id)).await
}

/// Enroll in a program, registering the student on first enrollment.
pub async fn submit_enrollment(
    form: &mut EnrollmentForm,
    backend: &dyn EduPlanBackend,
    input: EnrollmentInput,
) {
    form.submit(input, |input| enroll(backend, input)).await;

    if let Some(enrollment) = form.data() {
        tracing::info!(
            enrollment_id = %enrollment.id,
            program_id = %enrollment.program_id,
            "Enrollment recorded"
        );
    }
}
