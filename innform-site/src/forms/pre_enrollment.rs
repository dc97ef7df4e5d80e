use super::FormState;
use crate::models::{Enrollment, PreEnrollmentInput};
use crate::services::eduplan::EduPlanBackend;

pub type PreEnrollmentForm = FormState<PreEnrollmentInput, Enrollment>;

impl PreEnrollmentForm {
    pub fn pre_enrollment() -> Self {
        FormState::new("pre_enrollment")
    }
}

/// Request a place on a GOL or Master program. EduPlan records it as pending
/// until staff verify eligibility.
pub async fn submit_pre_enrollment(
    form: &mut PreEnrollmentForm,
    backend: &dyn EduPlanBackend,
    input: PreEnrollmentInput,
) {
    form.submit(input, |input| async move {
        backend.create_enrollment(&input.request()).await
    })
    .await;

    if let Some(enrollment) = form.data() {
        tracing::info!(
            enrollment_id = %enrollment.id,
            program_id = %enrollment.program_id,
            "Pre-enrollment recorded"
        );
    }
}
