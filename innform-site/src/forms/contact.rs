use super::FormState;
use crate::models::{Lead, LeadInput};
use crate::services::eduplan::EduPlanBackend;

pub type ContactForm = FormState<LeadInput, Lead>;

impl ContactForm {
    pub fn contact() -> Self {
        FormState::new("contact")
    }
}

/// Send a contact request to EduPlan as a new lead.
pub async fn submit_contact(form: &mut ContactForm, backend: &dyn EduPlanBackend, input: LeadInput) {
    form.submit(input, |lead| async move { backend.create_lead(&lead).await })
        .await;

    if let Some(lead) = form.data() {
        tracing::info!(lead_id = %lead.id, "Contact request recorded");
    }
}
