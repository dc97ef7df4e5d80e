//! Form submission state.
//!
//! A [`FormState`] wraps exactly one backend "create" call:
//! `Idle -> Loading -> Success` or `Idle -> Loading -> Error`, and `reset`
//! goes back to `Idle`. Input is validated before the call; a validation
//! failure never reaches the backend.

pub mod contact;
pub mod enrollment;
pub mod pre_enrollment;

pub use contact::{submit_contact, ContactForm};
pub use enrollment::{submit_enrollment, EnrollmentForm};
pub use pre_enrollment::{submit_pre_enrollment, PreEnrollmentForm};

use crate::services::eduplan::UserMessage;
use metrics::counter;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use validator::{Validate, ValidationErrors};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// Field name to message, caught before any network call.
    Validation(BTreeMap<String, String>),
    /// The call failed or the backend refused it.
    Submission(String),
}

impl FormError {
    fn from_validation(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|error| error.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "Valore non valido".to_string());
                (field.to_string(), message)
            })
            .collect();
        FormError::Validation(fields)
    }

    pub fn message(&self) -> String {
        match self {
            FormError::Validation(_) => "Controlla i campi evidenziati.".to_string(),
            FormError::Submission(message) => message.clone(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, FormError::Validation(_))
    }
}

#[derive(Debug, Clone)]
pub struct FormState<I, T> {
    name: &'static str,
    values: I,
    phase: Phase,
    error: Option<FormError>,
    data: Option<T>,
}

impl<I, T> FormState<I, T>
where
    I: Validate + Default + Clone,
{
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            values: I::default(),
            phase: Phase::Idle,
            error: None,
            data: None,
        }
    }

    /// Initial field values, e.g. a program chosen from a course page.
    pub fn prefill(mut self, values: I) -> Self {
        self.values = values;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }

    pub fn is_success(&self) -> bool {
        self.phase == Phase::Success
    }

    pub fn values(&self) -> &I {
        &self.values
    }

    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(FormError::message)
    }

    /// Inline message for one field after a failed validation.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        match &self.error {
            Some(FormError::Validation(fields)) => fields.get(field).map(String::as_str),
            _ => None,
        }
    }

    /// Entity returned by the backend on success.
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    /// Validate and enter `Loading`. Returns the payload to send, or `None`
    /// when validation failed and nothing must be sent.
    pub fn start(&mut self, values: I) -> Option<I> {
        self.values = values;

        if let Err(errors) = self.values.validate() {
            self.phase = Phase::Error;
            self.error = Some(FormError::from_validation(&errors));
            counter!("form_submissions_total", "form" => self.name, "outcome" => "invalid")
                .increment(1);
            return None;
        }

        self.phase = Phase::Loading;
        self.error = None;
        Some(self.values.clone())
    }

    /// Record the outcome of the call started by [`FormState::start`].
    pub fn complete<E>(&mut self, result: Result<T, E>)
    where
        E: UserMessage + Display,
    {
        match result {
            Ok(entity) => {
                self.phase = Phase::Success;
                self.error = None;
                self.data = Some(entity);
                counter!("form_submissions_total", "form" => self.name, "outcome" => "success")
                    .increment(1);
            }
            Err(err) => {
                tracing::warn!(form = self.name, error = %err, "Form submission failed");
                self.phase = Phase::Error;
                self.error = Some(FormError::Submission(err.user_message()));
                counter!("form_submissions_total", "form" => self.name, "outcome" => "error")
                    .increment(1);
            }
        }
    }

    /// Validate, call the backend once, record the outcome.
    pub async fn submit<F, Fut, E>(&mut self, values: I, call: F) -> &Self
    where
        F: FnOnce(I) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: UserMessage + Display,
    {
        if let Some(payload) = self.start(values) {
            let result = call(payload).await;
            self.complete(result);
        }
        self
    }

    pub fn reset(&mut self) {
        self.values = I::default();
        self.phase = Phase::Idle;
        self.error = None;
        self.data = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Lead, LeadInput};
    use crate::services::eduplan::{BackendError, RETRY_MESSAGE};
    use chrono::Utc;
    use std::cell::Cell;

    fn valid_input() -> LeadInput {
        LeadInput {
            name: "Maria Rossi".to_string(),
            email: "maria@example.com".to_string(),
            message: "Vorrei informazioni".to_string(),
            privacy_consent: true,
            ..Default::default()
        }
    }

    fn lead_from(input: &LeadInput) -> Lead {
        Lead {
            id: "lead-1".to_string(),
            name: input.name.clone(),
            email: input.email.clone(),
            phone: None,
            message: input.message.clone(),
            course_interest: None,
            privacy_consent: true,
            marketing_consent: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn start_enters_loading_and_complete_enters_success() {
        let mut form: FormState<LeadInput, Lead> = FormState::new("contact");
        assert_eq!(form.phase(), Phase::Idle);

        let payload = form.start(valid_input()).unwrap();
        assert!(form.is_loading());
        assert!(form.error().is_none());

        let lead = lead_from(&payload);
        form.complete::<BackendError>(Ok(lead.clone()));
        assert!(form.is_success());
        assert!(!form.is_loading());
        assert_eq!(form.data(), Some(&lead));
    }

    #[tokio::test]
    async fn invalid_input_never_calls_backend() {
        let calls = Cell::new(0);
        let mut form: FormState<LeadInput, Lead> = FormState::new("contact");

        form.submit(
            LeadInput {
                name: String::new(),
                ..valid_input()
            },
            |input| {
                calls.set(calls.get() + 1);
                async move { Ok::<_, BackendError>(lead_from(&input)) }
            },
        )
        .await;

        assert_eq!(calls.get(), 0);
        assert_eq!(form.phase(), Phase::Error);
        assert!(form.error().unwrap().is_validation());
        assert_eq!(form.field_error("name"), Some("Campo obbligatorio"));
        assert!(!form.is_success());
    }

    #[tokio::test]
    async fn backend_failure_sets_message_and_clears_loading() {
        let mut form: FormState<LeadInput, Lead> = FormState::new("contact");

        form.submit(valid_input(), |_| async {
            Err::<Lead, _>(BackendError::Transport("connection reset".to_string()))
        })
        .await;

        assert_eq!(form.phase(), Phase::Error);
        assert!(!form.is_loading());
        assert!(!form.is_success());
        assert_eq!(form.error_message().as_deref(), Some(RETRY_MESSAGE));
    }

    #[tokio::test]
    async fn resubmitting_clears_previous_error() {
        let mut form: FormState<LeadInput, Lead> = FormState::new("contact");
        form.submit(valid_input(), |_| async {
            Err::<Lead, _>(BackendError::Transport("timeout".to_string()))
        })
        .await;
        assert!(form.error().is_some());

        form.submit(valid_input(), |input| async move {
            Ok::<_, BackendError>(lead_from(&input))
        })
        .await;
        assert!(form.error().is_none());
        assert!(form.is_success());
    }

    #[tokio::test]
    async fn reset_after_success_matches_initial_state() {
        let initial: FormState<LeadInput, Lead> = FormState::new("contact");
        let mut form: FormState<LeadInput, Lead> = FormState::new("contact");

        form.submit(valid_input(), |input| async move {
            Ok::<_, BackendError>(lead_from(&input))
        })
        .await;
        assert!(form.is_success());

        form.reset();
        assert_eq!(form.phase(), initial.phase());
        assert_eq!(form.values(), initial.values());
        assert_eq!(form.error(), None);
        assert!(!form.is_success());
        assert!(form.data().is_none());
    }
}
