pub mod enrollment;
pub mod lead;
pub mod program;
pub mod student;

pub use enrollment::{
    Enrollment, EnrollmentInput, EnrollmentKind, EnrollmentStatus, NewEnrollment, PaymentStatus,
    PreEnrollmentInput,
};
pub use lead::{Lead, LeadInput, LeadRecord};
pub use program::{Program, ProgramCategory};
pub use student::{CredentialError, LoginCredential, NewStudent, Student};

use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use validator::ValidationError;

/// HTML checkboxes post `on` when ticked and nothing otherwise.
pub(crate) fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(matches!(
        value.as_deref().map(str::trim),
        Some("on" | "true" | "1" | "yes")
    ))
}

pub(crate) fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("required");
        err.message = Some(Cow::Borrowed("Campo obbligatorio"));
        return Err(err);
    }
    Ok(())
}

pub(crate) fn consent_given(value: &bool) -> Result<(), ValidationError> {
    if !*value {
        let mut err = ValidationError::new("consent_required");
        err.message = Some(Cow::Borrowed(
            "È necessario accettare l'informativa sulla privacy",
        ));
        return Err(err);
    }
    Ok(())
}

/// Empty optional form fields become `None`.
pub(crate) fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Consent {
        #[serde(default, deserialize_with = "checkbox")]
        accepted: bool,
    }

    #[test]
    fn checkbox_accepts_html_on_value() {
        let ticked: Consent = serde_json::from_str(r#"{"accepted":"on"}"#).unwrap();
        assert!(ticked.accepted);

        let missing: Consent = serde_json::from_str("{}").unwrap();
        assert!(!missing.accepted);

        let other: Consent = serde_json::from_str(r#"{"accepted":"off"}"#).unwrap();
        assert!(!other.accepted);
    }

    #[test]
    fn blank_text_is_rejected() {
        assert!(not_blank("   ").is_err());
        assert!(not_blank("Maria").is_ok());
        assert_eq!(optional("  "), None);
        assert_eq!(optional(" 333 "), Some("333".to_string()));
    }
}
