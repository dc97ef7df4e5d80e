use super::{checkbox, consent_given, not_blank, optional};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Contact-form submission as typed by the visitor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct LeadInput {
    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub name: String,

    #[validate(email(message = "Indirizzo email non valido"))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub course_interest: String,

    #[validate(custom(function = "consent_given"))]
    #[serde(default, deserialize_with = "checkbox")]
    pub privacy_consent: bool,

    #[serde(default, deserialize_with = "checkbox")]
    pub marketing_consent: bool,
}

/// Wire shape of a new lead sent to EduPlan.
#[derive(Debug, Serialize)]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub course_interest: Option<String>,
    pub privacy_consent: bool,
    pub marketing_consent: bool,
    pub source: &'static str,
}

impl LeadInput {
    pub fn interested_in(&self, program_id: &str) -> bool {
        self.course_interest == program_id
    }

    pub fn record(&self) -> LeadRecord {
        LeadRecord {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            phone: optional(&self.phone),
            message: self.message.trim().to_string(),
            course_interest: optional(&self.course_interest),
            privacy_consent: self.privacy_consent,
            marketing_consent: self.marketing_consent,
            source: "website",
        }
    }
}

/// A lead as stored by EduPlan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub message: String,
    #[serde(default)]
    pub course_interest: Option<String>,
    #[serde(default)]
    pub privacy_consent: bool,
    #[serde(default)]
    pub marketing_consent: bool,
    pub created_at: DateTime<Utc>,
}
