use super::student::is_fiscal_code;
use super::{checkbox, consent_given, not_blank, optional};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl EnrollmentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EnrollmentStatus::Pending => "In attesa di verifica",
            EnrollmentStatus::Confirmed => "Confermata",
            EnrollmentStatus::Cancelled => "Annullata",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Unpaid,
    Paid,
    Refunded,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Unpaid => "Da pagare",
            PaymentStatus::Paid => "Pagato",
            PaymentStatus::Refunded => "Rimborsato",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentKind {
    PreEnrollment,
    Enrollment,
}

/// Enrollment as owned by EduPlan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    #[serde(default)]
    pub student_id: Option<String>,
    pub program_id: String,
    pub kind: EnrollmentKind,
    pub status: EnrollmentStatus,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub applicant_name: Option<String>,
    #[serde(default)]
    pub applicant_email: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Enrollment {
    /// Catalog title of the program, or its id when the catalog does not
    /// list it.
    pub fn program_title(&self) -> &str {
        super::program::find_program(&self.program_id)
            .map(|program| program.title)
            .unwrap_or(self.program_id.as_str())
    }
}

/// Wire shape of an enrollment request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEnrollment {
    pub program_id: String,
    pub kind: EnrollmentKind,
    pub student_id: Option<String>,
    pub applicant_name: Option<String>,
    pub applicant_email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
}

/// Lightweight request for GOL/Master programs, verified later by staff.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct PreEnrollmentInput {
    #[validate(custom(function = "not_blank"))]
    #[serde(default, rename = "programId", alias = "program_id")]
    pub program_id: String,

    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub name: String,

    #[validate(email(message = "Indirizzo email non valido"))]
    #[serde(default)]
    pub email: String,

    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub notes: String,

    #[validate(custom(function = "consent_given"))]
    #[serde(default, deserialize_with = "checkbox")]
    pub privacy_consent: bool,
}

impl PreEnrollmentInput {
    pub fn for_program(program_id: &str) -> Self {
        Self {
            program_id: program_id.to_string(),
            ..Default::default()
        }
    }

    pub fn is_program(&self, id: &str) -> bool {
        self.program_id == id
    }

    pub fn request(&self) -> NewEnrollment {
        NewEnrollment {
            program_id: self.program_id.trim().to_string(),
            kind: EnrollmentKind::PreEnrollment,
            student_id: None,
            applicant_name: optional(&self.name),
            applicant_email: Some(self.email.trim().to_lowercase()),
            phone: optional(&self.phone),
            notes: optional(&self.notes),
        }
    }
}

/// Full enrollment: identifies the student, then books the program.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Validate)]
pub struct EnrollmentInput {
    #[validate(custom(function = "not_blank"))]
    #[serde(default, rename = "programId", alias = "program_id")]
    pub program_id: String,

    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub first_name: String,

    #[validate(custom(function = "not_blank"))]
    #[serde(default)]
    pub last_name: String,

    #[validate(email(message = "Indirizzo email non valido"))]
    #[serde(default)]
    pub email: String,

    #[validate(custom(function = "valid_fiscal_code"))]
    #[serde(default)]
    pub fiscal_code: String,

    #[serde(default)]
    pub phone: String,

    #[validate(custom(function = "consent_given"))]
    #[serde(default, deserialize_with = "checkbox")]
    pub privacy_consent: bool,
}

fn valid_fiscal_code(value: &str) -> Result<(), ValidationError> {
    if is_fiscal_code(&value.trim().to_uppercase()) {
        return Ok(());
    }
    let mut err = ValidationError::new("fiscal_code");
    err.message = Some(Cow::Borrowed("Codice fiscale non valido"));
    Err(err)
}

impl EnrollmentInput {
    pub fn for_program(program_id: &str) -> Self {
        Self {
            program_id: program_id.to_string(),
            ..Default::default()
        }
    }

    pub fn is_program(&self, id: &str) -> bool {
        self.program_id == id
    }

    pub fn student(&self) -> super::NewStudent {
        super::NewStudent {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            email: self.email.trim().to_lowercase(),
            fiscal_code: Some(self.fiscal_code.trim().to_uppercase()),
            phone: optional(&self.phone),
        }
    }

    pub fn request(&self, student_id: &str) -> NewEnrollment {
        NewEnrollment {
            program_id: self.program_id.trim().to_string(),
            kind: EnrollmentKind::Enrollment,
            student_id: Some(student_id.to_string()),
            applicant_name: Some(format!(
                "{} {}",
                self.first_name.trim(),
                self.last_name.trim()
            )),
            applicant_email: Some(self.email.trim().to_lowercase()),
            phone: optional(&self.phone),
            notes: None,
        }
    }
}
