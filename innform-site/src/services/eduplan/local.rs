//! In-process stand-in for EduPlan, used in development and tests.
//!
//! Data lives for the lifetime of the process. The store applies the checks
//! EduPlan applies on its side: known program ids, one active enrollment per
//! person and program, unique student emails and fiscal codes. Uniqueness is
//! enforced through index maps whose entry locks are held while the record
//! is written, so concurrent identical submissions cannot both pass.

use super::{BackendError, EduPlanBackend};
use crate::config::BackendMode;
use crate::models::program::find_program;
use crate::models::{
    Enrollment, EnrollmentStatus, Lead, LeadInput, LoginCredential, NewEnrollment, NewStudent,
    PaymentStatus, Student,
};
use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct LocalBackend {
    leads: DashMap<String, Lead>,
    students: DashMap<String, Student>,
    enrollments: DashMap<String, Enrollment>,
    /// Lower-cased email to student id.
    student_emails: DashMap<String, String>,
    /// Upper-cased fiscal code to student id.
    fiscal_codes: DashMap<String, String>,
    /// `(person, program_id)` to the id of the latest enrollment.
    enrollment_keys: DashMap<(String, String), String>,
}

impl LocalBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn leads(&self) -> Vec<Lead> {
        let mut leads: Vec<Lead> = self.leads.iter().map(|entry| entry.value().clone()).collect();
        leads.sort_by_key(|lead| lead.created_at);
        leads
    }

    pub fn enrollment_count(&self) -> usize {
        self.enrollments.len()
    }

    fn rejected(status: u16, message: impl Into<String>) -> BackendError {
        BackendError::Rejected {
            status,
            message: Some(message.into()),
        }
    }

    /// Who an enrollment belongs to: the applicant email when given, else
    /// the student id.
    fn person_key(request: &NewEnrollment) -> Option<String> {
        request
            .applicant_email
            .as_deref()
            .map(|email| format!("email:{}", email.to_lowercase()))
            .or_else(|| request.student_id.as_ref().map(|id| format!("student:{}", id)))
    }

    fn is_active(&self, enrollment_id: &str) -> bool {
        self.enrollments
            .get(enrollment_id)
            .is_some_and(|existing| existing.status != EnrollmentStatus::Cancelled)
    }

    fn student_by_index(&self, index: &DashMap<String, String>, key: &str) -> Option<Student> {
        let id = index.get(key)?.value().clone();
        self.students.get(&id).map(|entry| entry.value().clone())
    }

    fn new_enrollment(request: &NewEnrollment) -> Enrollment {
        Enrollment {
            id: Uuid::new_v4().to_string(),
            student_id: request.student_id.clone(),
            program_id: request.program_id.clone(),
            kind: request.kind,
            status: EnrollmentStatus::Pending,
            payment_status: PaymentStatus::Unpaid,
            applicant_name: request.applicant_name.clone(),
            applicant_email: request.applicant_email.clone(),
            created_at: Utc::now(),
        }
    }
}

#[async_trait]
impl EduPlanBackend for LocalBackend {
    fn mode(&self) -> BackendMode {
        BackendMode::Local
    }

    async fn create_lead(&self, input: &LeadInput) -> Result<Lead, BackendError> {
        let record = input.record();
        let lead = Lead {
            id: Uuid::new_v4().to_string(),
            name: record.name,
            email: record.email,
            phone: record.phone,
            message: record.message,
            course_interest: record.course_interest,
            privacy_consent: record.privacy_consent,
            marketing_consent: record.marketing_consent,
            created_at: Utc::now(),
        };
        self.leads.insert(lead.id.clone(), lead.clone());
        tracing::debug!(lead_id = %lead.id, "Lead stored locally");
        Ok(lead)
    }

    async fn create_student(&self, input: &NewStudent) -> Result<Student, BackendError> {
        let email = input.email.to_lowercase();
        let fiscal_code = input.fiscal_code.as_ref().map(|code| code.to_uppercase());

        // Email entry first, then fiscal code, always in this order.
        let email_slot = match self.student_emails.entry(email.clone()) {
            Entry::Occupied(_) => {
                return Err(Self::rejected(
                    409,
                    "Esiste già uno studente registrato con questa email.",
                ))
            }
            Entry::Vacant(slot) => slot,
        };
        let code_slot = match &fiscal_code {
            Some(code) => match self.fiscal_codes.entry(code.clone()) {
                Entry::Occupied(_) => {
                    return Err(Self::rejected(
                        409,
                        "Esiste già uno studente registrato con questo codice fiscale.",
                    ))
                }
                Entry::Vacant(slot) => Some(slot),
            },
            None => None,
        };

        let student = Student {
            id: Uuid::new_v4().to_string(),
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            email,
            fiscal_code,
            phone: input.phone.clone(),
        };
        self.students.insert(student.id.clone(), student.clone());
        if let Some(slot) = code_slot {
            slot.insert(student.id.clone());
        }
        email_slot.insert(student.id.clone());
        Ok(student)
    }

    async fn find_student(
        &self,
        credential: &LoginCredential,
    ) -> Result<Option<Student>, BackendError> {
        let found = match credential {
            LoginCredential::Email(email) => {
                self.student_by_index(&self.student_emails, &email.to_lowercase())
            }
            LoginCredential::FiscalCode(code) => {
                self.student_by_index(&self.fiscal_codes, &code.to_uppercase())
            }
        };
        Ok(found)
    }

    async fn create_enrollment(
        &self,
        request: &NewEnrollment,
    ) -> Result<Enrollment, BackendError> {
        if find_program(&request.program_id).is_none() {
            return Err(Self::rejected(
                422,
                format!("Programma non valido: {}", request.program_id),
            ));
        }
        if let Some(student_id) = &request.student_id {
            if !self.students.contains_key(student_id) {
                return Err(Self::rejected(422, "Studente non trovato."));
            }
        }

        let enrollment = Self::new_enrollment(request);
        match Self::person_key(request) {
            Some(person) => match self
                .enrollment_keys
                .entry((person, request.program_id.clone()))
            {
                Entry::Occupied(slot) if self.is_active(slot.get()) => {
                    return Err(Self::rejected(
                        409,
                        "Hai già inviato una richiesta per questo programma.",
                    ));
                }
                Entry::Occupied(mut slot) => {
                    self.enrollments
                        .insert(enrollment.id.clone(), enrollment.clone());
                    slot.insert(enrollment.id.clone());
                }
                Entry::Vacant(slot) => {
                    self.enrollments
                        .insert(enrollment.id.clone(), enrollment.clone());
                    slot.insert(enrollment.id.clone());
                }
            },
            None => {
                self.enrollments
                    .insert(enrollment.id.clone(), enrollment.clone());
            }
        }
        Ok(enrollment)
    }

    async fn list_enrollments(&self, student_id: &str) -> Result<Vec<Enrollment>, BackendError> {
        let mut enrollments: Vec<Enrollment> = self
            .enrollments
            .iter()
            .filter(|entry| entry.value().student_id.as_deref() == Some(student_id))
            .map(|entry| entry.value().clone())
            .collect();
        enrollments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(enrollments)
    }
}
