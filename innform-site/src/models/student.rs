use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidateEmail;

/// Read-only copy of an EduPlan student, cached in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub fiscal_code: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn initials(&self) -> String {
        let initials: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .collect();

        if initials.is_empty() {
            "S".to_string()
        } else {
            initials
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewStudent {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub fiscal_code: Option<String>,
    pub phone: Option<String>,
}

/// How a student identifies at login. Exactly one identifier is carried.
///
/// Serializes as `{"email": ...}` or `{"fiscal_code": ...}`, the body the
/// student-auth API expects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginCredential {
    Email(String),
    FiscalCode(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("Inserisci email o codice fiscale")]
    Empty,
    #[error("Indirizzo email non valido")]
    InvalidEmail,
    #[error("Codice fiscale non valido")]
    InvalidFiscalCode,
    #[error("Metodo di accesso non supportato")]
    UnknownMethod,
}

impl LoginCredential {
    /// Build a credential from the login form's method selector and value.
    pub fn parse(method: &str, identifier: &str) -> Result<Self, CredentialError> {
        let identifier = identifier.trim();
        if identifier.is_empty() {
            return Err(CredentialError::Empty);
        }

        match method {
            "email" => {
                let email = identifier.to_lowercase();
                if email.validate_email() {
                    Ok(LoginCredential::Email(email))
                } else {
                    Err(CredentialError::InvalidEmail)
                }
            }
            "fiscal_code" => {
                let code = identifier.to_uppercase();
                if is_fiscal_code(&code) {
                    Ok(LoginCredential::FiscalCode(code))
                } else {
                    Err(CredentialError::InvalidFiscalCode)
                }
            }
            _ => Err(CredentialError::UnknownMethod),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            LoginCredential::Email(email) => email,
            LoginCredential::FiscalCode(code) => code,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LoginCredential::Email(_) => "email",
            LoginCredential::FiscalCode(_) => "fiscal_code",
        }
    }
}

/// Italian fiscal code: 16 alphanumerics, the first six letters.
pub fn is_fiscal_code(code: &str) -> bool {
    code.len() == 16
        && code.chars().all(|c| c.is_ascii_alphanumeric())
        && code.chars().take(6).all(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_email_credential() {
        let credential = LoginCredential::parse("email", " X@Example.com ").unwrap();
        assert_eq!(credential, LoginCredential::Email("x@example.com".to_string()));
        assert_eq!(
            serde_json::to_value(&credential).unwrap(),
            serde_json::json!({"email": "x@example.com"})
        );
    }

    #[test]
    fn parses_fiscal_code_uppercased() {
        let credential = LoginCredential::parse("fiscal_code", "rssmra80a41h501u").unwrap();
        assert_eq!(
            credential,
            LoginCredential::FiscalCode("RSSMRA80A41H501U".to_string())
        );
        assert_eq!(credential.kind(), "fiscal_code");
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert_eq!(
            LoginCredential::parse("email", "not-an-email"),
            Err(CredentialError::InvalidEmail)
        );
        assert_eq!(
            LoginCredential::parse("fiscal_code", "RSSMRA80"),
            Err(CredentialError::InvalidFiscalCode)
        );
        assert_eq!(
            LoginCredential::parse("email", "  "),
            Err(CredentialError::Empty)
        );
        assert_eq!(
            LoginCredential::parse("password", "x@example.com"),
            Err(CredentialError::UnknownMethod)
        );
    }

    #[test]
    fn initials_from_names() {
        let student = Student {
            id: "s1".to_string(),
            first_name: "maria".to_string(),
            last_name: "Rossi".to_string(),
            email: "maria@example.com".to_string(),
            fiscal_code: None,
            phone: None,
        };
        assert_eq!(student.initials(), "MR");
        assert_eq!(student.full_name(), "maria Rossi");
    }
}
