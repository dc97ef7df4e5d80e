mod common;

use common::TestApp;
use innform_site::models::{EnrollmentKind, EnrollmentStatus, LoginCredential};
use innform_site::services::eduplan::EduPlanBackend;

#[tokio::test]
async fn contact_request_creates_lead() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/contatti",
            &[
                ("name", "Maria Rossi"),
                ("email", "Maria@Example.com"),
                ("message", "Vorrei informazioni sul corso HACCP"),
                ("course_interest", "corso-haccp-001"),
                ("privacy_consent", "on"),
            ],
        )
        .await;
    assert_eq!(response.status(), 200);
    assert!(response.text().await.unwrap().contains("abbiamo ricevuto la tua richiesta"));

    let leads = app.backend.leads();
    assert_eq!(leads.len(), 1);
    assert_eq!(leads[0].email, "maria@example.com");
    assert_eq!(leads[0].course_interest.as_deref(), Some("corso-haccp-001"));
}

#[tokio::test]
async fn contact_request_without_consent_is_not_sent() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/contatti",
            &[
                ("name", "Maria Rossi"),
                ("email", "maria@example.com"),
                ("message", "Vorrei informazioni"),
            ],
        )
        .await;
    assert_eq!(response.status(), 422);

    let body = response.text().await.unwrap();
    assert!(body.contains("field-error"));
    assert!(body.contains("value=\"Maria Rossi\""));
    assert!(app.backend.leads().is_empty());
}

#[tokio::test]
async fn htmx_pre_enrollment_returns_fragment() {
    let app = TestApp::spawn().await;

    let response = app
        .post_htmx(
            "/preiscrizione",
            &[
                ("programId", "gol-turismo-001"),
                ("name", "Maria Rossi"),
                ("email", "maria@example.com"),
                ("privacy_consent", "on"),
            ],
        )
        .await;
    assert_eq!(response.status(), 200);

    let body = response.text().await.unwrap();
    assert!(!body.contains("<html"));
    assert!(body.contains("data-program-id=\"gol-turismo-001\""));
    assert!(body.contains("In attesa di verifica"));
    assert_eq!(app.backend.enrollment_count(), 1);
}

#[tokio::test]
async fn duplicate_pre_enrollment_shows_backend_message() {
    let app = TestApp::spawn().await;
    let form = [
        ("programId", "master-hr-001"),
        ("name", "Maria Rossi"),
        ("email", "maria@example.com"),
        ("privacy_consent", "on"),
    ];

    app.post_htmx("/preiscrizione", &form).await;
    let body = app.post_htmx("/preiscrizione", &form).await.text().await.unwrap();

    assert!(body.contains("Hai già inviato una richiesta per questo programma."));
    assert_eq!(app.backend.enrollment_count(), 1);
}

#[tokio::test]
async fn pre_enrollment_page_preselects_program() {
    let app = TestApp::spawn().await;

    let body = app
        .get("/preiscrizione?programId=master-hr-001")
        .await
        .text()
        .await
        .unwrap();
    assert!(body.contains("value=\"master-hr-001\" selected"));
}

#[tokio::test]
async fn enrollment_registers_student() {
    let app = TestApp::spawn().await;

    let response = app
        .post_form(
            "/iscrizione",
            &[
                ("programId", "corso-sicurezza-002"),
                ("first_name", "Luca"),
                ("last_name", "Bianchi"),
                ("email", "luca@example.com"),
                ("fiscal_code", "bnclcu85m01f205z"),
                ("privacy_consent", "on"),
            ],
        )
        .await;
    assert_eq!(response.status(), 200);

    let student = app
        .backend
        .find_student(&LoginCredential::FiscalCode("BNCLCU85M01F205Z".to_string()))
        .await
        .unwrap()
        .expect("student registered");
    let enrollments = app.backend.list_enrollments(&student.id).await.unwrap();
    assert_eq!(enrollments.len(), 1);
    assert_eq!(enrollments[0].kind, EnrollmentKind::Enrollment);
    assert_eq!(enrollments[0].status, EnrollmentStatus::Pending);
}

#[tokio::test]
async fn enrollment_with_bad_fiscal_code_is_rejected_inline() {
    let app = TestApp::spawn().await;

    let response = app
        .post_htmx(
            "/iscrizione",
            &[
                ("programId", "corso-sicurezza-002"),
                ("first_name", "Luca"),
                ("last_name", "Bianchi"),
                ("email", "luca@example.com"),
                ("fiscal_code", "123"),
                ("privacy_consent", "on"),
            ],
        )
        .await;

    let body = response.text().await.unwrap();
    assert!(body.contains("Codice fiscale non valido"));
    assert_eq!(app.backend.enrollment_count(), 0);
}
