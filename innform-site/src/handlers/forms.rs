//! Contact, pre-enrollment and enrollment forms.
//!
//! Each POST runs one submission through its [`FormState`](crate::forms::FormState).
//! htmx posts get the form fragment back (success message or inline errors);
//! plain posts get the whole page, with `422` when the submission failed.

use super::{is_htmx, Layout};
use crate::auth::CurrentStudent;
use crate::forms::{
    submit_contact, submit_enrollment, submit_pre_enrollment, ContactForm, EnrollmentForm,
    PreEnrollmentForm,
};
use crate::models::program::{catalog, pre_enrollable};
use crate::models::{EnrollmentInput, LeadInput, PreEnrollmentInput, Program, Student};
use crate::seo::{DocumentMeta, SeoHead};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;

/// `?programId=` preselects a program, as linked from the course pages.
#[derive(Debug, Default, Deserialize)]
pub struct ProgramQuery {
    #[serde(default, rename = "programId", alias = "program_id")]
    pub program_id: Option<String>,
}

#[derive(Template)]
#[template(path = "contact.html")]
pub struct ContactPage<'a> {
    pub layout: Layout<'a>,
    pub form: ContactForm,
    pub programs: &'static [Program],
}

#[derive(Template)]
#[template(path = "partials/contact_form.html")]
pub struct ContactFragment {
    pub form: ContactForm,
    pub programs: &'static [Program],
}

#[derive(Template)]
#[template(path = "pre_enrollment.html")]
pub struct PreEnrollmentPage<'a> {
    pub layout: Layout<'a>,
    pub form: PreEnrollmentForm,
    pub programs: Vec<&'static Program>,
}

#[derive(Template)]
#[template(path = "partials/pre_enrollment_form.html")]
pub struct PreEnrollmentFragment {
    pub form: PreEnrollmentForm,
    pub programs: Vec<&'static Program>,
}

#[derive(Template)]
#[template(path = "enrollment.html")]
pub struct EnrollmentPage<'a> {
    pub layout: Layout<'a>,
    pub form: EnrollmentForm,
    pub programs: &'static [Program],
}

#[derive(Template)]
#[template(path = "partials/enrollment_form.html")]
pub struct EnrollmentFragment {
    pub form: EnrollmentForm,
    pub programs: &'static [Program],
}

fn status_for(success: bool) -> StatusCode {
    if success {
        StatusCode::OK
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn contact_page(state: &AppState, student: Option<&Student>, form: ContactForm) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/contatti")
        .title("Contatti")
        .description("Scrivici per informazioni su corsi, percorsi GOL e master.")
        .mount(&mut meta);

    ContactPage {
        layout: Layout::new(&head, site, student, "contact"),
        form,
        programs: catalog(),
    }
    .into_response()
}

pub async fn contact_page_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Query(query): Query<ProgramQuery>,
) -> Response {
    let mut form = ContactForm::contact();
    if let Some(program_id) = query.program_id {
        form = form.prefill(LeadInput {
            course_interest: program_id,
            ..Default::default()
        });
    }
    contact_page(&state, student.as_ref(), form)
}

pub async fn contact_submit_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    headers: HeaderMap,
    Form(input): Form<LeadInput>,
) -> Response {
    let mut form = ContactForm::contact();
    submit_contact(&mut form, state.backend.as_ref(), input).await;
    let status = status_for(form.is_success());

    if is_htmx(&headers) {
        return ContactFragment {
            form,
            programs: catalog(),
        }
        .into_response();
    }

    (status, contact_page(&state, student.as_ref(), form)).into_response()
}

fn pre_enrollment_page(
    state: &AppState,
    student: Option<&Student>,
    form: PreEnrollmentForm,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/preiscrizione")
        .title("Preiscrizione")
        .description("Preiscriviti ai percorsi GOL finanziati e ai master.")
        .mount(&mut meta);

    PreEnrollmentPage {
        layout: Layout::new(&head, site, student, "pre_enrollment"),
        form,
        programs: pre_enrollable().collect(),
    }
    .into_response()
}

pub async fn pre_enrollment_page_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Query(query): Query<ProgramQuery>,
) -> Response {
    let mut form = PreEnrollmentForm::pre_enrollment();
    if let Some(program_id) = query.program_id {
        form = form.prefill(PreEnrollmentInput::for_program(&program_id));
    }
    pre_enrollment_page(&state, student.as_ref(), form)
}

pub async fn pre_enrollment_submit_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    headers: HeaderMap,
    Form(input): Form<PreEnrollmentInput>,
) -> Response {
    let mut form = PreEnrollmentForm::pre_enrollment();
    submit_pre_enrollment(&mut form, state.backend.as_ref(), input).await;
    let status = status_for(form.is_success());

    if is_htmx(&headers) {
        return PreEnrollmentFragment {
            form,
            programs: pre_enrollable().collect(),
        }
        .into_response();
    }

    (status, pre_enrollment_page(&state, student.as_ref(), form)).into_response()
}

fn enrollment_page(
    state: &AppState,
    student: Option<&Student>,
    form: EnrollmentForm,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/iscrizione")
        .title("Iscrizione")
        .description("Iscriviti ai corsi di formazione professionale.")
        .mount(&mut meta);

    EnrollmentPage {
        layout: Layout::new(&head, site, student, "enrollment"),
        form,
        programs: catalog(),
    }
    .into_response()
}

pub async fn enrollment_page_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Query(query): Query<ProgramQuery>,
) -> Response {
    let mut form = EnrollmentForm::enrollment();
    if let Some(program_id) = query.program_id {
        form = form.prefill(EnrollmentInput::for_program(&program_id));
    }
    enrollment_page(&state, student.as_ref(), form)
}

pub async fn enrollment_submit_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    headers: HeaderMap,
    Form(input): Form<EnrollmentInput>,
) -> Response {
    let mut form = EnrollmentForm::enrollment();
    submit_enrollment(&mut form, state.backend.as_ref(), input).await;
    let status = status_for(form.is_success());

    if is_htmx(&headers) {
        return EnrollmentFragment {
            form,
            programs: catalog(),
        }
        .into_response();
    }

    (status, enrollment_page(&state, student.as_ref(), form)).into_response()
}
