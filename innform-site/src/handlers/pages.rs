//! Informational pages and the course catalog.

use super::Layout;
use crate::auth::CurrentStudent;
use crate::models::program::{catalog, find_program};
use crate::models::{Program, ProgramCategory};
use crate::seo::{json_ld, DocumentMeta, SeoHead};
use crate::AppState;
use askama::Template;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};

pub struct Faq {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQS: &[Faq] = &[
    Faq {
        question: "Cosa sono i percorsi GOL?",
        answer: "Sono corsi gratuiti finanziati dal programma Garanzia di Occupabilità dei Lavoratori, rivolti a disoccupati e lavoratori in transizione presi in carico dai Centri per l'Impiego.",
    },
    Faq {
        question: "Come funziona la preiscrizione?",
        answer: "Compili il modulo di preiscrizione scegliendo il percorso GOL o il master. La segreteria verifica i requisiti e ti contatta per completare l'iscrizione.",
    },
    Faq {
        question: "Come accedo all'area studenti?",
        answer: "Dalla pagina di accesso inserisci l'email o il codice fiscale usati al momento dell'iscrizione.",
    },
    Faq {
        question: "Rilasciate un attestato?",
        answer: "Sì. Al termine di ogni corso, superata la verifica finale, ricevi un attestato valido ai sensi della normativa vigente.",
    },
    Faq {
        question: "Posso pagare a rate?",
        answer: "Per master e corsi a pagamento è possibile concordare una rateizzazione con la segreteria.",
    },
];

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate<'a> {
    pub layout: Layout<'a>,
    pub featured: Vec<&'static Program>,
}

#[derive(Template)]
#[template(path = "courses.html")]
pub struct CoursesTemplate<'a> {
    pub layout: Layout<'a>,
    pub gol: Vec<&'static Program>,
    pub masters: Vec<&'static Program>,
    pub courses: Vec<&'static Program>,
}

#[derive(Template)]
#[template(path = "course_detail.html")]
pub struct CourseDetailTemplate<'a> {
    pub layout: Layout<'a>,
    pub program: &'static Program,
}

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate<'a> {
    pub layout: Layout<'a>,
}

#[derive(Template)]
#[template(path = "faq.html")]
pub struct FaqTemplate<'a> {
    pub layout: Layout<'a>,
    pub faqs: &'static [Faq],
}

#[derive(Template)]
#[template(path = "privacy.html")]
pub struct PrivacyTemplate<'a> {
    pub layout: Layout<'a>,
}

#[derive(Template)]
#[template(path = "cookie.html")]
pub struct CookieTemplate<'a> {
    pub layout: Layout<'a>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate<'a> {
    pub layout: Layout<'a>,
}

#[derive(Template)]
#[template(path = "loading.html")]
pub struct LoadingTemplate<'a> {
    pub layout: Layout<'a>,
}

fn in_category(category: ProgramCategory) -> Vec<&'static Program> {
    catalog()
        .iter()
        .filter(|program| program.category == category)
        .collect()
}

pub async fn index(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/")
        .json_ld(json_ld::organization(site))
        .mount(&mut meta);

    let featured = catalog()
        .iter()
        .filter(|program| program.funded)
        .chain(in_category(ProgramCategory::Master).into_iter().take(1))
        .collect();

    IndexTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "home"),
        featured,
    }
    .into_response()
}

pub async fn courses(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/corsi")
        .title("Corsi")
        .description("Percorsi GOL finanziati, master e corsi di aggiornamento professionale.")
        .mount(&mut meta);

    CoursesTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "courses"),
        gol: in_category(ProgramCategory::Gol),
        masters: in_category(ProgramCategory::Master),
        courses: in_category(ProgramCategory::Course),
    }
    .into_response()
}

pub async fn course_detail(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    Path(id): Path<String>,
) -> Response {
    let Some(program) = find_program(&id) else {
        tracing::debug!(program_id = %id, "Unknown program requested");
        return not_found_page(&state, student.as_ref());
    };

    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new(program.path())
        .title(program.title)
        .description(program.summary)
        .json_ld(json_ld::course(program, site))
        .mount(&mut meta);

    CourseDetailTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "courses"),
        program,
    }
    .into_response()
}

pub async fn about(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let description = "Chi siamo: ente di formazione accreditato per corsi professionali, percorsi GOL e master.";
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/chi-siamo")
        .title("Chi siamo")
        .description(description)
        .og_type("article")
        .json_ld(json_ld::article("Chi siamo", description, "/chi-siamo", site))
        .mount(&mut meta);

    AboutTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "about"),
    }
    .into_response()
}

pub async fn faq(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let entries: Vec<(&str, &str)> = FAQS.iter().map(|f| (f.question, f.answer)).collect();
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/faq")
        .title("FAQ")
        .description("Domande frequenti su corsi, preiscrizioni e area studenti.")
        .json_ld(json_ld::faq_page(&entries))
        .mount(&mut meta);

    FaqTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "faq"),
        faqs: FAQS,
    }
    .into_response()
}

pub async fn privacy(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/privacy-policy")
        .title("Privacy policy")
        .mount(&mut meta);

    PrivacyTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "privacy"),
    }
    .into_response()
}

pub async fn cookie(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/cookie-policy")
        .title("Cookie policy")
        .mount(&mut meta);

    CookieTemplate {
        layout: Layout::new(&head, site, student.as_ref(), "cookie"),
    }
    .into_response()
}

pub async fn not_found(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
) -> Response {
    not_found_page(&state, student.as_ref())
}

fn not_found_page(state: &AppState, student: Option<&crate::models::Student>) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/404")
        .title("Pagina non trovata")
        .noindex()
        .mount(&mut meta);

    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            layout: Layout::new(&head, site, student, ""),
        },
    )
        .into_response()
}

/// Placeholder shown while the student session is still being resolved.
pub fn render_loading(state: &AppState) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/area-studenti")
        .title("Caricamento")
        .noindex()
        .mount(&mut meta);

    LoadingTemplate {
        layout: Layout::new(&head, site, None, "student"),
    }
    .into_response()
}
