use super::{is_htmx, redirect, Layout};
use crate::auth::guard::safe_redirect_target;
use crate::auth::{AuthContext, CurrentStudent};
use crate::models::{LoginCredential, Student};
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
use tower_sessions::Session;

/// Values of the login form, echoed back when the attempt fails.
#[derive(Debug, Clone)]
pub struct LoginView {
    pub method: String,
    pub identifier: String,
    pub redirect: String,
    pub error: Option<String>,
}

impl LoginView {
    fn new(redirect: Option<&str>) -> Self {
        Self {
            method: "email".to_string(),
            identifier: String::new(),
            redirect: safe_redirect_target(redirect).to_string(),
            error: None,
        }
    }

    pub fn uses_fiscal_code(&self) -> bool {
        self.method == "fiscal_code"
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage<'a> {
    pub layout: Layout<'a>,
    pub login: LoginView,
}

#[derive(Template)]
#[template(path = "partials/login_form.html")]
pub struct LoginFragment {
    pub login: LoginView,
}

#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub redirect: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub identifier: String,
    #[serde(default)]
    pub redirect: Option<String>,
}

fn default_method() -> String {
    "email".to_string()
}

fn login_page(state: &AppState, student: Option<&Student>, login: LoginView) -> Response {
    let site = &state.settings.site;
    let mut meta = DocumentMeta::new(site);
    let head = SeoHead::new("/login")
        .title("Area studenti: accesso")
        .noindex()
        .mount(&mut meta);

    LoginPage {
        layout: Layout::new(&head, site, student, "login"),
        login,
    }
    .into_response()
}

pub async fn login_page_handler(
    State(state): State<AppState>,
    CurrentStudent(student): CurrentStudent,
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
) -> Response {
    let login = LoginView::new(query.redirect.as_deref());

    if student.is_some() {
        return redirect(&headers, &login.redirect);
    }

    login_page(&state, None, login)
}

pub async fn login_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(payload): Form<LoginRequest>,
) -> Response {
    let mut login = LoginView::new(payload.redirect.as_deref());
    login.method = payload.method.clone();
    login.identifier = payload.identifier.trim().to_string();

    let mut context = AuthContext::restore(session, state.student_auth.as_ref()).await;

    let authenticated = match LoginCredential::parse(&payload.method, &payload.identifier) {
        Ok(credential) => context.login(state.student_auth.as_ref(), &credential).await,
        Err(e) => {
            context.fail(e.to_string());
            false
        }
    };

    if authenticated {
        return redirect(&headers, &login.redirect);
    }

    login.error = context.state().error().map(str::to_string);

    if is_htmx(&headers) {
        return LoginFragment { login }.into_response();
    }

    (
        StatusCode::UNPROCESSABLE_ENTITY,
        login_page(&state, None, login),
    )
        .into_response()
}

pub async fn logout_handler(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
) -> Response {
    let mut context = AuthContext::restore(session, state.student_auth.as_ref()).await;
    context.logout(state.student_auth.clone()).await;

    redirect(&headers, "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_view_sanitises_redirect() {
        assert_eq!(LoginView::new(Some("//evil.example")).redirect, "/area-studenti");
        assert_eq!(LoginView::new(Some("/area-studenti?tab=corsi")).redirect, "/area-studenti?tab=corsi");
        assert!(!LoginView::new(None).uses_fiscal_code());
    }
}
