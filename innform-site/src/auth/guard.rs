use super::context::AuthState;
use super::session::AuthContext;
use crate::handlers::pages::render_loading;
use crate::models::Student;
use crate::AppState;
use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/area-studenti";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth still resolving: show a placeholder, do not navigate.
    Pending,
    Redirect(String),
    Render,
}

/// Decide what a protected page shows for `requested` (path and query).
pub fn decide(state: &AuthState, requested: &str) -> GuardDecision {
    if state.is_loading() {
        GuardDecision::Pending
    } else if state.is_authenticated() {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(login_redirect(requested))
    }
}

/// Login URL that brings the student back to `requested` afterwards.
pub fn login_redirect(requested: &str) -> String {
    format!("{}?redirect={}", LOGIN_PATH, urlencoding::encode(requested))
}

/// Post-login destination. Only same-site absolute paths that fit in a
/// `Location` header are honoured.
pub fn safe_redirect_target(target: Option<&str>) -> &str {
    match target {
        Some(path) if is_local_path(path) => path,
        _ => DASHBOARD_PATH,
    }
}

fn is_local_path(path: &str) -> bool {
    path.starts_with('/')
        && !path.starts_with("//")
        && !path.contains('\\')
        && !path.chars().any(char::is_control)
        && HeaderValue::from_str(path).is_ok()
}

/// Student and token of a verified session, available to guarded handlers.
#[derive(Debug, Clone)]
pub struct StudentSession {
    pub student: Student,
    pub token: String,
}

/// Route layer for student-only pages.
pub async fn require_student(
    State(state): State<AppState>,
    session: Session,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let context = AuthContext::restore(session, state.student_auth.as_ref()).await;

    let requested = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match decide(context.state(), &requested) {
        GuardDecision::Pending => render_loading(&state),
        GuardDecision::Redirect(to) => {
            tracing::debug!(requested = %requested, "Redirecting anonymous visitor to login");
            Redirect::to(&to).into_response()
        }
        GuardDecision::Render => {
            if let (Some(student), Some(token)) =
                (context.state().current_student(), context.token())
            {
                request.extensions_mut().insert(StudentSession {
                    student: student.clone(),
                    token: token.to_string(),
                });
            }
            next.run(request).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::student_auth::BackendLookupAuth;
    use crate::services::eduplan::LocalBackend;
    use std::sync::Arc;

    #[test]
    fn initializing_does_not_navigate() {
        let state = AuthState::new();
        assert_eq!(decide(&state, "/area-studenti"), GuardDecision::Pending);
    }

    #[tokio::test]
    async fn anonymous_redirects_once_with_return_path() {
        let api = BackendLookupAuth::new(Arc::new(LocalBackend::new()));
        let mut state = AuthState::new();
        state.restore(&api, None).await;

        assert_eq!(
            decide(&state, "/area-studenti?tab=corsi"),
            GuardDecision::Redirect("/login?redirect=%2Farea-studenti%3Ftab%3Dcorsi".to_string())
        );
    }

    #[test]
    fn only_local_paths_are_redirect_targets() {
        assert_eq!(safe_redirect_target(Some("/area-studenti?tab=corsi")), "/area-studenti?tab=corsi");
        assert_eq!(safe_redirect_target(Some("//evil.example")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(Some("https://evil.example")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(Some("/\\evil.example")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(None), DASHBOARD_PATH);
    }

    #[test]
    fn control_characters_are_not_redirect_targets() {
        assert_eq!(safe_redirect_target(Some("/a\nb")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(Some("/corsi\r\nX-Injected: 1")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(Some("/a\u{7f}")), DASHBOARD_PATH);
        assert_eq!(safe_redirect_target(Some("/corsi/é")), "/corsi/é");
    }
}
