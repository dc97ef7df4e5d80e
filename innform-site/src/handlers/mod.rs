pub mod app;
pub mod auth;
pub mod forms;
pub mod pages;
pub mod student;

use crate::config::SiteSettings;
use crate::models::Student;
use crate::seo::DocumentMeta;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

/// Data every full page needs for the shared layout.
pub struct Layout<'a> {
    pub meta: &'a DocumentMeta,
    pub site: &'a SiteSettings,
    pub student: Option<&'a Student>,
    /// Navigation entry to highlight.
    pub current: &'static str,
}

impl<'a> Layout<'a> {
    pub fn new(
        meta: &'a DocumentMeta,
        site: &'a SiteSettings,
        student: Option<&'a Student>,
        current: &'static str,
    ) -> Self {
        Self {
            meta,
            site,
            student,
            current,
        }
    }
}

/// Request issued by htmx, which expects a fragment instead of a full page.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .and_then(|value| value.to_str().ok())
        .map(|value| value == "true")
        .unwrap_or(false)
}

/// Navigate after a form post: `HX-Redirect` for htmx, `303 See Other`
/// otherwise. Targets that are not valid header values fall back to `/`.
pub fn redirect(headers: &HeaderMap, to: &str) -> Response {
    let location = match HeaderValue::from_str(to) {
        Ok(location) => location,
        Err(_) => {
            tracing::warn!("Redirect target is not a valid header value");
            HeaderValue::from_static("/")
        }
    };

    let mut response_headers = HeaderMap::new();
    if is_htmx(headers) {
        response_headers.insert("HX-Redirect", location);
        (StatusCode::OK, response_headers).into_response()
    } else {
        response_headers.insert(header::LOCATION, location);
        (StatusCode::SEE_OTHER, response_headers).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn htmx_redirect_uses_header() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));

        let response = redirect(&headers, "/area-studenti");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/area-studenti");
    }

    #[test]
    fn plain_post_gets_see_other() {
        let response = redirect(&HeaderMap::new(), "/");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");
    }

    #[test]
    fn control_characters_fall_back_to_home() {
        let response = redirect(&HeaderMap::new(), "/a\nb");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()["location"], "/");

        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));
        let response = redirect(&headers, "/corsi\r\nX-Injected: 1");
        assert_eq!(response.headers()["HX-Redirect"], "/");
    }
}
