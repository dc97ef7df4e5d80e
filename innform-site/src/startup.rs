use crate::auth::require_student;
use crate::config::Settings;
use crate::handlers::{
    app::{health_check, metrics},
    auth::{login_handler, login_page_handler, logout_handler},
    forms::{
        contact_page_handler, contact_submit_handler, enrollment_page_handler,
        enrollment_submit_handler, pre_enrollment_page_handler, pre_enrollment_submit_handler,
    },
    pages::{about, cookie, course_detail, courses, faq, index, not_found, privacy},
    student::dashboard_handler,
};
use crate::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    metrics::metrics_middleware, security_headers::security_headers_middleware,
    tracing::request_id_middleware,
};
use std::future::IntoFuture;
use time::Duration;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub fn build_router(state: AppState) -> Router {
    let server = &state.settings.server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            server.session_ttl_hours,
        )));

    Router::new()
        .route("/", get(index))
        .route("/corsi", get(courses))
        .route("/corsi/:id", get(course_detail))
        .route("/chi-siamo", get(about))
        .route("/faq", get(faq))
        .route("/privacy-policy", get(privacy))
        .route("/cookie-policy", get(cookie))
        .route(
            "/contatti",
            get(contact_page_handler).post(contact_submit_handler),
        )
        .route(
            "/preiscrizione",
            get(pre_enrollment_page_handler).post(pre_enrollment_submit_handler),
        )
        .route(
            "/iscrizione",
            get(enrollment_page_handler).post(enrollment_submit_handler),
        )
        .route("/login", get(login_page_handler).post(login_handler))
        .route("/logout", post(logout_handler))
        .route(
            "/area-studenti",
            get(dashboard_handler).route_layer(from_fn_with_state(state.clone(), require_student)),
        )
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .nest_service("/static", ServeDir::new(&server.static_dir))
        .fallback(not_found)
        .layer(session_layer)
        .layer(from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let state = AppState::new(settings)?;
        Self::with_state(state).await
    }

    /// Serve `state` on the configured address. Port `0` picks a free port.
    pub async fn with_state(state: AppState) -> Result<Self, AppError> {
        let address = format!(
            "{}:{}",
            state.settings.server.host, state.settings.server.port
        );
        let app = build_router(state);

        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Starting innform-site on port {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
