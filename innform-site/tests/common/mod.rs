use innform_site::config::get_configuration;
use innform_site::models::{NewStudent, Student};
use innform_site::services::eduplan::{EduPlanBackend, LocalBackend};
use innform_site::services::student_auth::BackendLookupAuth;
use innform_site::startup::Application;
use innform_site::AppState;
use reqwest::{redirect::Policy, Client};
use std::sync::Arc;

pub struct TestApp {
    pub address: String,
    pub backend: Arc<LocalBackend>,
    /// Keeps the session cookie and does not follow redirects.
    pub client: Client,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let mut settings = get_configuration().expect("Failed to load configuration");
        settings.server.host = "127.0.0.1".to_string();
        settings.server.port = 0; // Random port for testing
        settings.server.secure_cookies = false;
        settings.server.static_dir = "static".to_string();

        let backend = Arc::new(LocalBackend::new());
        let student_auth = Arc::new(BackendLookupAuth::new(backend.clone()));
        let state = AppState::from_parts(settings, backend.clone(), student_auth, None);

        let app = Application::with_state(state)
            .await
            .expect("Failed to build test application");
        let address = format!("http://127.0.0.1:{}", app.port());

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        let client = Client::builder()
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .expect("Failed to build client");

        // Wait for the server by polling the health endpoint
        for _ in 0..50 {
            if client
                .get(format!("{}/health", address))
                .send()
                .await
                .is_ok()
            {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(20)).await;
        }

        TestApp {
            address,
            backend,
            client,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_form(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Same as [`TestApp::post_form`], sent the way htmx sends it.
    pub async fn post_htmx(&self, path: &str, form: &[(&str, &str)]) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("HX-Request", "true")
            .form(form)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn seed_student(&self, email: &str, fiscal_code: &str) -> Student {
        self.backend
            .create_student(&NewStudent {
                first_name: "Giulia".to_string(),
                last_name: "Esposito".to_string(),
                email: email.to_string(),
                fiscal_code: Some(fiscal_code.to_string()),
                phone: None,
            })
            .await
            .expect("Failed to seed student")
    }
}

pub fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get("location")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
