use secrecy::Secret;
use serde::Deserialize;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub site: SiteSettings,
    pub eduplan: EduPlanSettings,
    #[serde(default)]
    pub student_auth: StudentAuthSettings,
    #[serde(default)]
    pub lms: LmsSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Mark the session cookie `Secure`. Disable only for plain-HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
}

fn default_secure_cookies() -> bool {
    true
}

fn default_session_ttl_hours() -> i64 {
    24
}

fn default_static_dir() -> String {
    "innform-site/static".to_string()
}

/// Public identity of the site, used by templates and SEO metadata.
#[derive(Deserialize, Clone, Debug)]
pub struct SiteSettings {
    pub name: String,
    /// Absolute origin without trailing slash, e.g. `https://www.innform.it`.
    pub base_url: String,
    pub default_title: String,
    pub default_description: String,
    pub default_image: String,
    #[serde(default = "default_locale")]
    pub locale: String,
    pub contact_email: String,
    pub phone: String,
    pub address: String,
    pub map_embed_url: String,
    #[serde(default)]
    pub social_links: Vec<SocialLink>,
}

fn default_locale() -> String {
    "it_IT".to_string()
}

#[derive(Deserialize, Clone, Debug)]
pub struct SocialLink {
    pub label: String,
    pub url: String,
}

/// Which EduPlan integration is active. Read once at startup.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// In-process store, for development and demos.
    Local,
    /// EduPlan REST API.
    Api,
    /// EduPlan tables exposed through Supabase/PostgREST.
    Supabase,
}

impl std::fmt::Display for BackendMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BackendMode::Local => "local",
            BackendMode::Api => "api",
            BackendMode::Supabase => "supabase",
        };
        f.write_str(name)
    }
}

#[derive(Deserialize, Clone)]
pub struct EduPlanSettings {
    pub mode: BackendMode,
    /// Base URL of the EduPlan REST API (mode `api`).
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default)]
    pub api_key: Option<Secret<String>>,
    /// Supabase project URL (mode `supabase`).
    #[serde(default)]
    pub supabase_url: Option<String>,
    #[serde(default)]
    pub supabase_anon_key: Option<Secret<String>>,
}

/// Student-auth API. Without a URL, students are authenticated by looking
/// them up in EduPlan and sessions are kept in-process.
#[derive(Deserialize, Clone, Default)]
pub struct StudentAuthSettings {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Clone, Default)]
pub struct LmsSettings {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    let base_path = std::env::current_dir()
        .map_err(|e| config::ConfigError::Message(format!("current directory: {}", e)))?;

    // Running from the crate directory or from the workspace root
    let configuration_directory = if base_path.ends_with("innform-site") {
        base_path.join("config")
    } else {
        base_path.join("innform-site").join("config")
    };

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_mode_reads_lowercase() {
        let mode: BackendMode = serde_json::from_str("\"supabase\"").unwrap();
        assert_eq!(mode, BackendMode::Supabase);
        assert_eq!(BackendMode::Api.to_string(), "api");
    }

    #[test]
    fn base_yaml_deserializes() {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../../config/base.yaml"),
                config::FileFormat::Yaml,
            ))
            .build()
            .unwrap()
            .try_deserialize::<Settings>()
            .unwrap();

        assert_eq!(settings.site.name, "Innform");
        assert_eq!(settings.eduplan.mode, BackendMode::Local);
        assert!(settings.student_auth.url.is_none());
        assert_eq!(settings.telemetry.log_level, "info");
    }
}
