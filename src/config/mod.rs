use serde::Deserialize;
use config::{Config, ConfigError, Environment, File};

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub backend: BackendConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub base_url: String,
    #[serde(default)]
    pub secure_cookies: bool,
}

/// Local SQLite database holding sessions only; club data lives in the backend.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub session_duration_hours: i64,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    Rest,
    Memory,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Project URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub service_key: String,
    pub timeout_secs: u64,
    /// Admin account registered when running against the in-memory backend.
    pub demo_admin_email: String,
    pub demo_admin_password: String,
    pub demo_members: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub recent_payments_limit: usize,
    pub check_in_feed_limit: usize,
    pub expiring_window_days: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            recent_payments_limit: 20,
            check_in_feed_limit: 10,
            expiring_window_days: 30,
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let config = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.base_url", "http://localhost:8080")?
            .set_default("server.secure_cookies", false)?
            .set_default("database.url", "sqlite://gym-admin.db?mode=rwc")?
            .set_default("database.max_connections", 10)?
            .set_default("auth.session_duration_hours", 24)?
            .set_default("backend.kind", "memory")?
            .set_default("backend.timeout_secs", 15)?
            .set_default("backend.demo_admin_email", "admin@elitefitness.com")?
            .set_default("backend.demo_admin_password", "admin123")?
            .set_default("backend.demo_members", 25)?
            .set_default("dashboard.recent_payments_limit", 20)?
            .set_default("dashboard.check_in_feed_limit", 10)?
            .set_default("dashboard.expiring_window_days", 30)?

            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))

            // GYM_ADMIN__BACKEND__URL=... etc.
            .add_source(Environment::with_prefix("GYM_ADMIN").separator("__"))

            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                base_url: "http://localhost:8080".to_string(),
                secure_cookies: false,
            },
            database: DatabaseConfig {
                url: "sqlite://gym-admin.db?mode=rwc".to_string(),
                max_connections: 10,
            },
            auth: AuthConfig {
                session_duration_hours: 24,
            },
            backend: BackendConfig {
                kind: BackendKind::Memory,
                url: String::new(),
                service_key: String::new(),
                timeout_secs: 15,
                demo_admin_email: "admin@elitefitness.com".to_string(),
                demo_admin_password: "admin123".to_string(),
                demo_members: 25,
            },
            dashboard: DashboardConfig::default(),
        }
    }
}
