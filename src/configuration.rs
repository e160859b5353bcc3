use std::collections::HashSet;

use config::Config;
use config::ConfigError;
use config::Environment;
use config::File;
use secrecy::ExposeSecret;
use secrecy::Secret;
use serde::Deserialize;
use serde_aux::field_attributes::deserialize_number_from_string;
use sqlx::mysql::MySqlConnectOptions;
use sqlx::mysql::MySqlSslMode;

/// Top-level server configuration, loaded once at startup. Every recognized
/// key is documented in SPEC_FULL.md §6 "Configuration surface".
#[derive(Clone, Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub database: DatabaseSettings,
    pub email: EmailSettings,
    pub ai: AiSettings,
    pub runtime: RuntimeSettings,
    pub aggregation: AggregationSettings,
    pub notification: NotificationSettings,
    pub feedback: FeedbackSettings,
    pub concurrency: ConcurrencySettings,
    pub reports: ReportSettings,
}

#[derive(Clone, Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

#[derive(Clone, Deserialize)]
pub struct DatabaseSettings {
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    pub host: String,
    pub database_name: String,
}

impl DatabaseSettings {
    /// Connection options without a selected database — used once, by the test
    /// harness, to create a randomised per-test database before migrating it.
    pub fn connect_options_without_db(&self) -> MySqlConnectOptions {
        MySqlConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .password(self.password.expose_secret())
            .ssl_mode(MySqlSslMode::Preferred)
    }

    pub fn connect_options(&self) -> MySqlConnectOptions {
        self.connect_options_without_db().database(&self.database_name)
    }
}

#[derive(Clone, Deserialize)]
pub struct EmailSettings {
    pub imap_server: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub imap_port: u16,
    pub email_address: String,
    pub app_password: Secret<String>,
    pub mailbox: String,
    /// Only mail from a sender whose address contains this substring is
    /// considered (§4.2 step 3, "rules.sender").
    pub sender_filter: String,
}

#[derive(Clone, Deserialize)]
pub struct AiSettings {
    pub api_url: String,
    pub api_key: Secret<String>,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_seconds: u64,
    pub max_retries: u32,
}

#[derive(Clone, Deserialize)]
pub struct RuntimeSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub check_interval_seconds: u64,
    pub log_level: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub rule_compile_interval_minutes: u64,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub retention_days: i64,
}

#[derive(Clone, Deserialize)]
pub struct AggregationSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub window_hours: i64,
    pub tracking_params: Vec<String>,
    pub vendor_domain: String,
}

impl AggregationSettings {
    pub fn tracking_param_set(&self) -> HashSet<String> {
        self.tracking_params.iter().cloned().collect()
    }
}

#[derive(Clone, Deserialize)]
pub struct NotificationSettings {
    pub webhooks: Vec<String>,
    pub suppress_keywords: Vec<String>,
}

#[derive(Clone, Deserialize)]
pub struct FeedbackSettings {
    pub link_base_url: String,
    pub link_secret: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub link_ttl_hours: i64,
    pub admin_token: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub compile_min_support: u32,
}

#[derive(Clone, Deserialize)]
pub struct ConcurrencySettings {
    pub p_mail: usize,
    pub p_url: usize,
    pub p_llm: usize,
}

#[derive(Clone, Deserialize)]
pub struct ReportSettings {
    pub output_dir: String,
}

pub enum AppEnvironment {
    Local,
    Production,
}

impl AppEnvironment {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppEnvironment::Local => "local",
            AppEnvironment::Production => "production",
        }
    }
}

impl TryFrom<String> for AppEnvironment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "production" => Ok(Self::Production),
            other => Err(format!(
                "{other} is not a supported environment. Use either `local` or `production`."
            )),
        }
    }
}

/// Layers `configuration/base.yaml`, then `configuration/{environment}.yaml`,
/// then `APP__`-prefixed environment variables (double underscore as the
/// nested-key separator, e.g. `APP__DATABASE__PASSWORD`). All fields must
/// resolve or startup fails with a distinct exit code (§7, configuration
/// errors are fatal at startup, never partial).
pub fn get_configuration() -> Result<Settings, ConfigError> {
    let base_path = std::env::current_dir().expect("failed to determine current directory");
    let configuration_directory = base_path.join("configuration");

    let environment: AppEnvironment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .expect("failed to parse APP_ENVIRONMENT");
    let environment_filename = format!("{}.yaml", environment.as_str());

    let settings = Config::builder()
        .add_source(File::from(configuration_directory.join("base.yaml")))
        .add_source(File::from(configuration_directory.join(environment_filename)))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize()
}
