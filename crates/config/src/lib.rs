use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_ENV: &str = "COURSEHUB_CONFIG";

const ENV_PREFIX: &str = "COURSEHUB";

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "coursehub.toml",
    "config/coursehub.toml",
    "crates/config/coursehub.toml",
    "../coursehub.toml",
    "../config/coursehub.toml",
    "../crates/config/coursehub.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 7070,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://coursehub.db".to_string(),
            max_connections: 10,
        }
    }
}

/// Bearer token settings.
///
/// ```
/// use coursehub_config::AuthConfig;
///
/// let auth = AuthConfig::default();
/// assert_eq!(auth.token_ttl_seconds, 7 * 24 * 60 * 60);
/// assert!(auth.uses_default_secret());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "AuthConfig::default_secret")]
    pub jwt_secret: String,
    #[serde(default = "AuthConfig::default_token_ttl")]
    pub token_ttl_seconds: u64,
    #[serde(default = "AuthConfig::default_issuer")]
    pub issuer: String,
}

impl AuthConfig {
    pub const DEFAULT_SECRET: &'static str = "coursehub-development-secret-change-me";

    fn default_secret() -> String {
        Self::DEFAULT_SECRET.to_string()
    }

    const fn default_token_ttl() -> u64 {
        604_800
    }

    fn default_issuer() -> String {
        "coursehub".to_string()
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == Self::DEFAULT_SECRET
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Self::default_secret(),
            token_ttl_seconds: Self::default_token_ttl(),
            issuer: Self::default_issuer(),
        }
    }
}

/// The administrator account created on first start. It can never be
/// demoted or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapConfig {
    #[serde(default = "BootstrapConfig::default_email")]
    pub admin_email: String,
    #[serde(default)]
    pub admin_password: Option<String>,
    #[serde(default = "BootstrapConfig::default_name")]
    pub admin_name: String,
}

impl BootstrapConfig {
    fn default_email() -> String {
        "learnhub@gmail.com".to_string()
    }

    fn default_name() -> String {
        "Admin User".to_string()
    }
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: Self::default_email(),
            admin_password: None,
            admin_name: Self::default_name(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentProvider {
    #[default]
    Simulated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub provider: PaymentProvider,
    #[serde(default = "PaymentsConfig::default_delay")]
    pub simulated_delay_ms: u64,
    /// Shared secret used to verify payment confirmation webhooks. The
    /// webhook endpoint is disabled while this is unset.
    #[serde(default)]
    pub webhook_secret: Option<String>,
}

impl PaymentsConfig {
    const fn default_delay() -> u64 {
        2_000
    }
}

impl Default for PaymentsConfig {
    fn default() -> Self {
        Self {
            provider: PaymentProvider::default(),
            simulated_delay_ms: Self::default_delay(),
            webhook_secret: None,
        }
    }
}

fn clamp_to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Load the application configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use coursehub_config::load;
///
/// std::env::remove_var("COURSEHUB_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.http.address.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let mut builder = config::Config::builder()
        .set_default("http.address", defaults.http.address.clone())?
        .set_default("http.port", i64::from(defaults.http.port))?
        .set_default("database.url", defaults.database.url.clone())?
        .set_default(
            "database.max_connections",
            i64::from(defaults.database.max_connections),
        )?
        .set_default("auth.jwt_secret", defaults.auth.jwt_secret.clone())?
        .set_default(
            "auth.token_ttl_seconds",
            clamp_to_i64(defaults.auth.token_ttl_seconds),
        )?
        .set_default("auth.issuer", defaults.auth.issuer.clone())?
        .set_default("bootstrap.admin_email", defaults.bootstrap.admin_email.clone())?
        .set_default("bootstrap.admin_name", defaults.bootstrap.admin_name.clone())?
        .set_default("payments.provider", "simulated")?
        .set_default(
            "payments.simulated_delay_ms",
            clamp_to_i64(defaults.payments.simulated_delay_ms),
        )?;

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path, "loading configuration via {CONFIG_PATH_ENV}");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"));

    let cfg = builder.build().context("unable to build configuration")?;

    let mut config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    if config.auth.token_ttl_seconds > i64::MAX as u64 {
        config.auth.token_ttl_seconds = i64::MAX as u64;
    }

    if config.auth.jwt_secret.trim().is_empty() {
        anyhow::bail!("auth.jwt_secret must not be empty");
    }

    debug!(
        http = ?config.http,
        database = ?config.database,
        token_ttl_seconds = config.auth.token_ttl_seconds,
        "loaded backend configuration"
    );
    Ok(config)
}
