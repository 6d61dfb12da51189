//! Application configuration
//!
//! Loaded from environment variables, with a `.env` file picked up if present.

use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub payment: PaymentConfig,
    pub scheduler: SchedulerConfig,
    pub storage: StorageConfig,
    pub snowflake: SnowflakeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_true")]
    pub run_migrations: bool,
}

/// Token verification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Clock skew tolerated when checking `exp`, in seconds
    #[serde(default = "default_jwt_leeway")]
    pub leeway_secs: u64,
}

/// Payment provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    #[serde(default = "default_payment_base_url")]
    pub base_url: String,
    pub secret_key: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Decimal places between major and minor units (2 for INR)
    #[serde(default = "default_currency_exponent")]
    pub currency_exponent: u32,
    #[serde(default = "default_refund_max_retries")]
    pub refund_max_retries: u32,
    #[serde(default = "default_retry_initial_delay_ms")]
    pub retry_initial_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Completion sweep scheduling
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            run_on_startup: true,
        }
    }
}

/// Media storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Prefix of the URLs uploaded files are served from
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_mb: u32,
}

impl StorageConfig {
    #[must_use]
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb as usize * 1024 * 1024
    }
}

/// Snowflake ID generator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default)]
    pub worker_id: u16,
}

// Default value functions
fn default_app_name() -> String {
    "stay-server".to_string()
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_jwt_leeway() -> u64 {
    30
}

fn default_payment_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_currency() -> String {
    "inr".to_string()
}

fn default_currency_exponent() -> u32 {
    2
}

fn default_refund_max_retries() -> u32 {
    3
}

fn default_retry_initial_delay_ms() -> u64 {
    200
}

fn default_retry_max_delay_ms() -> u64 {
    5_000
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_sweep_interval_secs() -> u64 {
    86_400 // daily
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_public_base_url() -> String {
    "/uploads".to_string()
}

fn default_max_file_size() -> u32 {
    10
}

/// Read an optional variable, falling back to `default` when unset
fn var_or<T: FromStr>(key: &'static str, default: impl FnOnce() -> T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        Err(_) => Ok(default()),
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::MissingVar(key))
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or
    /// a value cannot be parsed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| Environment::parse(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: var_or("DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: var_or("DATABASE_MIN_CONNECTIONS", default_min_connections)?,
                run_migrations: var_or("DATABASE_RUN_MIGRATIONS", default_true)?,
            },
            jwt: JwtConfig {
                secret: required("JWT_SECRET")?,
                leeway_secs: var_or("JWT_LEEWAY_SECS", default_jwt_leeway)?,
            },
            payment: PaymentConfig {
                base_url: env::var("PAYMENT_BASE_URL")
                    .unwrap_or_else(|_| default_payment_base_url()),
                secret_key: required("PAYMENT_SECRET_KEY")?,
                currency: env::var("PAYMENT_CURRENCY")
                    .map(|c| c.to_lowercase())
                    .unwrap_or_else(|_| default_currency()),
                currency_exponent: var_or("PAYMENT_CURRENCY_EXPONENT", default_currency_exponent)?,
                refund_max_retries: var_or("PAYMENT_REFUND_MAX_RETRIES", default_refund_max_retries)?,
                retry_initial_delay_ms: var_or(
                    "PAYMENT_RETRY_INITIAL_DELAY_MS",
                    default_retry_initial_delay_ms,
                )?,
                retry_max_delay_ms: var_or("PAYMENT_RETRY_MAX_DELAY_MS", default_retry_max_delay_ms)?,
                request_timeout_secs: var_or(
                    "PAYMENT_REQUEST_TIMEOUT_SECS",
                    default_request_timeout_secs,
                )?,
            },
            scheduler: SchedulerConfig {
                sweep_interval_secs: var_or("SWEEP_INTERVAL_SECS", default_sweep_interval_secs)?,
                run_on_startup: var_or("SWEEP_RUN_ON_STARTUP", default_true)?,
            },
            storage: StorageConfig {
                upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| default_upload_dir()),
                public_base_url: env::var("UPLOAD_PUBLIC_BASE_URL")
                    .unwrap_or_else(|_| default_public_base_url()),
                max_file_size_mb: var_or("MAX_FILE_SIZE_MB", default_max_file_size)?,
            },
            snowflake: SnowflakeConfig {
                worker_id: var_or("WORKER_ID", || 0)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
