use std::env;
use std::fmt;
use std::time::Duration;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub source: SourceConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let url = env::var("SOURCE_URL").unwrap_or_else(|_| DEFAULT_SOURCE_URL.to_string());
        let timeout_secs = parse_env_u64("FETCH_TIMEOUT_SECS", 10)?;
        let max_retries = parse_env_u64("FETCH_MAX_RETRIES", 3)? as u32;
        let backoff = BackoffPolicy {
            base_seconds: parse_env_f64("BACKOFF_BASE_SECS", 1.0)?,
            factor: parse_env_f64("BACKOFF_FACTOR", 2.0)?,
            max_seconds: parse_env_f64("BACKOFF_MAX_SECS", 30.0)?,
        };

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            source: SourceConfig {
                url,
                timeout: Duration::from_secs(timeout_secs),
                max_retries,
                backoff,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

const DEFAULT_SOURCE_URL: &str =
    "https://api.slingacademy.com/v1/sample-data/files/employees.json";

/// Settings for one pipeline invocation against the remote endpoint.
#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub url: String,
    /// Per-attempt network timeout, not a whole-run deadline.
    pub timeout: Duration,
    /// Extra attempts after the first, spent only on timeout/connection failures.
    pub max_retries: u32,
    pub backoff: BackoffPolicy,
}

/// Maps an attempt number to the wait before the next retry.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base_seconds: f64,
    pub factor: f64,
    pub max_seconds: f64,
}

impl BackoffPolicy {
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let seconds = (self.base_seconds * self.factor.powi(exponent)).min(self.max_seconds);
        Duration::from_secs_f64(seconds.max(0.0))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidInteger { var: &'static str },
    InvalidNumber { var: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidInteger { var } => {
                write!(f, "{var} must be a non-negative integer")
            }
            ConfigError::InvalidNumber { var } => {
                write!(f, "{var} must be a non-negative number")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_env_u64(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidInteger { var }),
        Err(_) => Ok(default),
    }
}

fn parse_env_f64(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| *value >= 0.0 && value.is_finite())
            .ok_or(ConfigError::InvalidNumber { var }),
        Err(_) => Ok(default),
    }
}
