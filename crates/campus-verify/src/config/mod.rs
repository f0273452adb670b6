use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the client.
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

/// Top-level configuration for the verification client.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub telemetry: TelemetryConfig,
    pub media: MediaConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let output_dir = match env::var("VERIFY_MEDIA_DIR") {
            Ok(raw) if raw.trim().is_empty() => return Err(ConfigError::EmptyMediaDir),
            Ok(raw) => PathBuf::from(raw.trim()),
            Err(_) => MediaConfig::default_output_dir(),
        };

        Ok(Self {
            environment,
            telemetry: TelemetryConfig { log_level },
            media: MediaConfig { output_dir },
        })
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where transcoded evidence is written before upload.
#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub output_dir: PathBuf,
}

impl MediaConfig {
    pub fn default_output_dir() -> PathBuf {
        env::temp_dir().join("campus-verify")
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyMediaDir,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyMediaDir => {
                write!(f, "VERIFY_MEDIA_DIR must not be empty when set")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
