use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::workflows::screening::{ConstantSet, ScreeningConfig};

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
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub screening: ScreeningSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let constants = match env::var("SCREENING_CONSTANTS") {
            Ok(raw) => ConstantSet::parse(&raw).ok_or(ConfigError::UnknownConstantSet(raw))?,
            Err(_) => ConstantSet::Current,
        };
        let tables_path = env::var("SCREENING_TABLES_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            screening: ScreeningSettings {
                constants,
                tables_path,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Selects which policy constant tables the engine runs with.
#[derive(Debug, Clone)]
pub struct ScreeningSettings {
    pub constants: ConstantSet,
    pub tables_path: Option<PathBuf>,
}

impl ScreeningSettings {
    /// Resolve the threshold tables. A tables file replaces the built-in set entirely.
    pub fn tables(&self) -> Result<ScreeningConfig, ConfigError> {
        let Some(path) = &self.tables_path else {
            return Ok(ScreeningConfig::for_set(self.constants));
        };

        let raw = fs::read_to_string(path).map_err(|source| ConfigError::TablesUnreadable {
            path: path.clone(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::TablesInvalid {
            path: path.clone(),
            source,
        })
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    UnknownConstantSet(String),
    TablesUnreadable {
        path: PathBuf,
        source: std::io::Error,
    },
    TablesInvalid {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::UnknownConstantSet(value) => write!(
                f,
                "SCREENING_CONSTANTS must be 'current' or 'legacy', got '{value}'"
            ),
            ConfigError::TablesUnreadable { path, .. } => {
                write!(f, "unable to read screening tables from {}", path.display())
            }
            ConfigError::TablesInvalid { path, .. } => {
                write!(f, "screening tables in {} are malformed", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::UnknownConstantSet(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::TablesUnreadable { source, .. } => Some(source),
            ConfigError::TablesInvalid { source, .. } => Some(source),
        }
    }
}
