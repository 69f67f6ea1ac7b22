use rust_decimal::Decimal;
use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

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
    pub scoring: ScoringConfig,
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

        let on_track_ratio = decimal_var("APP_ON_TRACK_RATIO", "1.0")?;
        let at_risk_ratio = decimal_var("APP_AT_RISK_RATIO", "0.8")?;
        let scoring = ScoringConfig::new(on_track_ratio, at_risk_ratio)?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
        })
    }
}

fn decimal_var(name: &'static str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Decimal::from_str(raw.trim()).map_err(|_| ConfigError::InvalidRatio { name, value: raw })
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

/// Action-plan health thresholds, expressed as ratios of the quarterly target.
///
/// A reported actual at or above `on_track_ratio × target` is On Track, at or
/// above `at_risk_ratio × target` is At Risk, anything lower is Off Track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringConfig {
    pub on_track_ratio: Decimal,
    pub at_risk_ratio: Decimal,
}

impl ScoringConfig {
    pub fn new(on_track_ratio: Decimal, at_risk_ratio: Decimal) -> Result<Self, ConfigError> {
        if on_track_ratio.is_sign_negative()
            || at_risk_ratio.is_sign_negative()
            || at_risk_ratio > on_track_ratio
        {
            return Err(ConfigError::InvalidThresholds {
                on_track_ratio,
                at_risk_ratio,
            });
        }

        Ok(Self {
            on_track_ratio,
            at_risk_ratio,
        })
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            on_track_ratio: Decimal::ONE,
            at_risk_ratio: Decimal::new(8, 1),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidRatio {
        name: &'static str,
        value: String,
    },
    InvalidThresholds {
        on_track_ratio: Decimal,
        at_risk_ratio: Decimal,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRatio { name, value } => {
                write!(f, "{name} must be a decimal ratio, got '{value}'")
            }
            ConfigError::InvalidThresholds {
                on_track_ratio,
                at_risk_ratio,
            } => write!(
                f,
                "status thresholds must be non-negative with at-risk ({at_risk_ratio}) <= on-track ({on_track_ratio})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRatio { .. }
            | ConfigError::InvalidThresholds { .. } => None,
        }
    }
}
