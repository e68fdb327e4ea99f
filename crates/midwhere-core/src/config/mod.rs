use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::equity::{PipelineConfig, ProviderFailurePolicy};

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
    pub equity: EquitySettings,
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

        let provider_timeout_ms = env::var("EQUITY_PROVIDER_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u64>()
            .ok()
            .filter(|ms| *ms > 0)
            .ok_or(ConfigError::InvalidProviderTimeout)?;

        let failure_policy = env::var("EQUITY_PROVIDER_POLICY")
            .unwrap_or_else(|_| "degraded".to_string())
            .parse::<ProviderFailurePolicy>()
            .map_err(|reason| ConfigError::InvalidProviderPolicy { reason })?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            equity: EquitySettings {
                provider_timeout_ms,
                failure_policy,
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

/// Runtime knobs for travel-time lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquitySettings {
    pub provider_timeout_ms: u64,
    pub failure_policy: ProviderFailurePolicy,
}

impl EquitySettings {
    /// Default policy tables with the lookup settings applied.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            provider_timeout_ms: self.provider_timeout_ms,
            failure_policy: self.failure_policy,
            ..PipelineConfig::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidProviderTimeout,
    InvalidProviderPolicy { reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidProviderTimeout => {
                write!(f, "EQUITY_PROVIDER_TIMEOUT_MS must be a positive integer")
            }
            ConfigError::InvalidProviderPolicy { reason } => {
                write!(f, "EQUITY_PROVIDER_POLICY is invalid: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidProviderTimeout
            | ConfigError::InvalidProviderPolicy { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("EQUITY_PROVIDER_TIMEOUT_MS");
        env::remove_var("EQUITY_PROVIDER_POLICY");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.equity.provider_timeout_ms, 5000);
        assert_eq!(config.equity.failure_policy, ProviderFailurePolicy::Degraded);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
    }

    #[test]
    fn reads_strict_policy_and_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EQUITY_PROVIDER_POLICY", "Strict");
        env::set_var("EQUITY_PROVIDER_TIMEOUT_MS", "750");
        let config = AppConfig::load().expect("config loads");
        let pipeline = config.equity.pipeline_config();
        assert_eq!(pipeline.failure_policy, ProviderFailurePolicy::Strict);
        assert_eq!(pipeline.provider_timeout_ms, 750);
    }

    #[test]
    fn rejects_zero_timeout_and_unknown_policy() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("EQUITY_PROVIDER_TIMEOUT_MS", "0");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidProviderTimeout)
        ));

        reset_env();
        env::set_var("EQUITY_PROVIDER_POLICY", "optimistic");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidProviderPolicy { .. })
        ));
        reset_env();
    }
}
