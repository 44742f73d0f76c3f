use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
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
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub allocation: AllocationConfig,
    pub sweeper: SweeperConfig,
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

        let lock_timeout_ms = positive_u64("APP_LOCK_TIMEOUT_MS", 2_000)
            .ok_or(ConfigError::InvalidLockTimeout)?;
        let sweep_interval_secs = positive_u64("APP_SWEEP_INTERVAL_SECS", 86_400)
            .ok_or(ConfigError::InvalidSweepInterval)?;
        let sweep_enabled = match env::var("APP_SWEEP_ENABLED") {
            Ok(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidSweepFlag)?,
            Err(_) => true,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            allocation: AllocationConfig {
                lock_timeout: Duration::from_millis(lock_timeout_ms),
            },
            sweeper: SweeperConfig {
                enabled: sweep_enabled,
                interval: Duration::from_secs(sweep_interval_secs),
            },
        })
    }
}

fn positive_u64(key: &str, default: u64) -> Option<u64> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<u64>().ok().filter(|value| *value > 0),
        Err(_) => Some(default),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

/// Bounds on how long a request may wait for a hostel's inventory lock.
#[derive(Debug, Clone, Copy)]
pub struct AllocationConfig {
    pub lock_timeout: Duration,
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(2),
        }
    }
}

/// Cadence of the background expiry sweep.
#[derive(Debug, Clone, Copy)]
pub struct SweeperConfig {
    pub enabled: bool,
    pub interval: Duration,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLockTimeout,
    InvalidSweepInterval,
    InvalidSweepFlag,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLockTimeout => {
                write!(f, "APP_LOCK_TIMEOUT_MS must be a positive number of milliseconds")
            }
            ConfigError::InvalidSweepInterval => {
                write!(f, "APP_SWEEP_INTERVAL_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidSweepFlag => {
                write!(f, "APP_SWEEP_ENABLED must be one of true/false/1/0/yes/no/on/off")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidLockTimeout
            | ConfigError::InvalidSweepInterval
            | ConfigError::InvalidSweepFlag => None,
        }
    }
}
