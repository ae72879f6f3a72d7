use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

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
    pub scoring: ScoringOptions,
    pub report: ReportOptions,
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

        let scoring = ScoringOptions {
            table_in_yps: flag("APP_TABLE_IN_YPS")?,
            run_time_in_ops: flag("APP_RUN_TIME_IN_OPS")?,
        };

        let sort_order = match env::var("APP_POINTS_SORT") {
            Ok(raw) => PointsSortKey::parse_order(&raw)?,
            Err(_) => PointsSortKey::ordered(),
        };
        let report = ReportOptions {
            lifetime_by_event: flag("APP_LIFETIME_BY_EVENT")?,
            sort_order,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
            report,
        })
    }
}

fn flag(name: &'static str) -> Result<bool, ConfigError> {
    let Ok(raw) = env::var(name) else {
        return Ok(false);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "" | "0" | "false" | "no" | "off" => Ok(false),
        "1" | "true" | "yes" | "on" => Ok(true),
        _ => Err(ConfigError::InvalidFlag { name, value: raw }),
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
}

/// Per-second derivative switches used by the run evaluator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringOptions {
    /// Keep table time in YPS and min-YPS instead of subtracting five seconds.
    pub table_in_yps: bool,
    /// Use run time rather than opening time for open/close OPS.
    pub run_time_in_ops: bool,
}

/// Presentation switches for the points report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportOptions {
    pub lifetime_by_event: bool,
    pub sort_order: [PointsSortKey; 3],
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            lifetime_by_event: false,
            sort_order: PointsSortKey::ordered(),
        }
    }
}

/// Keys used to order event-summary lines within a venue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointsSortKey {
    Division,
    Level,
    Event,
}

impl PointsSortKey {
    pub const fn ordered() -> [Self; 3] {
        [Self::Division, Self::Level, Self::Event]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::Level => "level",
            Self::Event => "event",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "division" => Some(Self::Division),
            "level" => Some(Self::Level),
            "event" => Some(Self::Event),
            _ => None,
        }
    }

    /// Parses a comma list naming each key exactly once.
    pub fn parse_order(raw: &str) -> Result<[Self; 3], ConfigError> {
        let invalid = || ConfigError::InvalidSortKey {
            value: raw.to_string(),
        };
        let keys = raw
            .split(',')
            .map(|part| Self::parse(part).ok_or_else(invalid))
            .collect::<Result<Vec<_>, _>>()?;

        match keys.as_slice() {
            [a, b, c] if a != b && b != c && a != c => Ok([*a, *b, *c]),
            _ => Err(invalid()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidFlag { name: &'static str, value: String },
    InvalidSortKey { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidFlag { name, value } => {
                write!(f, "{name} must be a boolean flag, got '{value}'")
            }
            ConfigError::InvalidSortKey { value } => write!(
                f,
                "APP_POINTS_SORT must list division, level and event once each, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidFlag { .. }
            | ConfigError::InvalidSortKey { .. } => None,
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
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_TABLE_IN_YPS",
            "APP_RUN_TIME_IN_OPS",
            "APP_LIFETIME_BY_EVENT",
            "APP_POINTS_SORT",
        ] {
            env::remove_var(name);
        }
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
        assert_eq!(config.scoring, ScoringOptions::default());
        assert_eq!(config.report, ReportOptions::default());
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
    fn reads_scoring_and_report_switches() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_TABLE_IN_YPS", "yes");
        env::set_var("APP_LIFETIME_BY_EVENT", "1");
        env::set_var("APP_POINTS_SORT", "event, division ,level");
        let config = AppConfig::load().expect("config loads");
        assert!(config.scoring.table_in_yps);
        assert!(!config.scoring.run_time_in_ops);
        assert!(config.report.lifetime_by_event);
        assert_eq!(
            config.report.sort_order,
            [
                PointsSortKey::Event,
                PointsSortKey::Division,
                PointsSortKey::Level
            ]
        );
        reset_env();
    }

    #[test]
    fn rejects_malformed_flag() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_RUN_TIME_IN_OPS", "sometimes");
        match AppConfig::load() {
            Err(ConfigError::InvalidFlag { name, .. }) => assert_eq!(name, "APP_RUN_TIME_IN_OPS"),
            other => panic!("expected invalid flag error, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn sort_order_requires_each_key_once() {
        assert!(PointsSortKey::parse_order("division,division,event").is_err());
        assert!(PointsSortKey::parse_order("division,level").is_err());
        assert!(PointsSortKey::parse_order("division,level,height").is_err());
        assert_eq!(
            PointsSortKey::parse_order("Level,Event,Division").expect("valid order"),
            [
                PointsSortKey::Level,
                PointsSortKey::Event,
                PointsSortKey::Division
            ]
        );
    }
}
