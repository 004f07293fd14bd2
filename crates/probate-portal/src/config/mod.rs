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
    pub portal: PortalConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            portal: PortalConfig::from_env()?,
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
    pub ansi: bool,
}

/// Connection settings for the portal backend REST API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub base_url: String,
    /// Sent as the tenant/country header on every request.
    pub country: String,
    /// Sent as the frontend-origin header on every request.
    pub frontend_origin: String,
    pub timeout: Duration,
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl PortalConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = env::var("PORTAL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".to_string())
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .ok_or(ConfigError::InvalidTimeout)?;

        let base_url =
            env::var("PORTAL_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8000".to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(base_url));
        }

        Ok(Self {
            base_url,
            country: env::var("PORTAL_COUNTRY").unwrap_or_else(|_| "IE".to_string()),
            frontend_origin: env::var("PORTAL_FRONTEND_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
            timeout: Duration::from_secs(timeout_secs),
            access_token: non_blank_var("PORTAL_ACCESS_TOKEN"),
            refresh_token: non_blank_var("PORTAL_REFRESH_TOKEN"),
        })
    }

    /// Local defaults pointing at a backend on `base_url`.
    pub fn local(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            country: "IE".to_string(),
            frontend_origin: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            access_token: None,
            refresh_token: None,
        }
    }
}

fn non_blank_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout,
    InvalidApiUrl(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout => {
                write!(f, "PORTAL_TIMEOUT_SECS must be a positive number of seconds")
            }
            ConfigError::InvalidApiUrl(value) => {
                write!(f, "PORTAL_API_URL must be an http(s) URL, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidTimeout
            | ConfigError::InvalidApiUrl(_) => None,
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
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "PORTAL_API_URL",
            "PORTAL_COUNTRY",
            "PORTAL_FRONTEND_ORIGIN",
            "PORTAL_TIMEOUT_SECS",
            "PORTAL_ACCESS_TOKEN",
            "PORTAL_REFRESH_TOKEN",
        ] {
            env::remove_var(key);
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
        assert!(config.telemetry.ansi);
        assert_eq!(config.portal.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.portal.country, "IE");
        assert_eq!(config.portal.timeout, Duration::from_secs(30));
        assert_eq!(config.portal.access_token, None);
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn portal_settings_read_from_env() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        env::set_var("PORTAL_API_URL", "https://api.example.ie");
        env::set_var("PORTAL_COUNTRY", "UK");
        env::set_var("PORTAL_TIMEOUT_SECS", "5");
        env::set_var("PORTAL_ACCESS_TOKEN", "  ");
        env::set_var("PORTAL_REFRESH_TOKEN", "refresh-abc");

        let config = AppConfig::load().expect("config loads");
        assert!(!config.telemetry.ansi);
        assert_eq!(config.portal.base_url, "https://api.example.ie");
        assert_eq!(config.portal.country, "UK");
        assert_eq!(config.portal.timeout, Duration::from_secs(5));
        assert_eq!(config.portal.access_token, None);
        assert_eq!(config.portal.refresh_token.as_deref(), Some("refresh-abc"));
        reset_env();
    }

    #[test]
    fn rejects_zero_timeout_and_non_http_urls() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("PORTAL_TIMEOUT_SECS", "0");
        assert!(matches!(AppConfig::load(), Err(ConfigError::InvalidTimeout)));

        reset_env();
        env::set_var("PORTAL_API_URL", "ftp://files.example.ie");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidApiUrl(_))
        ));
        reset_env();
    }
}
