use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
}

/// Development server bind settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Accept requests addressed to any hostname (LAN access during development)
    #[serde(default = "default_allow_any_host")]
    pub allow_any_host: bool,
}

/// Values for the development-only API reverse proxy.
///
/// The proxy itself lives in external tooling; this struct only carries the
/// configuration it consumes.
#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Request path prefix that gets forwarded upstream, unmodified
    #[serde(default = "default_path_prefix")]
    pub path_prefix: String,
    /// Upstream origin requests are forwarded to
    #[serde(default)]
    pub upstream: String,
    /// Rewrite the Host header to match the upstream origin
    #[serde(default = "default_rewrite_host")]
    pub rewrite_host: bool,
    /// Verify the upstream TLS certificate (off for self-signed dev backends)
    #[serde(default)]
    pub verify_upstream_tls: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    /// Auto-hide delay in milliseconds
    #[serde(default = "default_auto_hide_ms")]
    pub auto_hide_ms: u64,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5173
}

fn default_allow_any_host() -> bool {
    true
}

fn default_path_prefix() -> String {
    "/api".to_string()
}

fn default_rewrite_host() -> bool {
    true
}

fn default_auto_hide_ms() -> u64 {
    3000
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        // Load .env file if exists
        let _ = dotenvy::dotenv();

        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5173)?
            .set_default("server.allow_any_host", true)?
            .set_default("notification.auto_hide_ms", 3000)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables
            // SERVER_HOST, SERVER_PORT, PROXY_UPSTREAM, etc.
            .add_source(
                Environment::default()
                    .separator("_")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Reject configurations the proxy middleware would silently misroute.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.proxy.enabled {
            if self.proxy.upstream.is_empty() {
                return Err(AppError::Validation(
                    "proxy.upstream must not be empty when the proxy is enabled".to_string(),
                ));
            }
            if !self.proxy.path_prefix.starts_with('/') {
                return Err(AppError::Validation(format!(
                    "proxy.path_prefix must start with '/': {}",
                    self.proxy.path_prefix
                )));
            }
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            allow_any_host: default_allow_any_host(),
        }
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path_prefix: default_path_prefix(),
            upstream: String::new(),
            rewrite_host: default_rewrite_host(),
            verify_upstream_tls: false,
        }
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: default_auto_hide_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values() {
        let server = ServerConfig::default();
        assert_eq!(server.host, "0.0.0.0");
        assert_eq!(server.port, 5173);
        assert!(server.allow_any_host);

        let notification = NotificationConfig::default();
        assert_eq!(notification.auto_hide_ms, 3000);
    }

    #[test]
    fn test_proxy_defaults() {
        let proxy = ProxyConfig::default();
        assert!(!proxy.enabled);
        assert_eq!(proxy.path_prefix, "/api");
        assert!(proxy.rewrite_host);
        assert!(!proxy.verify_upstream_tls);
    }

    #[test]
    fn test_server_addr() {
        let settings = Settings {
            server: ServerConfig::default(),
            proxy: ProxyConfig::default(),
            notification: NotificationConfig::default(),
        };
        assert_eq!(settings.server_addr(), "0.0.0.0:5173");
    }

    #[test]
    fn test_validate_rejects_enabled_proxy_without_upstream() {
        let settings = Settings {
            server: ServerConfig::default(),
            proxy: ProxyConfig {
                enabled: true,
                ..Default::default()
            },
            notification: NotificationConfig::default(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_path_prefix() {
        let settings = Settings {
            server: ServerConfig::default(),
            proxy: ProxyConfig {
                enabled: true,
                upstream: "https://localhost:8443".to_string(),
                path_prefix: "api".to_string(),
                ..Default::default()
            },
            notification: NotificationConfig::default(),
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_disabled_proxy() {
        let settings = Settings {
            server: ServerConfig::default(),
            proxy: ProxyConfig::default(),
            notification: NotificationConfig::default(),
        };
        assert!(settings.validate().is_ok());
    }
}
