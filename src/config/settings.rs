//! User configuration settings
//!
//! Layered configuration: defaults → config file → environment → CLI args

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Error, Result};
use crate::session::{ProxyConfig, TargetUri, DEFAULT_SERVER_URI};

/// Prefix for environment overrides (`DATAFLOW_SERVER_URI`, `DATAFLOW_PROXY__URI`, ...)
pub const ENV_PREFIX: &str = "DATAFLOW_";

/// Proxy settings as written in the config file
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxySettings {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl ProxySettings {
    /// Validate into a [`ProxyConfig`]
    pub fn to_proxy_config(&self) -> std::result::Result<ProxyConfig, crate::error::TargetError> {
        ProxyConfig::parse(
            &self.uri,
            self.username.as_deref(),
            self.password.as_deref(),
        )
    }
}

impl fmt::Debug for ProxySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxySettings")
            .field("uri", &self.uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Application configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server targeted automatically at startup
    pub server_uri: String,

    /// Username for the startup target
    pub username: Option<String>,

    /// Password for the startup target
    pub password: Option<String>,

    /// Accept any TLS certificate (development only)
    pub skip_ssl_validation: bool,

    /// Target `server_uri` as soon as the shell is ready
    pub auto_target: bool,

    /// TCP connect timeout in milliseconds
    pub connect_timeout_ms: u64,

    /// Whole-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Enable debug logging
    pub debug: bool,

    /// Log file path (if set, logs to file instead of stderr)
    pub log_file: Option<PathBuf>,

    /// Outbound HTTP proxy
    pub proxy: Option<ProxySettings>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_uri: DEFAULT_SERVER_URI.to_string(),
            username: None,
            password: None,
            skip_ssl_validation: false,
            auto_target: true,
            connect_timeout_ms: 5_000,
            request_timeout_ms: 30_000,
            debug: false,
            log_file: None,
            proxy: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("server_uri", &self.server_uri)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("skip_ssl_validation", &self.skip_ssl_validation)
            .field("auto_target", &self.auto_target)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("debug", &self.debug)
            .field("log_file", &self.log_file)
            .field("proxy", &self.proxy)
            .finish()
    }
}

/// Values given on the command line; `None` leaves lower layers untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_ssl_validation: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_target: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<bool>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// With `path` set the file must exist; otherwise the per-user config file
    /// is used when present.
    pub fn load(path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let config_path = match path {
            Some(p) if !p.exists() => {
                return Err(ConfigError::FileNotFound(p.to_path_buf()).into());
            }
            Some(p) => p.to_path_buf(),
            None => Self::config_file_path()?,
        };

        Self::figment(&config_path, overrides)
            .extract::<Config>()
            .map_err(|e| ConfigError::LoadFailed(e.to_string()))?
            .validated()
    }

    fn figment(config_path: &Path, overrides: ConfigOverrides) -> Figment {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Config::default()))
            // Layer config file if it exists
            .merge(Toml::file(config_path))
            // Layer environment variables (DATAFLOW_SERVER_URI, DATAFLOW_PROXY__URI, ...)
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            // CLI flags win
            .merge(Serialized::defaults(overrides))
    }

    /// Check values that serde cannot
    pub fn validated(self) -> Result<Self> {
        if let Err(e) = TargetUri::parse(&self.server_uri) {
            return Err(invalid("server_uri", e.message));
        }
        if self.connect_timeout_ms == 0 {
            return Err(invalid("connect_timeout_ms", "must be greater than zero"));
        }
        if self.request_timeout_ms == 0 {
            return Err(invalid("request_timeout_ms", "must be greater than zero"));
        }
        if let Some(proxy) = &self.proxy {
            if let Err(e) = proxy.to_proxy_config() {
                return Err(invalid("proxy", e.message));
            }
        }
        Ok(self)
    }

    /// Get the configuration file path
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Copy with every secret masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| "********".to_string());
        Self {
            password: mask(&self.password),
            proxy: self.proxy.as_ref().map(|p| ProxySettings {
                password: mask(&p.password),
                ..p.clone()
            }),
            ..self.clone()
        }
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("io", "dataflow", "dataflow-shell").ok_or_else(|| {
            Error::Config(ConfigError::LoadFailed(
                "Could not determine home directory".to_string(),
            ))
        })
    }
}

fn invalid(key: &str, reason: impl Into<String>) -> Error {
    Error::Config(ConfigError::InvalidValue {
        key: key.to_string(),
        reason: reason.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server_uri, "http://localhost:9393");
        assert!(!config.skip_ssl_validation);
        assert!(config.auto_target);
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validated().is_ok());
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("server_uri"));
        assert!(toml.contains("localhost:9393"));
    }

    // Loading reads the process environment, so every test that loads runs
    // inside a figment Jail to serialize env access.

    #[test]
    fn test_load_from_file_with_overrides() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "config.toml",
                r#"
server_uri = "https://dataflow.example.com"
request_timeout_ms = 1500

[proxy]
uri = "http://proxy.example.com:3128"
"#,
            )?;

            let overrides = ConfigOverrides {
                skip_ssl_validation: Some(true),
                ..Default::default()
            };
            let path = jail.directory().join("config.toml");
            let config = Config::load(Some(&path), overrides).map_err(|e| e.to_string())?;

            assert_eq!(config.server_uri, "https://dataflow.example.com");
            assert_eq!(config.request_timeout_ms, 1500);
            assert!(config.skip_ssl_validation);
            assert_eq!(
                config.proxy.as_ref().map(|p| p.uri.as_str()),
                Some("http://proxy.example.com:3128")
            );
            Ok(())
        });
    }

    #[test]
    fn test_cli_override_beats_file_and_env() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "server_uri = \"http://from-file:9393\"\n")?;
            jail.set_env("DATAFLOW_SERVER_URI", "http://from-env:9393");

            let overrides = ConfigOverrides {
                server_uri: Some("http://from-cli:9393".to_string()),
                ..Default::default()
            };
            let path = jail.directory().join("config.toml");
            let config = Config::load(Some(&path), overrides).map_err(|e| e.to_string())?;
            assert_eq!(config.server_uri, "http://from-cli:9393");
            Ok(())
        });
    }

    #[test]
    fn test_environment_layer() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", "server_uri = \"http://from-file:9393\"\n")?;
            jail.set_env("DATAFLOW_SERVER_URI", "http://from-env:9393");
            jail.set_env("DATAFLOW_PROXY__URI", "http://proxy:3128");

            let path = jail.directory().join("config.toml");
            let config = Config::load(Some(&path), ConfigOverrides::default())
                .map_err(|e| e.to_string())?;

            assert_eq!(config.server_uri, "http://from-env:9393");
            assert_eq!(config.proxy.map(|p| p.uri), Some("http://proxy:3128".to_string()));
            Ok(())
        });
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nope.toml");
        let err = Config::load(Some(&path), ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::FileNotFound(_))));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let config = Config {
            server_uri: "not a uri".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.validated(),
            Err(Error::Config(ConfigError::InvalidValue { key, .. })) if key == "server_uri"
        ));

        let config = Config {
            connect_timeout_ms: 0,
            ..Default::default()
        };
        assert!(config.validated().is_err());

        let config = Config {
            proxy: Some(ProxySettings {
                uri: "http://proxy:3128".to_string(),
                username: None,
                password: Some("pw".to_string()),
            }),
            ..Default::default()
        };
        assert!(config.validated().is_err());
    }

    #[test]
    fn test_redacted_masks_secrets() {
        let config = Config {
            username: Some("admin".to_string()),
            password: Some("s3cret".to_string()),
            proxy: Some(ProxySettings {
                uri: "http://proxy:3128".to_string(),
                username: Some("p".to_string()),
                password: Some("proxy-pw".to_string()),
            }),
            ..Default::default()
        };
        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("s3cret"));
        assert!(!shown.contains("proxy-pw"));
        assert!(shown.contains("admin"));
        assert!(!format!("{:?}", config).contains("s3cret"));
    }
}
