//! `target` and `info` commands
//!
//! Orchestrates the [`ServerConnector`] and the shared [`TargetHolder`], and
//! owns the one-shot startup hook that targets the configured server.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::config::{Config, ProxySettings};
use crate::error::{TargetError, TargetErrorKind};
use crate::rest::{ConnectionOutcome, HttpRootClient, ServerConnector};
use crate::session::{redact_userinfo, ConnectionOptions, Credentials, TargetHolder, TargetUri};

use super::render::render_info;

/// Arguments of one `target` invocation
#[derive(Debug, Clone, Default)]
pub struct TargetRequest {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skip_ssl_validation: bool,
    pub proxy: Option<ProxySettings>,
}

/// Settings used by the startup hook and as fallbacks for `target`
#[derive(Debug, Clone)]
pub struct TargetDefaults {
    pub uri: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub skip_ssl_validation: bool,
    pub proxy: Option<ProxySettings>,
    pub auto_target: bool,
}

impl Default for TargetDefaults {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for TargetDefaults {
    fn from(config: &Config) -> Self {
        Self {
            uri: config.server_uri.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
            skip_ssl_validation: config.skip_ssl_validation,
            proxy: config.proxy.clone(),
            auto_target: config.auto_target,
        }
    }
}

/// The shell's server configuration commands
pub struct ConfigCommand {
    connector: ServerConnector,
    holder: TargetHolder,
    defaults: TargetDefaults,
    ready_handled: AtomicBool,
}

impl ConfigCommand {
    /// Create the command over an explicit connector and session
    pub fn new(connector: ServerConnector, holder: TargetHolder, defaults: TargetDefaults) -> Self {
        Self {
            connector,
            holder,
            defaults,
            ready_handled: AtomicBool::new(false),
        }
    }

    /// Wire up the HTTP connector and a fresh session from configuration
    pub fn from_config(config: &Config) -> Self {
        let client = HttpRootClient::new()
            .with_connect_timeout(config.connect_timeout())
            .with_request_timeout(config.request_timeout());
        let holder = match TargetUri::parse(&config.server_uri) {
            Ok(uri) => TargetHolder::new(uri),
            Err(_) => TargetHolder::default(),
        };

        Self::new(
            ServerConnector::new(Arc::new(client)),
            holder,
            TargetDefaults::from(config),
        )
    }

    /// Shared session handle, for other commands gating on capabilities
    pub fn holder(&self) -> &TargetHolder {
        &self.holder
    }

    /// Point the shell at `uri` and report the result.
    ///
    /// Uses the configured proxy, if any.
    pub async fn target(
        &self,
        uri: &str,
        username: Option<&str>,
        password: Option<&str>,
        skip_ssl_validation: bool,
    ) -> String {
        self.target_with(TargetRequest {
            uri: uri.to_string(),
            username: username.map(str::to_string),
            password: password.map(str::to_string),
            skip_ssl_validation,
            proxy: self.defaults.proxy.clone(),
        })
        .await
    }

    /// Run a fully specified `target` request
    #[instrument(skip(self, request), fields(uri = %redact_userinfo(&request.uri)))]
    pub async fn target_with(&self, request: TargetRequest) -> String {
        let uri = match TargetUri::parse(&request.uri) {
            Ok(uri) => uri,
            Err(error) => {
                debug!("Rejected target: {}", error);
                let output = render_invalid(&request.uri, &error);
                self.holder.reject(error).await;
                return output;
            }
        };

        let options = match connection_options(&request) {
            Ok(options) => options,
            Err(error) => {
                let outcome = ConnectionOutcome::Failure(error);
                let output = render_outcome(&uri, &outcome);
                self.holder
                    .record(uri, ConnectionOptions::default(), &outcome)
                    .await;
                return output;
            }
        };

        let outcome = self.connector.connect(&uri, &options).await;
        let output = render_outcome(&uri, &outcome);
        self.holder.record(uri, options, &outcome).await;
        output
    }

    /// Render the current target state
    pub async fn info(&self) -> String {
        render_info(&*self.holder.snapshot().await)
    }

    /// Startup hook: target the configured server once the shell is ready.
    ///
    /// Runs at most once per command instance and only if nothing has been
    /// targeted yet. Returns the `target` output when it ran.
    pub async fn on_application_ready(&self) -> Option<String> {
        if self.ready_handled.swap(true, Ordering::SeqCst) {
            debug!("Ready signal already handled");
            return None;
        }
        if !self.defaults.auto_target {
            debug!("Automatic targeting disabled");
            return None;
        }
        if self.holder.has_been_targeted().await {
            debug!("Target already set, skipping automatic targeting");
            return None;
        }

        info!("Targeting default server {}", redact_userinfo(&self.defaults.uri));
        let output = self
            .target_with(TargetRequest {
                uri: self.defaults.uri.clone(),
                username: self.defaults.username.clone(),
                password: self.defaults.password.clone(),
                skip_ssl_validation: self.defaults.skip_ssl_validation,
                proxy: self.defaults.proxy.clone(),
            })
            .await;
        Some(output)
    }
}

fn connection_options(request: &TargetRequest) -> Result<ConnectionOptions, TargetError> {
    let credentials =
        Credentials::from_parts(request.username.as_deref(), request.password.as_deref())?;
    let proxy = request
        .proxy
        .as_ref()
        .map(ProxySettings::to_proxy_config)
        .transpose()?;

    Ok(ConnectionOptions {
        credentials,
        proxy,
        skip_ssl_validation: request.skip_ssl_validation,
    })
}

fn render_invalid(input: &str, error: &TargetError) -> String {
    format!("Invalid target '{}': {}", redact_userinfo(input), error.message)
}

fn render_outcome(uri: &TargetUri, outcome: &ConnectionOutcome) -> String {
    let Some(error) = outcome.error() else {
        return format!("Successfully targeted {}", uri);
    };

    match error.kind {
        TargetErrorKind::InvalidTarget => render_invalid(uri.as_str(), error),
        TargetErrorKind::ConnectionError => format!(
            "Unable to contact Data Flow Server at '{}': '{}'.",
            uri, error.message
        ),
        TargetErrorKind::VersionMismatch => format!(
            "{}\nInstall a shell built for the server's API revision, or target a matching server.",
            error.message
        ),
    }
}
