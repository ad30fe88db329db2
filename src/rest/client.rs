//! HTTP transport for the root resource
//!
//! [`RootResourceClient`] is the seam between the connector and the network.
//! [`HttpRootClient`] builds a fresh reqwest client per attempt so that
//! credentials, proxy and TLS settings never outlive the call they were given for.

use std::error::Error as StdError;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::session::ConnectionOptions;

use super::RootResource;

/// Default TCP connect timeout
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for the whole root request
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Media types accepted for the root resource, HAL preferred
const ROOT_ACCEPT: &str = "application/hal+json, application/json;q=0.9";

/// Any failure below the HTTP semantics layer, carrying the transport's own message
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(describe_error(&e))
    }
}

/// Render an error and its source chain as `outer: inner: root`
fn describe_error(error: &(dyn StdError + 'static)) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !message.contains(&cause_text) {
            message.push_str(": ");
            message.push_str(&cause_text);
        }
        source = cause.source();
    }
    message
}

/// Fetches and decodes the server's root resource
#[async_trait]
pub trait RootResourceClient: Send + Sync {
    /// Issue exactly one GET against `uri`
    async fn fetch_root(
        &self,
        uri: &Url,
        options: &ConnectionOptions,
    ) -> Result<RootResource, TransportError>;
}

/// reqwest-backed [`RootResourceClient`]
#[derive(Debug, Clone)]
pub struct HttpRootClient {
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl Default for HttpRootClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpRootClient {
    /// Create a client with default timeouts
    pub fn new() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    /// Set the TCP connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the overall request timeout
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    fn build_client(&self, options: &ConnectionOptions) -> Result<reqwest::Client, TransportError> {
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .connect_timeout(self.connect_timeout)
            .timeout(self.request_timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")));

        // Only the explicitly configured proxy is used, never one from the environment
        builder = match &options.proxy {
            Some(proxy) => {
                let mut reqwest_proxy = reqwest::Proxy::all(proxy.uri.as_url().clone())?;
                if let Some(creds) = &proxy.credentials {
                    reqwest_proxy = reqwest_proxy.basic_auth(creds.username(), creds.password());
                }
                debug!(proxy = %proxy.uri, "Routing root request through proxy");
                builder.proxy(reqwest_proxy)
            }
            None => builder.no_proxy(),
        };

        if options.skip_ssl_validation {
            warn!(
                "SSL certificate validation is DISABLED for this target. \
                 Any certificate will be accepted; never use this against production servers."
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        Ok(builder.build()?)
    }
}

#[async_trait]
impl RootResourceClient for HttpRootClient {
    #[instrument(skip(self, options), fields(uri = %uri))]
    async fn fetch_root(
        &self,
        uri: &Url,
        options: &ConnectionOptions,
    ) -> Result<RootResource, TransportError> {
        let client = self.build_client(options)?;

        let mut request = client.get(uri.clone()).header(ACCEPT, ROOT_ACCEPT);
        if let Some(creds) = &options.credentials {
            debug!(username = creds.username(), "Using basic authentication");
            request = request.basic_auth(creds.username(), Some(creds.password()));
        }

        let response = request.send().await?.error_for_status()?;
        debug!(status = %response.status(), "Root resource received");

        Ok(response.json::<RootResource>().await?)
    }
}
