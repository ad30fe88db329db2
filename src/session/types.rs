//! Core target types
//!
//! Defines what the shell is pointed at:
//! - `TargetUri` - a validated absolute http/https URI that remembers how the user typed it
//! - `Credentials` / `ProxyConfig` - optional connection options
//! - `TargetSession` - the process-wide record of the last targeting attempt

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Deref;

use url::Url;

use crate::error::TargetError;
use crate::rest::ConnectionOutcome;

/// Server URI targeted when nothing else is configured
pub const DEFAULT_SERVER_URI: &str = "http://localhost:9393";

/// A validated absolute `http`/`https` URI
///
/// Displays exactly as the user entered it (minus surrounding whitespace), so
/// `info` echoes back the same text that was passed to `target`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUri {
    text: String,
    url: Url,
}

impl TargetUri {
    /// Parse and validate user input
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(TargetError::invalid_target("Target URI must not be empty"));
        }

        let shown = redact_userinfo(text);

        let url = Url::parse(text).map_err(|e| {
            TargetError::invalid_target(format!("'{}' is not a valid URI: {}", shown, e))
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(TargetError::invalid_target(format!(
                    "Unsupported scheme '{}' in '{}'; expected http or https",
                    other, shown
                )));
            }
        }

        // The text is echoed by `info`, so it must never carry a password
        if !url.username().is_empty() || url.password().is_some() {
            return Err(TargetError::invalid_target(format!(
                "'{}' embeds credentials; use --username and --password instead",
                shown
            )));
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(TargetError::invalid_target(format!(
                "'{}' does not name a host",
                shown
            )));
        }

        Ok(Self {
            text: text.to_string(),
            url,
        })
    }

    /// The parsed URL used for requests
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    /// The text as entered
    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Mask any `user:password@` part of URI-like input
pub fn redact_userinfo(input: &str) -> Cow<'_, str> {
    let text = input.trim();
    let Some(colon) = text.find(':') else {
        return Cow::Borrowed(text);
    };

    let after_scheme = &text[colon + 1..];
    let start = text.len() - after_scheme.trim_start_matches(['/', '\\']).len();
    let authority_len = text[start..]
        .find(['/', '?', '#', '\\'])
        .unwrap_or(text.len() - start);

    match text[start..start + authority_len].rfind('@') {
        Some(at) => Cow::Owned(format!("{}***{}", &text[..start], &text[start + at..])),
        None => Cow::Borrowed(text),
    }
}

impl Default for TargetUri {
    fn default() -> Self {
        Self {
            text: DEFAULT_SERVER_URI.to_string(),
            url: Url::parse(DEFAULT_SERVER_URI).expect("default server URI is valid"),
        }
    }
}

impl fmt::Display for TargetUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Username/password pair sent as HTTP basic authentication
///
/// `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build credentials from optional command arguments.
    ///
    /// Blank values count as absent. Both parts or neither must be given.
    pub fn from_parts(
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Option<Self>, TargetError> {
        let username = username.filter(|u| !u.trim().is_empty());
        let password = password.filter(|p| !p.is_empty());

        match (username, password) {
            (None, None) => Ok(None),
            (Some(u), Some(p)) => Ok(Some(Self::new(u.trim(), p))),
            (None, Some(_)) => Err(TargetError::invalid_target(
                "A password may be specified only together with a username",
            )),
            (Some(u), None) => Err(TargetError::invalid_target(format!(
                "A password must be specified together with username '{}'",
                u.trim()
            ))),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Outbound proxy used for the root request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub uri: TargetUri,
    pub credentials: Option<Credentials>,
}

impl ProxyConfig {
    /// Validate proxy settings; any problem is reported as an invalid target
    pub fn parse(
        uri: &str,
        username: Option<&str>,
        password: Option<&str>,
    ) -> Result<Self, TargetError> {
        let uri = TargetUri::parse(uri).map_err(|e| {
            TargetError::invalid_target(format!("Invalid proxy URI: {}", e.message))
        })?;
        let credentials = Credentials::from_parts(username, password).map_err(|e| {
            TargetError::invalid_target(format!("Invalid proxy credentials: {}", e.message))
        })?;
        Ok(Self { uri, credentials })
    }
}

/// Per-attempt options that travel with a target request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionOptions {
    pub credentials: Option<Credentials>,
    pub proxy: Option<ProxyConfig>,
    /// Accept any server certificate. Unsafe outside of development setups.
    pub skip_ssl_validation: bool,
}

/// State of the current target
///
/// `root_links` is non-empty exactly when the last attempt succeeded, and
/// `last_error` is set exactly when it did not.
#[derive(Debug, Clone, Default)]
pub struct TargetSession {
    server_uri: TargetUri,
    root_links: BTreeMap<String, String>,
    server_revision: Option<i32>,
    last_error: Option<TargetError>,
    options: ConnectionOptions,
    attempts: u64,
}

impl TargetSession {
    /// Create a session pointing at `server_uri` with no attempt made yet
    pub fn new(server_uri: TargetUri) -> Self {
        Self {
            server_uri,
            ..Default::default()
        }
    }

    /// Record the outcome of a connection attempt against `uri`
    pub fn update(&mut self, outcome: &ConnectionOutcome, uri: TargetUri) {
        self.server_uri = uri;
        self.attempts += 1;

        match outcome {
            ConnectionOutcome::Success(root) => {
                self.root_links = root.links().clone();
                self.server_revision = Some(root.api_revision);
                self.last_error = None;
            }
            ConnectionOutcome::Failure(error) => self.fail(error.clone()),
        }
    }

    /// Record a failure detected before a URI could be established.
    ///
    /// `server_uri` keeps its previous value; options of earlier attempts
    /// are dropped.
    pub fn reject(&mut self, error: TargetError) {
        self.attempts += 1;
        self.options = ConnectionOptions::default();
        self.fail(error);
    }

    /// Replace the connection options used for the current target
    pub fn set_options(&mut self, options: ConnectionOptions) {
        self.options = options;
    }

    fn fail(&mut self, error: TargetError) {
        self.root_links.clear();
        self.server_revision = None;
        self.last_error = Some(error);
    }

    /// Detached, read-only copy for rendering
    pub fn snapshot(&self) -> TargetSnapshot {
        TargetSnapshot(self.clone())
    }

    pub fn server_uri(&self) -> &TargetUri {
        &self.server_uri
    }

    /// Relation name to href, sorted by relation
    pub fn links(&self) -> &BTreeMap<String, String> {
        &self.root_links
    }

    /// Whether the server advertised the given relation
    pub fn has_capability(&self, rel: &str) -> bool {
        self.root_links.contains_key(rel)
    }

    /// API revision reported by the server on the last successful attempt
    pub fn server_revision(&self) -> Option<i32> {
        self.server_revision
    }

    pub fn last_error(&self) -> Option<&TargetError> {
        self.last_error.as_ref()
    }

    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    pub fn is_connected(&self) -> bool {
        !self.root_links.is_empty()
    }

    /// Number of targeting attempts recorded so far
    pub fn attempts(&self) -> u64 {
        self.attempts
    }
}

/// Immutable view of a [`TargetSession`]
#[derive(Debug, Clone)]
pub struct TargetSnapshot(TargetSession);

impl Deref for TargetSnapshot {
    type Target = TargetSession;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
