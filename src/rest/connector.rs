//! Server connector - one classified attempt to reach the server
//!
//! Every failure is folded into a [`ConnectionOutcome`]; nothing escapes as an
//! error to the shell.

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::error::TargetError;
use crate::session::{ConnectionOptions, TargetUri};
use crate::version::{self, CLIENT_API_REVISION};

use super::{HttpRootClient, RootResource, RootResourceClient};

/// Result of a single connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Server reachable and speaking our API revision
    Success(RootResource),
    /// Attempt failed; see [`TargetError::kind`]
    Failure(TargetError),
}

impl ConnectionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn error(&self) -> Option<&TargetError> {
        match self {
            Self::Success(_) => None,
            Self::Failure(e) => Some(e),
        }
    }
}

/// Message reported when the server's API revision differs from ours
pub fn incompatible_version_message(server_revision: i32) -> String {
    format!(
        "Incompatible version of Data Flow server detected. \
         Server version is {} and shell version is {}.",
        server_revision, CLIENT_API_REVISION
    )
}

/// Connects to a server and classifies the result
#[derive(Clone)]
pub struct ServerConnector {
    client: Arc<dyn RootResourceClient>,
}

impl Default for ServerConnector {
    fn default() -> Self {
        Self::new(Arc::new(HttpRootClient::new()))
    }
}

impl ServerConnector {
    /// Create a connector over the given transport
    pub fn new(client: Arc<dyn RootResourceClient>) -> Self {
        Self { client }
    }

    /// Fetch the root resource of `target` and check protocol compatibility.
    ///
    /// Exactly one request is made; there are no retries.
    #[instrument(skip(self, options), fields(uri = %target))]
    pub async fn connect(
        &self,
        target: &TargetUri,
        options: &ConnectionOptions,
    ) -> ConnectionOutcome {
        let root = match self.client.fetch_root(target.as_url(), options).await {
            Ok(root) => root,
            Err(e) => {
                warn!("Failed to reach server: {}", e);
                return ConnectionOutcome::Failure(TargetError::connection(e.message));
            }
        };

        if !version::is_compatible(CLIENT_API_REVISION, root.api_revision) {
            warn!(
                server_revision = root.api_revision,
                client_revision = CLIENT_API_REVISION,
                "Server API revision mismatch"
            );
            return ConnectionOutcome::Failure(TargetError::version_mismatch(
                incompatible_version_message(root.api_revision),
            ));
        }

        if root.links().is_empty() {
            return ConnectionOutcome::Failure(TargetError::connection(format!(
                "Server at {} exposes no resource links",
                target
            )));
        }

        info!(
            links = root.links().len(),
            dashboard = root.link("dashboard"),
            "Connected to Data Flow server"
        );
        ConnectionOutcome::Success(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TargetErrorKind;
    use crate::rest::TransportError;
    use async_trait::async_trait;
    use url::Url;

    struct Fixed(Result<RootResource, TransportError>);

    #[async_trait]
    impl RootResourceClient for Fixed {
        async fn fetch_root(
            &self,
            _uri: &Url,
            _options: &ConnectionOptions,
        ) -> Result<RootResource, TransportError> {
            self.0.clone()
        }
    }

    async fn connect_with(response: Result<RootResource, TransportError>) -> ConnectionOutcome {
        let connector = ServerConnector::new(Arc::new(Fixed(response)));
        let target = TargetUri::parse("http://localhost:9393").unwrap();
        connector.connect(&target, &ConnectionOptions::default()).await
    }

    #[tokio::test]
    async fn test_compatible_server_succeeds() {
        let root = RootResource::new(CLIENT_API_REVISION).with_link("dashboard", "http://x/dashboard");
        let outcome = connect_with(Ok(root.clone())).await;
        assert_eq!(outcome, ConnectionOutcome::Success(root));
        assert!(outcome.is_success());
    }

    #[tokio::test]
    async fn test_transport_message_is_preserved() {
        let outcome = connect_with(Err(TransportError::new("FooBar"))).await;
        let error = outcome.error().unwrap();
        assert_eq!(error.kind, TargetErrorKind::ConnectionError);
        assert_eq!(error.message, "FooBar");
    }

    #[tokio::test]
    async fn test_revision_mismatch_despite_links() {
        let root = RootResource::new(-12).with_link("dashboard", "http://localhost:9393/dashboard");
        let outcome = connect_with(Ok(root)).await;
        let error = outcome.error().unwrap();
        assert_eq!(error.kind, TargetErrorKind::VersionMismatch);
        assert!(error.message.contains("Incompatible version of Data Flow server detected"));
        assert!(error.message.contains("Server version is -12"));
    }

    #[tokio::test]
    async fn test_empty_capability_document_fails() {
        let outcome = connect_with(Ok(RootResource::new(CLIENT_API_REVISION))).await;
        assert_eq!(outcome.error().unwrap().kind, TargetErrorKind::ConnectionError);
    }
}
