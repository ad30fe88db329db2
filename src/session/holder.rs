//! Shared handle to the target session
//!
//! Commands may run on any task, so every read-modify-write of the session
//! happens under one write guard.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::TargetError;
use crate::rest::ConnectionOutcome;

use super::{ConnectionOptions, TargetSession, TargetSnapshot, TargetUri};

/// Cloneable handle to the process-wide [`TargetSession`]
#[derive(Debug, Clone, Default)]
pub struct TargetHolder {
    session: Arc<RwLock<TargetSession>>,
}

impl TargetHolder {
    /// Create a holder whose session points at `server_uri`
    pub fn new(server_uri: TargetUri) -> Self {
        Self {
            session: Arc::new(RwLock::new(TargetSession::new(server_uri))),
        }
    }

    /// Record a completed attempt: options and outcome land together
    pub async fn record(
        &self,
        uri: TargetUri,
        options: ConnectionOptions,
        outcome: &ConnectionOutcome,
    ) {
        let mut session = self.session.write().await;
        session.set_options(options);
        session.update(outcome, uri);
        debug!(
            target_uri = %session.server_uri(),
            success = outcome.is_success(),
            "Target session updated"
        );
    }

    /// Record an attempt that failed local validation
    pub async fn reject(&self, error: TargetError) {
        let mut session = self.session.write().await;
        session.reject(error);
        debug!(target_uri = %session.server_uri(), "Target attempt rejected");
    }

    /// Read-only copy of the current session
    pub async fn snapshot(&self) -> TargetSnapshot {
        self.session.read().await.snapshot()
    }

    /// Whether any targeting attempt has been recorded
    pub async fn has_been_targeted(&self) -> bool {
        self.session.read().await.attempts() > 0
    }
}
