//! Data Flow Shell - targets a Data Flow server's REST control endpoint
//!
//! This crate provides the connection core of the interactive shell: it
//! validates a server URI, fetches the server's root resource, checks the
//! API revision against the one the shell was built for, and reports status.
//!
//! # Architecture
//!
//! Startup runs one fixed sequence before accepting commands:
//! configuration → `ConfigCommand::on_application_ready` (auto-target) → command loop.
//!
//! # Modules
//!
//! - [`version`] - API revision compatibility
//! - [`session`] - Target session state shared by all commands
//! - [`rest`] - Root resource wire format, HTTP transport and connector
//! - [`shell`] - `target`/`info` commands, rendering and the command loop
//! - [`config`] - Layered configuration
//! - [`error`] - Error types

pub mod config;
pub mod error;
pub mod rest;
pub mod session;
pub mod shell;
pub mod version;

pub use config::Config;
pub use error::{Error, Result, TargetError, TargetErrorKind};
pub use rest::{ConnectionOutcome, RootResource, ServerConnector};
pub use session::{TargetHolder, TargetSession, TargetUri};
pub use shell::ConfigCommand;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
