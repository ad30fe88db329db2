//! Configuration module
//!
//! Handles user configuration (`<config dir>/dataflow-shell/config.toml`),
//! `DATAFLOW_*` environment overrides and command-line overrides. The
//! configuration is read-only at runtime.

mod settings;

pub use settings::*;
