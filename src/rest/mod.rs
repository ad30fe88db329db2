//! REST access to the Data Flow server's root resource
//!
//! - [`RootResource`] - the hypermedia capability document
//! - [`RootResourceClient`] - transport seam, with the reqwest-backed [`HttpRootClient`]
//! - [`ServerConnector`] - one classified connection attempt

mod client;
mod connector;
mod resource;

pub use client::*;
pub use connector::*;
pub use resource::*;
