//! Target session module
//!
//! Holds what the shell is currently pointed at:
//! - `TargetSession` - URI, resolved links and last error of the latest attempt
//! - `TargetHolder` - shared, lock-guarded handle to the session

mod holder;
mod types;

pub use holder::*;
pub use types::*;
