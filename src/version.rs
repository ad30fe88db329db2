//! Protocol revision compatibility between shell and server
//!
//! The server advertises an integer API revision in its root resource. The
//! shell is built against exactly one revision and refuses to operate against
//! any other.

/// REST API revision this shell was built against
pub const CLIENT_API_REVISION: i32 = 14;

/// Returns `true` only when both revisions are identical.
///
/// There is no range tolerance: any drift (including a newer server) means one
/// side needs upgrading.
pub fn is_compatible(client_revision: i32, server_revision: i32) -> bool {
    client_revision == server_revision
}
