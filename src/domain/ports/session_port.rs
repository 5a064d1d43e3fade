//! Port definition for looking up connected player sessions.

use uuid::Uuid;

/// Directory of sessions owned by the surrounding protocol layer.
#[cfg_attr(test, mockall::automock)]
pub trait SessionDirectory: Send + Sync {
    /// Returns the skin id reported by a connected client, or `None` when no
    /// session exists for `owner_id`.
    fn local_skin_id(&self, owner_id: Uuid) -> Option<String>;
}
