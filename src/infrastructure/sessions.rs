//! In-process session directory.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::SessionDirectory;

/// Tracks the skin id reported by each locally connected client.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionDirectory {
    sessions: Arc<DashMap<Uuid, String>>,
}

impl InMemorySessionDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers or replaces the session for `owner_id`.
    pub fn connect(&self, owner_id: Uuid, skin_id: impl Into<String>) {
        let skin_id = skin_id.into();
        debug!(%owner_id, skin_id = %skin_id, "Session connected");
        self.sessions.insert(owner_id, skin_id);
    }

    /// Forgets the session for `owner_id`, if any.
    pub fn disconnect(&self, owner_id: Uuid) {
        if self.sessions.remove(&owner_id).is_some() {
            debug!(%owner_id, "Session disconnected");
        }
    }

    /// Number of connected sessions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether no session is connected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl SessionDirectory for InMemorySessionDirectory {
    fn local_skin_id(&self, owner_id: Uuid) -> Option<String> {
        self.sessions.get(&owner_id).map(|entry| entry.value().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_and_disconnect() {
        let directory = InMemorySessionDirectory::new();
        let owner = Uuid::new_v4();

        assert_eq!(directory.local_skin_id(owner), None);

        directory.connect(owner, "skin-a");
        directory.connect(owner, "skin-b");
        assert_eq!(directory.local_skin_id(owner), Some("skin-b".to_string()));
        assert_eq!(directory.len(), 1);

        directory.disconnect(owner);
        assert!(directory.is_empty());
        assert_eq!(directory.local_skin_id(owner), None);
    }

    #[test]
    fn test_clones_share_sessions() {
        let directory = InMemorySessionDirectory::new();
        let other = directory.clone();
        let owner = Uuid::new_v4();

        other.connect(owner, "skin");
        assert!(directory.local_skin_id(owner).is_some());
    }
}
