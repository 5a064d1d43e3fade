//! Player appearance DTOs.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{BodyGeometry, Cape, Skin};

/// Textures announced for a player.
#[derive(Debug, Clone)]
pub struct SkinRequest {
    /// Player the textures belong to.
    pub owner_id: Uuid,
    /// Player name, used by providers keyed by username.
    pub username: String,
    /// Official skin URL or synthetic `steve` / `alex` key.
    pub skin_url: String,
    /// Official cape URL, empty when the player has none.
    pub cape_url: String,
    /// Whether the skin uses the slim arm model.
    pub slim: bool,
}

impl SkinRequest {
    /// Creates a request for a player with the default skin and no cape.
    #[must_use]
    pub fn new(owner_id: Uuid, username: impl Into<String>) -> Self {
        Self {
            owner_id,
            username: username.into(),
            skin_url: String::new(),
            cape_url: String::new(),
            slim: false,
        }
    }

    /// Sets the skin URL.
    #[must_use]
    pub fn with_skin(mut self, skin_url: impl Into<String>) -> Self {
        self.skin_url = skin_url.into();
        self
    }

    /// Sets the cape URL.
    #[must_use]
    pub fn with_cape(mut self, cape_url: impl Into<String>) -> Self {
        self.cape_url = cape_url.into();
        self
    }

    /// Marks the skin as using the slim arm model.
    #[must_use]
    pub const fn slim(mut self) -> Self {
        self.slim = true;
        self
    }
}

/// Resolved textures for a player.
#[derive(Debug, Clone)]
pub struct PlayerAppearance {
    /// Skin, with ears composited when a provider had them.
    pub skin: Arc<Skin>,
    /// Official or third-party cape.
    pub cape: Arc<Cape>,
    /// Geometry matching the skin.
    pub geometry: Arc<BodyGeometry>,
}

impl PlayerAppearance {
    /// Returns true if the player wears a cape.
    #[must_use]
    pub fn has_cape(&self) -> bool {
        !self.cape.is_failed()
    }
}
