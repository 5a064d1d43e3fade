//! Resolves everything needed to render a player.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::application::dto::{PlayerAppearance, SkinRequest};
use crate::application::services::{FetchMode, TextureService};
use crate::domain::entities::{BodyGeometry, CapeProvider};
use crate::domain::ports::SessionDirectory;
use crate::infrastructure::assets::{ALEX_KEY, STEVE_KEY};
use crate::infrastructure::image::await_with_default;

/// How long to wait for the official skin and cape before using defaults.
pub const DEFAULT_WAIT: Duration = Duration::from_secs(5);

/// Fetches a player's skin and cape, then fills gaps from third-party
/// providers.
#[derive(Clone)]
pub struct RequestSkinAndCapeUseCase {
    service: TextureService,
    sessions: Arc<dyn SessionDirectory>,
    wait: Duration,
}

impl RequestSkinAndCapeUseCase {
    /// Creates a new use case.
    #[must_use]
    pub fn new(service: TextureService, sessions: Arc<dyn SessionDirectory>) -> Self {
        Self {
            service,
            sessions,
            wait: DEFAULT_WAIT,
        }
    }

    /// Overrides the wait applied to the official skin and cape.
    #[must_use]
    pub const fn with_wait(mut self, wait: Duration) -> Self {
        self.wait = wait;
        self
    }

    /// Resolves skin, cape and geometry for `request`. Never fails; anything
    /// missing is replaced by its default.
    pub async fn execute(&self, request: SkinRequest) -> PlayerAppearance {
        let started = Instant::now();
        let owner_id = request.owner_id;

        let local_skin = if request.skin_url == STEVE_KEY || request.skin_url == ALEX_KEY {
            self.sessions.local_skin_id(owner_id)
        } else {
            None
        };
        let is_local = local_skin.is_some();
        let skin_key = local_skin.unwrap_or_else(|| request.skin_url.clone());
        debug!(%owner_id, skin = %skin_key, cape = %request.cape_url, "Requesting skin and cape");

        let (skin, cape) = tokio::join!(
            await_with_default(
                self.service.resolve_skin(owner_id, &skin_key, FetchMode::Background),
                self.service.empty_skin(),
                self.wait,
            ),
            await_with_default(
                self.service
                    .resolve_cape(&request.cape_url, CapeProvider::Minecraft, FetchMode::Background),
                self.service.empty_cape(),
                self.wait,
            ),
        );

        let cape = if is_local && cape.is_failed() {
            self.service.resolve_bedrock_cape(owner_id)
        } else {
            self.service
                .resolve_unofficial_cape(cape, owner_id, &request.username, FetchMode::Background)
                .await
        };

        let eared = self
            .service
            .resolve_unofficial_ears(Arc::clone(&skin), owner_id, &request.username, FetchMode::Background)
            .await;
        let skin = if eared.has_ears_overlay() && !skin.has_ears_overlay() {
            self.service.store_ear_skin(Arc::clone(&eared));
            self.service.store_ear_geometry(owner_id, request.slim);
            eared
        } else {
            skin
        };

        let geometry = self
            .service
            .resolve_body_geometry(owner_id, Arc::new(BodyGeometry::legacy(request.slim)));

        info!(
            %owner_id,
            username = %request.username,
            has_cape = !cape.is_failed(),
            ears = skin.has_ears_overlay(),
            elapsed_ms = started.elapsed().as_millis(),
            "Resolved skin and cape"
        );

        PlayerAppearance {
            skin,
            cape,
            geometry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::services::TextureServiceConfig;
    use crate::domain::entities::EarsProvider;
    use crate::domain::ports::mocks::{MockSessionDirectory, MockTextureSource};
    use crate::infrastructure::assets::fixtures;
    use crate::infrastructure::image::{FetchExecutor, TextureLoader, codec};
    use image::{Rgba, RgbaImage};
    use uuid::Uuid;

    const SKIN_URL: &str = "http://textures.minecraft.net/texture/abc";
    const CAPE_URL: &str = "http://textures.minecraft.net/texture/def";

    fn png(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
        codec::encode(&RgbaImage::from_pixel(width, height, Rgba(color))).unwrap()
    }

    fn use_case(
        source: MockTextureSource,
        sessions: MockSessionDirectory,
        config: TextureServiceConfig,
    ) -> (RequestSkinAndCapeUseCase, TextureService) {
        let loader = TextureLoader::new(Arc::new(source), None);
        let service = TextureService::new(
            Arc::new(fixtures::assets()),
            loader,
            FetchExecutor::new(4),
            config,
        );
        (
            RequestSkinAndCapeUseCase::new(service.clone(), Arc::new(sessions)),
            service,
        )
    }

    fn no_sessions() -> MockSessionDirectory {
        let mut sessions = MockSessionDirectory::new();
        sessions.expect_local_skin_id().never();
        sessions
    }

    #[tokio::test]
    async fn test_official_skin_and_cape() {
        let source = MockTextureSource::new()
            .with_response(SKIN_URL, png(64, 64, [5, 5, 5, 255]))
            .with_response(CAPE_URL, png(64, 32, [6, 6, 6, 255]));
        let (use_case, _) = use_case(source, no_sessions(), TextureServiceConfig::default());
        let owner = Uuid::new_v4();

        let appearance = use_case
            .execute(SkinRequest::new(owner, "Notch").with_skin(SKIN_URL).with_cape(CAPE_URL))
            .await;

        assert_eq!(appearance.skin.texture_key(), SKIN_URL);
        assert_eq!(appearance.skin.pixel_data()[0], 5);
        assert!(appearance.has_cape());
        assert!(appearance.geometry.is_default());
    }

    #[tokio::test]
    async fn test_local_session_skin_and_bedrock_cape() {
        let owner = Uuid::new_v4();
        let mut sessions = MockSessionDirectory::new();
        sessions
            .expect_local_skin_id()
            .withf(move |id| *id == owner)
            .times(1)
            .returning(|_| Some("bedrock-skin".to_string()));
        let (use_case, service) =
            use_case(MockTextureSource::new(), sessions, TextureServiceConfig::default());
        service.store_skin(owner, "bedrock-skin", vec![9u8; 64 * 64 * 4]);
        service.store_cape(owner, vec![3u8; 64 * 32 * 4]);

        let appearance = use_case
            .execute(SkinRequest::new(owner, "Steve").with_skin(STEVE_KEY))
            .await;

        assert_eq!(appearance.skin.texture_key(), "bedrock-skin");
        assert_eq!(appearance.cape.cape_id(), owner.to_string());
    }

    #[tokio::test]
    async fn test_synthetic_key_without_session_uses_permanent_skin() {
        let mut sessions = MockSessionDirectory::new();
        sessions.expect_local_skin_id().returning(|_| None);
        let (use_case, _) =
            use_case(MockTextureSource::new(), sessions, TextureServiceConfig::default());

        let appearance = use_case
            .execute(SkinRequest::new(Uuid::new_v4(), "Alex").with_skin(ALEX_KEY).slim())
            .await;

        assert_eq!(appearance.skin.texture_key(), ALEX_KEY);
        assert!(!appearance.has_cape());
        assert!(appearance.geometry.name().contains("customSlim"));
    }

    #[tokio::test]
    async fn test_slow_fetch_falls_back_to_default() {
        let source = MockTextureSource::new()
            .with_delay(Duration::from_millis(300))
            .with_response(SKIN_URL, png(64, 64, [5, 5, 5, 255]));
        let (use_case, service) = use_case(source, no_sessions(), TextureServiceConfig::default());
        let use_case = use_case.with_wait(Duration::from_millis(50));

        let appearance = use_case
            .execute(SkinRequest::new(Uuid::new_v4(), "Notch").with_skin(SKIN_URL))
            .await;

        assert!(Arc::ptr_eq(&appearance.skin, &service.empty_skin()));
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(service.cached_skin(SKIN_URL).is_some());
    }

    #[tokio::test]
    async fn test_ears_switch_geometry() {
        let owner = Uuid::new_v4();
        let ears_url = EarsProvider::MinecraftCapes.url_for(owner, "Notch");
        let source = MockTextureSource::new()
            .with_response(SKIN_URL, png(64, 64, [0, 0, 0, 0]))
            .with_response(&ears_url, png(14, 7, [200, 0, 0, 255]));
        let config = TextureServiceConfig {
            allow_third_party_ears: true,
            ..TextureServiceConfig::default()
        };
        let (use_case, service) = use_case(source, no_sessions(), config);

        let appearance = use_case
            .execute(SkinRequest::new(owner, "Notch").with_skin(SKIN_URL))
            .await;

        assert!(appearance.skin.has_ears_overlay());
        assert!(!appearance.geometry.is_default());
        assert!(appearance.geometry.name().contains("geometry.humanoid.ears"));
        assert!(service.cached_skin(SKIN_URL).unwrap().has_ears_overlay());
    }
}
