//! Two-tier texture cache engine.
//!
//! Resolves skins, capes, ears and body geometry. Lookups go
//! permanent assets -> memory -> disk -> network, and at most one fetch per
//! key is in flight at any time: concurrent callers join the pending one.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use crate::domain::entities::{BodyGeometry, Cape, CapeProvider, EarsProvider, Skin};
use crate::infrastructure::assets::DefaultAssets;
use crate::infrastructure::image::memory_cache::{DEFAULT_CACHE_SIZE, DEFAULT_TTL};
use crate::infrastructure::image::{
    CacheStats, FetchExecutor, MemoryTextureCache, Pending, TextureKind, TextureLoader,
    await_with_default, codec, deferred, resolved,
};

use super::provider_fallback::first_success;

/// Bounded wait applied to each third-party provider query.
pub const PROVIDER_TIMEOUT: Duration = Duration::from_secs(4);

const BEDROCK_CAPE_SUFFIX: &str = ".Bedrock";
const FAILED_SKIN_KEY: &str = "empty";

/// Where a cache miss is fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// On the task awaiting the result, without joining the in-flight table.
    Blocking,
    /// On the fetch executor, shared with every concurrent caller.
    #[default]
    Background,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct TextureServiceConfig {
    /// Query third-party cape providers when the official cape is missing.
    pub allow_third_party_capes: bool,
    /// Query third-party ears providers.
    pub allow_third_party_ears: bool,
    /// Idle time after which a memory entry expires.
    pub memory_ttl: Duration,
    /// Maximum entries per memory cache.
    pub memory_capacity: usize,
    /// Bounded wait per provider query.
    pub provider_timeout: Duration,
}

impl Default for TextureServiceConfig {
    fn default() -> Self {
        Self {
            allow_third_party_capes: false,
            allow_third_party_ears: false,
            memory_ttl: DEFAULT_TTL,
            memory_capacity: DEFAULT_CACHE_SIZE,
            provider_timeout: PROVIDER_TIMEOUT,
        }
    }
}

/// Pending fetches keyed by texture key.
struct InFlight<T> {
    requests: DashMap<String, Pending<T>>,
}

impl<T: Clone + Send + Sync + 'static> InFlight<T> {
    fn new() -> Self {
        Self {
            requests: DashMap::new(),
        }
    }

    fn get(&self, key: &str) -> Option<Pending<T>> {
        self.requests.get(key).map(|pending| pending.value().clone())
    }

    /// Joins the fetch registered for `key`, or registers the one produced by
    /// `start`. The map shard stays locked between the check and the insert.
    fn join_or_start(
        &self,
        key: &str,
        cached: impl FnOnce() -> Option<T>,
        start: impl FnOnce() -> Pending<T>,
    ) -> Pending<T> {
        match self.requests.entry(key.to_string()) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                if let Some(value) = cached() {
                    return resolved(value);
                }
                let pending = start();
                entry.insert(pending.clone());
                pending
            }
        }
    }

    fn complete(&self, key: &str) {
        self.requests.remove(key);
    }

    fn len(&self) -> usize {
        self.requests.len()
    }
}

/// Frees an in-flight key when dropped, including when the fetch holding it
/// panics or is aborted.
struct Completion<T: Clone + Send + Sync + 'static> {
    table: Arc<InFlight<T>>,
    key: String,
}

impl<T: Clone + Send + Sync + 'static> Completion<T> {
    fn new(table: &Arc<InFlight<T>>, key: &str) -> Self {
        Self {
            table: Arc::clone(table),
            key: key.to_string(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Drop for Completion<T> {
    fn drop(&mut self) {
        self.table.complete(&self.key);
    }
}

/// Awaits an executor handle, turning a lost task into `fallback`.
async fn recover<T>(handle: Pending<T>, fallback: T) -> T
where
    T: Clone + Send + Sync + 'static,
{
    handle.await.unwrap_or_else(|e| {
        warn!(error = %e, "Fetch task lost, using fallback");
        fallback
    })
}

struct Inner {
    assets: Arc<DefaultAssets>,
    loader: TextureLoader,
    executor: FetchExecutor,
    config: TextureServiceConfig,
    empty_cape: Arc<Cape>,
    skins: MemoryTextureCache<Arc<Skin>>,
    capes: MemoryTextureCache<Arc<Cape>>,
    geometry: DashMap<Uuid, Arc<BodyGeometry>>,
    requested_skins: Arc<InFlight<Arc<Skin>>>,
    requested_capes: Arc<InFlight<Arc<Cape>>>,
}

impl Inner {
    fn cached_skin(&self, key: &str) -> Option<Arc<Skin>> {
        self.assets
            .permanent_skin(key)
            .or_else(|| self.skins.get(key))
    }

    async fn supply_skin(&self, owner_id: Uuid, key: &str, mode: FetchMode) -> Arc<Skin> {
        let started = Instant::now();
        match self.loader.request_image(key, TextureKind::Skin).await {
            Ok(raster) => {
                let mut skin = Skin::new(owner_id, key, codec::to_rgba_buffer(raster));
                if mode == FetchMode::Background {
                    skin = skin.refreshed();
                }
                let skin = Arc::new(skin);
                self.skins.put(key, Arc::clone(&skin));
                debug!(key, elapsed_ms = started.elapsed().as_millis(), "Fetched skin");
                skin
            }
            Err(e) => {
                debug!(key, error = %e, "Skin fetch failed, using default");
                self.failed_skin(owner_id)
            }
        }
    }

    fn failed_skin(&self, owner_id: Uuid) -> Arc<Skin> {
        let fallback = self.assets.empty_skin();
        Arc::new(Skin::new(
            owner_id,
            FAILED_SKIN_KEY,
            fallback.pixel_data().clone(),
        ))
    }

    async fn supply_cape(&self, key: &str, provider: CapeProvider) -> Arc<Cape> {
        let started = Instant::now();
        match self
            .loader
            .request_image(key, TextureKind::Cape(provider))
            .await
        {
            Ok(raster) => {
                let cape = Arc::new(Cape::fetched(key, codec::to_rgba_buffer(raster)));
                self.capes.put(key, Arc::clone(&cape));
                debug!(key, %provider, elapsed_ms = started.elapsed().as_millis(), "Fetched cape");
                cape
            }
            Err(e) => {
                debug!(key, %provider, error = %e, "Cape fetch failed");
                Arc::new(Cape::failed(key))
            }
        }
    }

    async fn supply_ears(&self, skin: Arc<Skin>, url: &str) -> Arc<Skin> {
        let composed = match self.loader.request_overlay(url).await {
            Ok(ears) => codec::apply_ears(skin.pixel_data(), &ears),
            Err(e) => Err(e),
        };
        match composed {
            Ok(pixels) => {
                debug!(url, key = skin.texture_key(), "Applied ears overlay");
                Arc::new(skin.with_ears(pixels))
            }
            Err(e) => {
                trace!(url, error = %e, "No ears applied");
                skin
            }
        }
    }
}

/// Texture cache engine. Cheap to clone; clones share all state.
#[derive(Clone)]
pub struct TextureService {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for TextureService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureService")
            .field("config", &self.inner.config)
            .field("in_flight", &self.in_flight())
            .finish_non_exhaustive()
    }
}

impl TextureService {
    /// Creates an engine with empty caches.
    #[must_use]
    pub fn new(
        assets: Arc<DefaultAssets>,
        loader: TextureLoader,
        executor: FetchExecutor,
        config: TextureServiceConfig,
    ) -> Self {
        let inner = Inner {
            assets,
            loader,
            executor,
            empty_cape: Arc::new(Cape::empty()),
            skins: MemoryTextureCache::new(config.memory_capacity, config.memory_ttl),
            capes: MemoryTextureCache::new(config.memory_capacity, config.memory_ttl),
            geometry: DashMap::new(),
            requested_skins: Arc::new(InFlight::new()),
            requested_capes: Arc::new(InFlight::new()),
            config,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Returns the engine configuration.
    #[must_use]
    pub fn config(&self) -> &TextureServiceConfig {
        &self.inner.config
    }

    /// The default skin served for empty or failed requests.
    #[must_use]
    pub fn empty_skin(&self) -> Arc<Skin> {
        self.inner.assets.empty_skin()
    }

    /// The canonical empty cape.
    #[must_use]
    pub fn empty_cape(&self) -> Arc<Cape> {
        Arc::clone(&self.inner.empty_cape)
    }

    /// Resolves the skin at `texture_key`.
    ///
    /// Never fails: a fetch that produces no data resolves to the default
    /// skin, which is not cached.
    #[must_use]
    pub fn resolve_skin(&self, owner_id: Uuid, texture_key: &str, mode: FetchMode) -> Pending<Arc<Skin>> {
        if texture_key.is_empty() {
            return resolved(self.empty_skin());
        }
        if let Some(pending) = self.inner.requested_skins.get(texture_key) {
            return pending;
        }
        if let Some(skin) = self.inner.cached_skin(texture_key) {
            return resolved(skin);
        }

        let inner = Arc::clone(&self.inner);
        let key = texture_key.to_string();
        match mode {
            FetchMode::Blocking => {
                deferred(async move { inner.supply_skin(owner_id, &key, mode).await })
            }
            FetchMode::Background => self.inner.requested_skins.join_or_start(
                texture_key,
                || self.inner.skins.peek(texture_key),
                || {
                    let completion = Completion::new(&self.inner.requested_skins, texture_key);
                    let failed = self.inner.failed_skin(owner_id);
                    let handle = self.inner.executor.spawn(async move {
                        let _completion = completion;
                        inner.supply_skin(owner_id, &key, mode).await
                    });
                    deferred(recover(handle, failed))
                },
            ),
        }
    }

    /// Resolves the cape at `cape_key` from `provider`.
    ///
    /// Never fails: a fetch that produces no data resolves to a failed cape,
    /// which is not cached.
    #[must_use]
    pub fn resolve_cape(&self, cape_key: &str, provider: CapeProvider, mode: FetchMode) -> Pending<Arc<Cape>> {
        if cape_key.is_empty() {
            return resolved(self.empty_cape());
        }
        if let Some(pending) = self.inner.requested_capes.get(cape_key) {
            return pending;
        }
        if let Some(cape) = self.inner.capes.get(cape_key) {
            return resolved(cape);
        }

        let inner = Arc::clone(&self.inner);
        let key = cape_key.to_string();
        match mode {
            FetchMode::Blocking => deferred(async move { inner.supply_cape(&key, provider).await }),
            FetchMode::Background => self.inner.requested_capes.join_or_start(
                cape_key,
                || self.inner.capes.peek(cape_key),
                || {
                    let completion = Completion::new(&self.inner.requested_capes, cape_key);
                    let failed = Arc::new(Cape::failed(cape_key));
                    let handle = self.inner.executor.spawn(async move {
                        let _completion = completion;
                        inner.supply_cape(&key, provider).await
                    });
                    deferred(recover(handle, failed))
                },
            ),
        }
    }

    /// Replaces a failed official cape with the first cape found among the
    /// third-party providers, in priority order.
    pub async fn resolve_unofficial_cape(
        &self,
        official: Arc<Cape>,
        owner_id: Uuid,
        username: &str,
        mode: FetchMode,
    ) -> Arc<Cape> {
        if !official.is_failed() || !self.inner.config.allow_third_party_capes {
            return official;
        }

        let timeout = self.inner.config.provider_timeout;
        let candidates = CapeProvider::THIRD_PARTY
            .into_iter()
            .filter_map(|provider| provider.url_for(owner_id, username).map(|url| (provider, url)));
        let found = first_success(
            candidates,
            |(provider, url)| {
                await_with_default(
                    self.resolve_cape(&url, provider, mode),
                    self.empty_cape(),
                    timeout,
                )
            },
            |cape| !cape.is_failed(),
        )
        .await;

        found.unwrap_or(official)
    }

    /// Fetches the ears texture at `ears_url` and draws it onto `skin`.
    /// Any failure resolves to `skin` unchanged.
    #[must_use]
    pub fn resolve_ears(&self, ears_url: &str, skin: Arc<Skin>, mode: FetchMode) -> Pending<Arc<Skin>> {
        if ears_url.is_empty() {
            return resolved(skin);
        }
        let inner = Arc::clone(&self.inner);
        let url = ears_url.to_string();
        let unchanged = Arc::clone(&skin);
        let work = async move { inner.supply_ears(skin, &url).await };
        match mode {
            FetchMode::Blocking => deferred(work),
            FetchMode::Background => deferred(recover(self.inner.executor.spawn(work), unchanged)),
        }
    }

    /// Queries the ears providers in priority order and returns the first skin
    /// with an ears overlay, or `skin` when none has one.
    pub async fn resolve_unofficial_ears(
        &self,
        skin: Arc<Skin>,
        owner_id: Uuid,
        username: &str,
        mode: FetchMode,
    ) -> Arc<Skin> {
        if !self.inner.config.allow_third_party_ears {
            return skin;
        }

        let timeout = self.inner.config.provider_timeout;
        let found = first_success(
            EarsProvider::ALL,
            |provider| {
                await_with_default(
                    self.resolve_ears(&provider.url_for(owner_id, username), Arc::clone(&skin), mode),
                    Arc::clone(&skin),
                    timeout,
                )
            },
            |candidate| candidate.has_ears_overlay(),
        )
        .await;

        found.unwrap_or(skin)
    }

    /// Returns the cape pushed by a locally hosted client, or the empty cape.
    #[must_use]
    pub fn resolve_bedrock_cape(&self, owner_id: Uuid) -> Arc<Cape> {
        self.inner
            .capes
            .get(&bedrock_cape_key(owner_id))
            .unwrap_or_else(|| self.empty_cape())
    }

    /// Returns the geometry stored for `owner_id`, or `fallback`.
    #[must_use]
    pub fn resolve_body_geometry(&self, owner_id: Uuid, fallback: Arc<BodyGeometry>) -> Arc<BodyGeometry> {
        self.inner
            .geometry
            .get(&owner_id)
            .map_or(fallback, |geometry| Arc::clone(geometry.value()))
    }

    /// Seeds the cache with a skin received from a locally hosted client.
    pub fn store_skin(&self, owner_id: Uuid, skin_id: &str, pixel_data: impl Into<Bytes>) {
        let skin = Skin::new(owner_id, skin_id, pixel_data).refreshed();
        self.inner.skins.put(skin_id, Arc::new(skin));
    }

    /// Seeds the cache with a cape received from a locally hosted client.
    pub fn store_cape(&self, owner_id: Uuid, pixel_data: impl Into<Bytes>) {
        let key = bedrock_cape_key(owner_id);
        let cape = Cape::with_id(key.clone(), owner_id.to_string(), pixel_data);
        self.inner.capes.put(key, Arc::new(cape));
    }

    /// Records the geometry received from a locally hosted client.
    pub fn store_geometry(&self, owner_id: Uuid, name: impl Into<String>, geometry_json: impl Into<String>) {
        let geometry = BodyGeometry::new(name, geometry_json, false);
        self.inner.geometry.insert(owner_id, Arc::new(geometry));
    }

    /// Caches a skin that had ears composited onto it.
    pub fn store_ear_skin(&self, skin: Arc<Skin>) {
        let key = skin.texture_key().to_string();
        self.inner.skins.put(key, skin);
    }

    /// Switches `owner_id` to the ears geometry.
    pub fn store_ear_geometry(&self, owner_id: Uuid, slim: bool) {
        let geometry = self.inner.assets.ears_geometry(slim);
        self.inner.geometry.insert(owner_id, Arc::new(geometry));
    }

    /// Returns the permanent or memory-cached skin for `key`.
    #[must_use]
    pub fn cached_skin(&self, key: &str) -> Option<Arc<Skin>> {
        self.inner.cached_skin(key)
    }

    /// Returns the memory-cached cape for `key`, or the empty cape.
    #[must_use]
    pub fn cached_cape(&self, key: &str) -> Arc<Cape> {
        self.inner
            .capes
            .get(key)
            .unwrap_or_else(|| self.empty_cape())
    }

    /// Returns true if a cape for `key` is in memory.
    #[must_use]
    pub fn has_cape_cached(&self, key: &str) -> bool {
        self.inner.capes.peek(key).is_some()
    }

    /// Number of fetches currently in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.inner.requested_skins.len() + self.inner.requested_capes.len()
    }

    /// Memory cache statistics for skins and capes.
    #[must_use]
    pub fn cache_stats(&self) -> (CacheStats, CacheStats) {
        (self.inner.skins.stats(), self.inner.capes.stats())
    }
}

fn bedrock_cape_key(owner_id: Uuid) -> String {
    format!("{owner_id}{BEDROCK_CAPE_SUFFIX}")
}
