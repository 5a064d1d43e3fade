use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::Result;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use skincache::application::{
    PlayerAppearance, RequestSkinAndCapeUseCase, SkinRequest, TextureService,
};
use skincache::domain::entities::{CAPE_HEIGHT, CAPE_WIDTH, SKIN_WIDTH};
use skincache::infrastructure::image::codec;
use skincache::infrastructure::{
    AppConfig, CliArgs, DefaultAssets, DiskJanitor, DiskTextureCache, FetchExecutor,
    HttpTextureSource, InMemorySessionDirectory, StorageManager, TextureLoader,
};

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = &config.log_path {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(args: &CliArgs) -> Result<AppConfig> {
    let storage = StorageManager::new()?;
    let mut config = storage.load_config(args.config.as_deref())?;
    config.merge_with_args(args);
    Ok(config)
}

async fn create_service(config: &AppConfig) -> Result<(TextureService, Option<JoinHandle<()>>)> {
    let assets = Arc::new(DefaultAssets::load(&config.effective_resource_dir())?);
    let source = Arc::new(HttpTextureSource::new(
        &config.user_agent,
        Duration::from_secs(config.request_timeout_secs),
    )?);

    let disk_cache = match config.effective_cache_dir() {
        Some(dir) if config.disk_cache_enabled() => Some(Arc::new(DiskTextureCache::new(dir).await?)),
        None if config.disk_cache_enabled() => {
            warn!("No cache directory available, disk cache disabled");
            None
        }
        _ => None,
    };
    let janitor = disk_cache
        .as_ref()
        .and_then(|cache| DiskJanitor::for_days(cache.cache_dir().to_path_buf(), config.cache_images))
        .map(DiskJanitor::spawn);

    let executor = FetchExecutor::for_config(config.allow_third_party_capes, config.worker_threads);
    info!(
        workers = executor.workers(),
        disk_cache = disk_cache.is_some(),
        third_party_capes = config.allow_third_party_capes,
        third_party_ears = config.allow_third_party_ears,
        "Texture service ready"
    );

    let service = TextureService::new(
        assets,
        TextureLoader::new(source, disk_cache),
        executor,
        config.texture_service_config(),
    );
    Ok((service, janitor))
}

fn write_appearance(out: &Path, prefix: &str, appearance: &PlayerAppearance) -> Result<()> {
    std::fs::create_dir_all(out)?;

    let skin = &appearance.skin;
    let raster = codec::to_raster(skin.pixel_data(), SKIN_WIDTH, skin.height())?;
    let skin_path = out.join(format!("{prefix}_skin.png"));
    std::fs::write(&skin_path, codec::encode(&raster)?)?;
    info!(path = %skin_path.display(), key = skin.texture_key(), "Wrote skin");

    if appearance.has_cape() {
        let raster = codec::to_raster(appearance.cape.pixel_data(), CAPE_WIDTH, CAPE_HEIGHT)?;
        let cape_path = out.join(format!("{prefix}_cape.png"));
        std::fs::write(&cape_path, codec::encode(&raster)?)?;
        info!(path = %cape_path.display(), key = appearance.cape.key(), "Wrote cape");
    }

    if !appearance.geometry.is_default() {
        let geometry_path = out.join(format!("{prefix}_geometry.json"));
        std::fs::write(&geometry_path, appearance.geometry.geometry_json())?;
        info!(path = %geometry_path.display(), "Wrote geometry");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    init_logging(&config)?;

    info!(version = skincache::VERSION, "Starting skincache");

    let (service, janitor) = create_service(&config).await?;
    let use_case =
        RequestSkinAndCapeUseCase::new(service.clone(), Arc::new(InMemorySessionDirectory::new()));

    let mut request = SkinRequest::new(args.uuid, args.username.as_str())
        .with_skin(args.skin_url.as_str())
        .with_cape(args.cape_url.as_str());
    if args.slim {
        request = request.slim();
    }

    let appearance = use_case.execute(request).await;
    write_appearance(&args.out, &args.uuid.to_string(), &appearance)?;

    let (skins, capes) = service.cache_stats();
    info!(%skins, %capes, "Done");

    if let Some(janitor) = janitor {
        janitor.abort();
    }

    Ok(())
}
