use super::app_config::LogLevel;
use clap::Parser;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(
    name = "skincache",
    version,
    about = "Resolves and caches player skins and capes",
    long_about = None
)]
pub struct CliArgs {
    /// Player UUID.
    #[arg(value_name = "UUID")]
    pub uuid: Uuid,

    /// Player name, used by providers keyed by username.
    #[arg(short, long, default_value = "")]
    pub username: String,

    /// Skin texture URL, or `steve` / `alex`.
    #[arg(long, default_value = "")]
    pub skin_url: String,

    /// Cape texture URL.
    #[arg(long, default_value = "")]
    pub cape_url: String,

    /// The skin uses the slim arm model.
    #[arg(long)]
    pub slim: bool,

    /// Directory the resolved textures are written to.
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    pub out: PathBuf,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Query third-party cape providers.
    #[arg(long)]
    pub allow_third_party_capes: Option<bool>,

    /// Query third-party ears providers.
    #[arg(long)]
    pub allow_third_party_ears: Option<bool>,

    /// Days to keep cached images on disk.
    #[arg(long, value_name = "DAYS", allow_negative_numbers = true)]
    pub cache_images: Option<i64>,

    /// Disk cache directory.
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Directory holding the bundled default skins and geometry.
    #[arg(long, value_name = "DIR")]
    pub resource_dir: Option<PathBuf>,

    /// Fetch worker count.
    #[arg(long)]
    pub worker_threads: Option<usize>,
}
