use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ServerConfigFile {
    pub port: Option<u16>,
    pub static_dir: Option<String>,
    pub cache_max_age: Option<u64>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BlobConfigFile {
    pub api_url: Option<String>,
    pub prefix: Option<String>,
    pub extension: Option<String>,
    pub page_limit: Option<u32>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LibraryConfigFile {
    pub videos_dir: Option<String>,
    pub compressed_dir: Option<String>,
    pub manifest_path: Option<String>,
    pub storage_quota_bytes: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FfmpegConfig {
    /// Output height; width follows the aspect ratio.
    pub max_height: u32,
    /// Constant rate factor, lower is better quality.
    pub crf: u8,
    pub preset: String,
    /// Audio bitrate in kbps.
    pub audio_bitrate: u32,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            max_height: 720,
            crf: 28,
            preset: "medium".to_string(),
            audio_bitrate: 128,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub server: ServerConfigFile,
    #[serde(default)]
    pub blob: BlobConfigFile,
    #[serde(default)]
    pub library: LibraryConfigFile,
    #[serde(default)]
    pub ffmpeg: Option<FfmpegConfig>,
}

pub const DEFAULT_BLOB_API_URL: &str = "https://blob.vercel-storage.com";
pub const DEFAULT_PREFIX: &str = "videos/";
pub const DEFAULT_EXTENSION: &str = ".mp4";
/// Vercel Blob caps a single list call at 1000 entries.
pub const MAX_PAGE_LIMIT: u32 = 1000;

#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub static_dir: Option<PathBuf>,
    pub cache_max_age: u64,
    /// Read-write token for the blob store. Checked where it is used.
    pub blob_token: Option<String>,
    pub blob_api_url: String,
    pub prefix: String,
    pub extension: String,
    pub page_limit: u32,
    pub videos_dir: PathBuf,
    pub compressed_dir: PathBuf,
    pub manifest_path: PathBuf,
    pub storage_quota_bytes: u64,
    pub ffmpeg: FfmpegConfig,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

        // .env.local wins over .env since dotenvy never overwrites
        let _ = dotenvy::from_path(base_dir.join(".env.local"));
        let _ = dotenvy::dotenv();

        let config_path = base_dir.join("config.toml");
        let config_file = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str::<ConfigFile>(&content)?
        } else {
            ConfigFile::default()
        };

        Ok(Self::resolve(&base_dir, config_file, |key| std::env::var(key).ok()))
    }

    /// Merge defaults, the config file and environment values (env wins).
    pub fn resolve<F>(base_dir: &Path, file: ConfigFile, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default_in(base_dir);

        let port = env("PORT")
            .and_then(|p| p.parse().ok())
            .or(file.server.port)
            .unwrap_or(defaults.port);

        let static_dir = env("STATIC_DIR")
            .or(file.server.static_dir)
            .map(|dir| resolve_dir(base_dir, &dir));

        let cache_max_age = file.server.cache_max_age.unwrap_or(defaults.cache_max_age);

        let blob_token = env("BLOB_READ_WRITE_TOKEN").filter(|t| !t.trim().is_empty());

        let blob_api_url = env("BLOB_API_URL")
            .or(file.blob.api_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or(defaults.blob_api_url);

        let prefix = env("VIDEOS_PREFIX")
            .or(file.blob.prefix)
            .unwrap_or(defaults.prefix);

        let extension = file.blob.extension.unwrap_or(defaults.extension);

        let page_limit = file
            .blob
            .page_limit
            .filter(|&limit| limit > 0)
            .map(|limit| limit.min(MAX_PAGE_LIMIT))
            .unwrap_or(defaults.page_limit);

        let videos_dir = env("VIDEOS_DIR")
            .or(file.library.videos_dir)
            .map(|dir| resolve_dir(base_dir, &dir))
            .unwrap_or(defaults.videos_dir);

        let compressed_dir = env("COMPRESSED_DIR")
            .or(file.library.compressed_dir)
            .map(|dir| resolve_dir(base_dir, &dir))
            .unwrap_or(defaults.compressed_dir);

        let manifest_path = file
            .library
            .manifest_path
            .map(|path| resolve_dir(base_dir, &path))
            .unwrap_or(defaults.manifest_path);

        let storage_quota_bytes = file
            .library
            .storage_quota_bytes
            .unwrap_or(defaults.storage_quota_bytes);

        let ffmpeg = file.ffmpeg.unwrap_or(defaults.ffmpeg);

        Self {
            port,
            static_dir,
            cache_max_age,
            blob_token,
            blob_api_url,
            prefix,
            extension,
            page_limit,
            videos_dir,
            compressed_dir,
            manifest_path,
            storage_quota_bytes,
            ffmpeg,
        }
    }

    fn default_in(base_dir: &Path) -> Self {
        Self {
            port: 4321,
            static_dir: None,
            cache_max_age: 3600,
            blob_token: None,
            blob_api_url: DEFAULT_BLOB_API_URL.to_string(),
            prefix: DEFAULT_PREFIX.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            page_limit: MAX_PAGE_LIMIT,
            videos_dir: base_dir.join("src/assets/videos"),
            compressed_dir: base_dir.join("src/assets/videos-compressed"),
            manifest_path: base_dir.join("scripts/uploaded-videos.json"),
            storage_quota_bytes: 1024 * 1024 * 1024,
            ffmpeg: FfmpegConfig::default(),
        }
    }

    pub fn from_env() -> Self {
        Self::load().unwrap_or_else(|e| {
            eprintln!("Warning: Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        let base_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::default_in(&base_dir)
    }
}

fn resolve_dir(base_dir: &Path, dir: &str) -> PathBuf {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        path
    } else {
        base_dir.join(path)
    }
}
