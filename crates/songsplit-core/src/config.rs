//! Configuration management for songsplit

use crate::error::ConfigError;
use crate::markers::PLACEHOLDER_LINKS;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub download: DownloadConfig,
    pub clips: ClipsConfig,
    pub markers: MarkersConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Path to yt-dlp binary (auto-detected if not set)
    pub yt_dlp: Option<PathBuf>,
    /// Path to FFmpeg binary (auto-detected if not set)
    pub ffmpeg: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadConfig {
    /// Container of the audio-only stream to download
    pub container: String,
    /// Directory receiving the full-length audio file
    pub directory: PathBuf,
    /// Minimum delay between two progress notifications, in milliseconds
    pub progress_interval_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClipsConfig {
    /// Output format of the clips: mp3, flac, wav, m4a or opus
    pub format: String,
    /// File name prefix, followed by the 1-based clip number
    pub prefix: String,
    /// Directory receiving the clips
    pub directory: PathBuf,
    /// Write album/track/title tags into each clip
    pub tag_metadata: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkersConfig {
    /// CSS selector matching the elements whose text is a timestamp
    pub selector: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Page fetch timeout in seconds
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            download: DownloadConfig {
                container: "m4a".to_string(),
                directory: PathBuf::from("."),
                progress_interval_ms: 1000,
            },
            clips: ClipsConfig {
                format: "mp3".to_string(),
                prefix: "clip".to_string(),
                directory: PathBuf::from("."),
                tag_metadata: true,
            },
            markers: MarkersConfig {
                selector: PLACEHOLDER_LINKS.to_string(),
            },
            http: HttpConfig {
                timeout_secs: 30,
                user_agent: concat!("songsplit/", env!("CARGO_PKG_VERSION")).to_string(),
            },
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // Load from default config directory
        if let Some(path) = Self::default_path() {
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
            }
        }

        // Load from specified config file
        if let Some(path) = config_file {
            if !path.exists() {
                return Err(ConfigError::LoadError(format!(
                    "{} does not exist",
                    path.display()
                )));
            }
            figment = figment.merge(Toml::file(path));
        }

        // Nested keys use a double underscore: SONGSPLIT_CLIPS__FORMAT=flac
        figment = figment.merge(Env::prefixed("SONGSPLIT_").split("__"));

        figment.extract().map_err(|e| ConfigError::LoadError(e.to_string()))
    }

    /// Per-user config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("songsplit/config.toml"))
    }

    /// Get yt-dlp path, auto-detecting if not configured
    pub fn yt_dlp_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.yt_dlp {
            Ok(path.clone())
        } else {
            which::which("yt-dlp")
                .map_err(|_| ConfigError::InvalidValue("yt-dlp not found in PATH".to_string()))
        }
    }

    /// Get FFmpeg path, auto-detecting if not configured
    pub fn ffmpeg_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(ref path) = self.paths.ffmpeg {
            Ok(path.clone())
        } else {
            which::which("ffmpeg")
                .map_err(|_| ConfigError::InvalidValue("ffmpeg not found in PATH".to_string()))
        }
    }

    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.download.progress_interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}
