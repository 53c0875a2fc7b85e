//! Error types for songsplit-core

use std::time::Duration;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SongSplitError>;

#[derive(Error, Debug)]
pub enum SongSplitError {
    #[error("Could not resolve video: {0}")]
    Resolution(#[from] ResolutionError),

    #[error("Download failed: {0}")]
    Download(#[from] DownloadError),

    #[error("Could not fetch timestamps: {0}")]
    PageFetch(#[from] PageFetchError),

    #[error("Malformed timestamp: {0}")]
    Timestamp(#[from] TimestampError),

    #[error("Extraction failed: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("yt-dlp could not be started: {0}")]
    YtDlpSpawn(#[source] std::io::Error),

    #[error("yt-dlp failed with exit code {code:?}: {stderr}")]
    YtDlpFailed { code: Option<i32>, stderr: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Video unavailable or private: {0}")]
    VideoUnavailable(String),

    #[error("No audio-only stream in the {0} container")]
    NoAudioStream(String),

    #[error("Failed to parse metadata: {0}")]
    MetadataParse(String),
}

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("yt-dlp could not be started: {0}")]
    YtDlpSpawn(#[source] std::io::Error),

    #[error("yt-dlp failed with exit code: {0:?}")]
    YtDlpFailed(Option<i32>),

    #[error("Downloaded file is missing: {0}")]
    MissingOutput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum PageFetchError {
    #[error("Could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimestampError {
    #[error("{marker:?} is not a timestamp: {reason}")]
    Malformed { marker: String, reason: &'static str },
}

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("FFmpeg could not be started: {0}")]
    FfmpegSpawn(#[source] std::io::Error),

    #[error("FFmpeg failed with exit code {code:?} while writing clip {clip}")]
    FfmpegFailed { clip: usize, code: Option<i32> },

    #[error("Source audio not found: {0}")]
    SourceMissing(String),

    #[error("Could not determine the duration of {0}")]
    UnknownDuration(String),

    #[error("Clip {clip} starts at {start:?}, past the end of the audio ({duration:?})")]
    StartBeyondEnd {
        clip: usize,
        start: Duration,
        duration: Duration,
    },

    #[error("Clip {clip} is empty: it starts at {start:?} and ends at {end:?}")]
    EmptySegment {
        clip: usize,
        start: Duration,
        end: Duration,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {0}")]
    LoadError(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
