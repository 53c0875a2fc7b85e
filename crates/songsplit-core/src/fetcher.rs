//! Audio stream retrieval using yt-dlp

use crate::error::{DownloadError, ResolutionError};
use crate::metadata::sanitize_filename;
use crate::progress::{
    parse_progress_line, progress_template, DownloadProgress, ProgressThrottle,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// The audio-only stream chosen for a video
#[derive(Debug, Clone, PartialEq)]
pub struct AudioAsset {
    pub url: String,
    pub title: String,
    pub format_id: String,
    pub container: String,
    pub size_bytes: Option<u64>,
    pub local_filename: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamFormat {
    pub format_id: String,
    #[serde(default)]
    pub ext: String,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    #[serde(default)]
    pub abr: Option<f64>,
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    #[serde(default)]
    pub filesize_approx: Option<u64>,
}

impl StreamFormat {
    pub fn is_audio_only(&self) -> bool {
        let none = |codec: &Option<String>| codec.as_deref() == Some("none");
        none(&self.vcodec) && self.acodec.is_some() && !none(&self.acodec)
    }

    fn bitrate(&self) -> f64 {
        self.abr.or(self.tbr).unwrap_or(0.0)
    }

    pub fn size(&self) -> Option<u64> {
        self.filesize.or(self.filesize_approx)
    }
}

/// Highest-bitrate audio-only stream stored in `container`
pub fn select_audio_stream<'a>(info: &'a VideoInfo, container: &str) -> Option<&'a StreamFormat> {
    info.formats
        .iter()
        .filter(|f| f.is_audio_only() && f.ext.eq_ignore_ascii_case(container))
        .max_by(|a, b| a.bitrate().total_cmp(&b.bitrate()))
}

/// yt-dlp expands `%(...)s` in output paths; keep a literal path literal
fn escape_output_template(path: &Path) -> String {
    path.to_string_lossy().replace('%', "%%")
}

#[derive(Debug)]
pub struct MediaFetcher {
    yt_dlp_path: PathBuf,
    output_dir: PathBuf,
    container: String,
    progress_interval: Duration,
}

impl MediaFetcher {
    pub fn new(
        yt_dlp_path: PathBuf,
        output_dir: PathBuf,
        container: impl Into<String>,
        progress_interval: Duration,
    ) -> Self {
        Self {
            yt_dlp_path,
            output_dir,
            container: container.into(),
            progress_interval,
        }
    }

    /// Look the video up and pick the audio stream to download
    pub async fn resolve(&self, url: &str) -> Result<AudioAsset, ResolutionError> {
        info!("Resolving {}", url);

        let output = Command::new(&self.yt_dlp_path)
            .args(["--dump-single-json", "--no-playlist", "--no-warnings", "--", url])
            .output()
            .await
            .map_err(ResolutionError::YtDlpSpawn)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr: {}", stderr);

            if stderr.contains("Video unavailable") || stderr.contains("Private video") {
                return Err(ResolutionError::VideoUnavailable(url.to_string()));
            }
            if stderr.contains("is not a valid URL") || stderr.contains("Unsupported URL") {
                return Err(ResolutionError::InvalidUrl(url.to_string()));
            }

            return Err(ResolutionError::YtDlpFailed {
                code: output.status.code(),
                stderr: stderr.trim().to_string(),
            });
        }

        let info: VideoInfo = serde_json::from_slice(&output.stdout)
            .map_err(|e| ResolutionError::MetadataParse(e.to_string()))?;

        self.asset_from_info(url, &info)
    }

    fn asset_from_info(&self, url: &str, info: &VideoInfo) -> Result<AudioAsset, ResolutionError> {
        let stream = select_audio_stream(info, &self.container)
            .ok_or_else(|| ResolutionError::NoAudioStream(self.container.clone()))?;

        let file_name = format!("{}.{}", sanitize_filename(&info.title), self.container);

        debug!(
            "Selected format {} for {} ({} kbps)",
            stream.format_id,
            info.id,
            stream.bitrate()
        );

        Ok(AudioAsset {
            url: url.to_string(),
            title: info.title.clone(),
            format_id: stream.format_id.clone(),
            container: self.container.clone(),
            size_bytes: stream.size(),
            local_filename: self.output_dir.join(file_name),
        })
    }

    /// Download the stream, overwriting any previous file.
    ///
    /// `on_progress` receives throttled updates, then one closing update with the size on disk
    /// unless that exact update was the last one sent.
    pub async fn download<F>(
        &self,
        asset: &AudioAsset,
        mut on_progress: F,
    ) -> Result<(), DownloadError>
    where
        F: FnMut(DownloadProgress),
    {
        info!("Downloading \"{}\" to {}", asset.title, asset.local_filename.display());

        if let Some(parent) = asset.local_filename.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut child = Command::new(&self.yt_dlp_path)
            .args(["-f", asset.format_id.as_str()])
            .arg("-o")
            .arg(escape_output_template(&asset.local_filename))
            .args([
                "--no-playlist",
                "--force-overwrites",
                "--no-part",
                "--no-warnings",
                "--newline",
                "--progress-template",
                progress_template().as_str(),
                "--",
                asset.url.as_str(),
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(DownloadError::YtDlpSpawn)?;

        // yt-dlp blocks once a full stderr pipe goes unread
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf).await;
                buf
            })
        });

        let mut throttle = ProgressThrottle::new(self.progress_interval);
        let mut last_emitted = None;

        if let Some(stdout) = child.stdout.take() {
            let mut lines = BufReader::new(stdout).lines();
            while let Some(line) = lines.next_line().await? {
                let Some(mut progress) = parse_progress_line(&line) else {
                    continue;
                };
                if progress.total.is_none() {
                    progress.total = asset.size_bytes;
                }
                if throttle.should_emit() {
                    on_progress(progress);
                    last_emitted = Some(progress);
                }
            }
        }

        let status = child.wait().await?;
        let stderr = match stderr_task {
            Some(task) => task.await.unwrap_or_default(),
            None => Vec::new(),
        };
        if !status.success() {
            debug!("yt-dlp stderr: {}", String::from_utf8_lossy(&stderr));
            return Err(DownloadError::YtDlpFailed(status.code()));
        }

        if !asset.local_filename.exists() {
            return Err(DownloadError::MissingOutput(
                asset.local_filename.display().to_string(),
            ));
        }

        // yt-dlp does not always print a line for the last chunk
        let size = tokio::fs::metadata(&asset.local_filename).await?.len();
        let done = DownloadProgress {
            downloaded: size,
            total: Some(size),
        };
        if last_emitted != Some(done) {
            on_progress(done);
        }
        if let Some(expected) = asset.size_bytes.filter(|expected| *expected != size) {
            warn!("Expected {} bytes but downloaded {}", expected, size);
        }

        debug!("Downloaded: {}", asset.local_filename.display());
        Ok(())
    }
}

/// Validate that a string looks like a YouTube URL
pub fn validate_youtube_url(url: &str) -> bool {
    url.contains("youtube.com/watch")
        || url.contains("youtu.be/")
        || url.contains("youtube.com/shorts")
        || url.contains("music.youtube.com")
}
