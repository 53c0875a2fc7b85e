//! Pipeline orchestration: resolve, download, scrape markers, split

use crate::encoder::{Encoder, OutputFormat};
use crate::error::SongSplitError;
use crate::fetcher::{AudioAsset, MediaFetcher};
use crate::markers::{PageFetcher, SelectorMarkers};
use crate::probe::Prober;
use crate::progress::DownloadProgress;
use crate::splitter::{FfmpegEditor, SegmentSplitter};
use crate::Config;

use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Pipeline progress stages
#[derive(Debug, Clone)]
pub enum PipelineStage {
    Resolving,
    Downloading { title: String, progress: DownloadProgress },
    FetchingMarkers,
    Splitting { clips: usize },
    Complete { clips: Vec<PathBuf>, duration: Duration },
    Failed { stage: String, error: String },
}

/// What a successful run leaves on disk
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub audio: PathBuf,
    pub clips: Vec<PathBuf>,
}

/// Main processing pipeline
pub struct Pipeline {
    url: String,
    config: Config,
    progress_tx: mpsc::Sender<PipelineStage>,
}

impl Pipeline {
    pub fn new(
        url: impl Into<String>,
        config: Config,
        progress_tx: mpsc::Sender<PipelineStage>,
    ) -> Self {
        Self {
            url: url.into(),
            config,
            progress_tx,
        }
    }

    pub async fn run(&self) -> Result<PipelineOutput, SongSplitError> {
        let start_time = Instant::now();
        info!("Starting pipeline for: {}", self.url);

        // Fail on missing tools or bad settings before touching the network
        let yt_dlp_path = self.config.yt_dlp_path()?;
        let ffmpeg_path = self.config.ffmpeg_path()?;
        let format: OutputFormat = self.config.clips.format.parse()?;
        let extractor = SelectorMarkers::new(&self.config.markers.selector)?;
        let page_fetcher =
            PageFetcher::new(self.config.http_timeout(), &self.config.http.user_agent)?;

        // 1. Resolve
        self.report(PipelineStage::Resolving).await;

        let fetcher = MediaFetcher::new(
            yt_dlp_path,
            self.config.download.directory.clone(),
            self.config.download.container.clone(),
            self.config.progress_interval(),
        );
        let asset = self.stage("resolve", fetcher.resolve(&self.url)).await?;
        debug!("Resolved asset: {:?}", asset);

        // 2. Download
        self.download(&fetcher, &asset).await?;

        // 3. Scrape markers
        self.report(PipelineStage::FetchingMarkers).await;

        let markers = self
            .stage("markers", page_fetcher.fetch_timestamp_markers(&self.url, &extractor))
            .await?;
        debug!("Markers: {:?}", markers);

        // 4. Split
        self.report(PipelineStage::Splitting {
            clips: markers.len(),
        })
        .await;

        let splitter = SegmentSplitter::new(
            FfmpegEditor::new(Prober::new(ffmpeg_path.clone()), Encoder::new(ffmpeg_path, format)),
            self.config.clips.directory.clone(),
            self.config.clips.prefix.clone(),
        );
        let album = self.config.clips.tag_metadata.then_some(asset.title.as_str());
        let clips = self
            .stage(
                "split",
                splitter.split(&asset.local_filename, &markers, album),
            )
            .await?;

        let duration = start_time.elapsed();
        info!(
            "Pipeline complete: {} clips ({:.1}s)",
            clips.len(),
            duration.as_secs_f32()
        );

        self.report(PipelineStage::Complete {
            clips: clips.clone(),
            duration,
        })
        .await;

        Ok(PipelineOutput {
            audio: asset.local_filename,
            clips,
        })
    }

    async fn download(
        &self,
        fetcher: &MediaFetcher,
        asset: &AudioAsset,
    ) -> Result<(), SongSplitError> {
        let title = asset.title.clone();
        let tx = self.progress_tx.clone();

        self.report(PipelineStage::Downloading {
            title: title.clone(),
            progress: DownloadProgress {
                downloaded: 0,
                total: asset.size_bytes,
            },
        })
        .await;

        // A full channel only drops an update; the download never waits on the display
        let sink = move |progress: DownloadProgress| {
            let _ = tx.try_send(PipelineStage::Downloading {
                title: title.clone(),
                progress,
            });
        };

        self.stage("download", fetcher.download(asset, sink)).await
    }

    /// Await one step and report it as the failing stage if it errors
    async fn stage<T, E, F>(&self, name: &str, step: F) -> Result<T, SongSplitError>
    where
        F: std::future::Future<Output = Result<T, E>>,
        E: Into<SongSplitError>,
    {
        step.await.map_err(|e| {
            let e = e.into();
            let _ = self.progress_tx.try_send(PipelineStage::Failed {
                stage: name.to_string(),
                error: e.to_string(),
            });
            e
        })
    }

    async fn report(&self, stage: PipelineStage) {
        // The receiver may be gone; progress is informational only
        let _ = self.progress_tx.send(stage).await;
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::{ConfigError, DownloadError, ResolutionError};
    use crate::testutil::{fake_tool, fake_yt_dlp};
    use std::path::Path;

    const INFO_JSON: &str = r#"{"id": "abc123", "title": "Mix",
        "formats": [{"format_id": "140", "ext": "m4a", "vcodec": "none",
                     "acodec": "mp4a.40.2", "abr": 129.5, "filesize": 10}]}"#;

    fn config_in(dir: &Path, yt_dlp_script: &str) -> Config {
        let mut config = Config::default();
        config.paths.yt_dlp = Some(fake_tool(dir, "yt-dlp", yt_dlp_script));
        // Never reached by these runs
        config.paths.ffmpeg = Some(dir.join("ffmpeg"));
        config.download.directory = dir.join("audio");
        config.clips.directory = dir.join("clips");
        config
    }

    async fn run_collecting(
        config: Config,
    ) -> (Result<PipelineOutput, SongSplitError>, Vec<PipelineStage>) {
        let (tx, mut rx) = mpsc::channel(32);
        let pipeline = Pipeline::new("https://youtu.be/abc123", config, tx);
        let result = pipeline.run().await;
        drop(pipeline);

        let mut stages = Vec::new();
        while let Some(stage) = rx.recv().await {
            stages.push(stage);
        }
        (result, stages)
    }

    #[tokio::test]
    async fn test_resolve_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            "echo 'ERROR: [youtube] abc123: Video unavailable' >&2; exit 1",
        );

        let (result, stages) = run_collecting(config).await;

        assert!(matches!(
            result,
            Err(SongSplitError::Resolution(ResolutionError::VideoUnavailable(_)))
        ));
        assert_eq!(stages.len(), 2);
        assert!(matches!(stages[0], PipelineStage::Resolving));
        assert!(matches!(
            &stages[1],
            PipelineStage::Failed { stage, error }
                if stage == "resolve" && error.contains("unavailable")
        ));
    }

    #[tokio::test]
    async fn test_download_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            dir.path(),
            &fake_yt_dlp(INFO_JSON, "echo 'ERROR: HTTP Error 403' >&2; exit 1"),
        );

        let (result, stages) = run_collecting(config).await;

        assert!(matches!(
            result,
            Err(SongSplitError::Download(DownloadError::YtDlpFailed(Some(1))))
        ));
        assert!(matches!(stages[0], PipelineStage::Resolving));
        assert!(matches!(
            &stages[1],
            PipelineStage::Downloading { title, progress }
                if title == "Mix" && progress.downloaded == 0 && progress.total == Some(10)
        ));
        assert!(matches!(
            stages.last(),
            Some(PipelineStage::Failed { stage, .. }) if stage == "download"
        ));
        assert!(!stages
            .iter()
            .any(|s| matches!(s, PipelineStage::FetchingMarkers)));
    }

    #[tokio::test]
    async fn test_bad_settings_fail_before_any_stage() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path(), "exit 1");
        config.clips.format = "tape".to_string();

        let (result, stages) = run_collecting(config).await;

        assert!(matches!(
            result,
            Err(SongSplitError::Config(ConfigError::InvalidValue(_)))
        ));
        assert!(stages.is_empty());
    }
}
