//! Source audio inspection using FFmpeg

use crate::error::ExtractionError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Prober {
    ffmpeg_path: PathBuf,
}

impl Prober {
    pub fn new(ffmpeg_path: PathBuf) -> Self {
        Self { ffmpeg_path }
    }

    /// Total duration of an audio file
    pub async fn duration(&self, input: &Path) -> Result<Duration, ExtractionError> {
        if !input.is_file() {
            return Err(ExtractionError::SourceMissing(input.display().to_string()));
        }

        // Without an output file ffmpeg exits with an error after printing the input info
        let output = Command::new(&self.ffmpeg_path)
            .arg("-hide_banner")
            .arg("-i")
            .arg(input)
            .output()
            .await
            .map_err(ExtractionError::FfmpegSpawn)?;

        // FFmpeg outputs info to stderr
        let stderr = String::from_utf8_lossy(&output.stderr);
        let duration = parse_duration(&stderr)
            .ok_or_else(|| ExtractionError::UnknownDuration(input.display().to_string()))?;

        debug!("{} lasts {:?}", input.display(), duration);
        Ok(duration)
    }
}

fn duration_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Pattern like "Duration: 00:03:45.12"
    RE.get_or_init(|| Regex::new(r"Duration: (\d+):(\d+):(\d+)\.(\d+)").unwrap())
}

fn parse_duration(ffmpeg_output: &str) -> Option<Duration> {
    let caps = duration_regex().captures(ffmpeg_output)?;

    let hours: u64 = caps.get(1)?.as_str().parse().ok()?;
    let minutes: u64 = caps.get(2)?.as_str().parse().ok()?;
    let seconds: u64 = caps.get(3)?.as_str().parse().ok()?;
    let fraction = caps.get(4)?.as_str();

    // Fraction digits are usually centiseconds; scale whatever precision is printed
    let digits = fraction.len().min(9) as u32;
    let nanos: u64 = fraction[..digits as usize].parse().ok()?;
    let nanos = nanos * 10u64.pow(9 - digits);

    Some(Duration::from_secs(hours * 3600 + minutes * 60 + seconds) + Duration::from_nanos(nanos))
}
