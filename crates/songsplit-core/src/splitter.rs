//! Cutting the downloaded audio into one clip per timestamp marker

use crate::encoder::Encoder;
use crate::error::{ExtractionError, Result, TimestampError};
use crate::metadata::ClipTags;
use crate::probe::Prober;
use crate::timestamp::{parse_offset, Offset};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// One clip: `[start, end)`, `end == None` running to the end of the source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 1-based clip number
    pub index: usize,
    pub start: Offset,
    pub end: Option<Offset>,
}

/// Turn markers into consecutive segments, each ending where the next starts.
///
/// Markers are taken in page order; chronology is not checked here.
pub fn plan_segments<S: AsRef<str>>(
    markers: &[S],
) -> std::result::Result<Vec<Segment>, TimestampError> {
    let offsets = markers
        .iter()
        .map(|m| parse_offset(m.as_ref()))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(offsets
        .iter()
        .enumerate()
        .map(|(i, start)| Segment {
            index: i + 1,
            start: *start,
            end: offsets.get(i + 1).copied(),
        })
        .collect())
}

/// Everything needed to write one clip
#[derive(Debug, Clone, Copy)]
pub struct ClipJob<'a> {
    pub input: &'a Path,
    pub output: &'a Path,
    pub segment: &'a Segment,
    pub tags: Option<&'a ClipTags>,
}

/// Decode/encode capability the splitter relies on
pub trait AudioEditor {
    fn duration(
        &self,
        input: &Path,
    ) -> impl Future<Output = std::result::Result<Duration, ExtractionError>>;

    fn extract(
        &self,
        job: &ClipJob<'_>,
    ) -> impl Future<Output = std::result::Result<(), ExtractionError>>;

    /// Extension of the files `extract` writes
    fn extension(&self) -> &str;
}

/// [`AudioEditor`] backed by the ffmpeg executable
#[derive(Debug, Clone)]
pub struct FfmpegEditor {
    prober: Prober,
    encoder: Encoder,
}

impl FfmpegEditor {
    pub fn new(prober: Prober, encoder: Encoder) -> Self {
        Self { prober, encoder }
    }
}

impl AudioEditor for FfmpegEditor {
    async fn duration(&self, input: &Path) -> std::result::Result<Duration, ExtractionError> {
        self.prober.duration(input).await
    }

    async fn extract(&self, job: &ClipJob<'_>) -> std::result::Result<(), ExtractionError> {
        self.encoder.extract(job).await
    }

    fn extension(&self) -> &str {
        self.encoder.format().extension()
    }
}

#[derive(Debug, Clone)]
pub struct SegmentSplitter<E> {
    editor: E,
    output_dir: PathBuf,
    prefix: String,
}

impl<E: AudioEditor> SegmentSplitter<E> {
    pub fn new(editor: E, output_dir: PathBuf, prefix: impl Into<String>) -> Self {
        Self {
            editor,
            output_dir,
            prefix: prefix.into(),
        }
    }

    /// `<output dir>/<prefix><index>.<ext>`
    pub fn clip_path(&self, index: usize) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.{}", self.prefix, index, self.editor.extension()))
    }

    /// Write one clip per marker and return their paths in order.
    ///
    /// All markers are parsed before anything is written. Clips written before a
    /// failing one are left in place.
    pub async fn split<S: AsRef<str>>(
        &self,
        audio_path: &Path,
        markers: &[S],
        album: Option<&str>,
    ) -> Result<Vec<PathBuf>> {
        let segments = plan_segments(markers)?;
        if segments.is_empty() {
            info!("No timestamp markers, nothing to split");
            return Ok(Vec::new());
        }

        let duration = self.editor.duration(audio_path).await?;
        tokio::fs::create_dir_all(&self.output_dir).await?;

        let total = segments.len();
        let mut outputs = Vec::with_capacity(total);

        for segment in &segments {
            check_bounds(segment, duration)?;

            let output = self.clip_path(segment.index);
            let tags = album.map(|album| ClipTags::new(album, segment.index, total));
            let job = ClipJob {
                input: audio_path,
                output: &output,
                segment,
                tags: tags.as_ref(),
            };

            self.editor.extract(&job).await?;
            debug!("Clip {}/{} completed", segment.index, total);
            outputs.push(output);
        }

        info!("Wrote {} clips to {}", outputs.len(), self.output_dir.display());
        Ok(outputs)
    }
}

fn check_bounds(segment: &Segment, duration: Duration) -> std::result::Result<(), ExtractionError> {
    let start = segment.start.as_duration();
    if start >= duration {
        return Err(ExtractionError::StartBeyondEnd {
            clip: segment.index,
            start,
            duration,
        });
    }

    if let Some(end) = segment.end.map(|end| end.as_duration()) {
        if end <= start {
            return Err(ExtractionError::EmptySegment {
                clip: segment.index,
                start,
                end,
            });
        }
    }

    Ok(())
}
