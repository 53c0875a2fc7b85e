//! Clip extraction and encoding using FFmpeg

use crate::error::{ConfigError, ExtractionError};
use crate::splitter::ClipJob;
use std::ffi::OsString;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Mp3,
    Flac,
    Wav,
    Aac,
    Opus,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::Flac => "flac",
            OutputFormat::Wav => "wav",
            OutputFormat::Aac => "m4a",
            OutputFormat::Opus => "opus",
        }
    }

    fn codec_args(&self) -> &'static [&'static str] {
        match self {
            OutputFormat::Mp3 => &[
                "-c:a", "libmp3lame",
                "-q:a", "2", // VBR ~190 kbps
            ],
            OutputFormat::Flac => &["-c:a", "flac"],
            OutputFormat::Wav => &["-c:a", "pcm_s16le"],
            OutputFormat::Aac => &["-c:a", "aac", "-b:a", "256k"],
            OutputFormat::Opus => &["-c:a", "libopus", "-b:a", "160k"],
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mp3" => Ok(OutputFormat::Mp3),
            "flac" => Ok(OutputFormat::Flac),
            "wav" => Ok(OutputFormat::Wav),
            "aac" | "m4a" => Ok(OutputFormat::Aac),
            "opus" => Ok(OutputFormat::Opus),
            other => Err(ConfigError::InvalidValue(format!(
                "unsupported clip format: {other}"
            ))),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Mp3 => write!(f, "MP3"),
            OutputFormat::Flac => write!(f, "FLAC"),
            OutputFormat::Wav => write!(f, "WAV"),
            OutputFormat::Aac => write!(f, "AAC"),
            OutputFormat::Opus => write!(f, "Opus"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Encoder {
    ffmpeg_path: PathBuf,
    format: OutputFormat,
}

impl Encoder {
    pub fn new(ffmpeg_path: PathBuf, format: OutputFormat) -> Self {
        Self {
            ffmpeg_path,
            format,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Cut `[start, end)` out of the source and encode it, overwriting the output
    pub async fn extract(&self, job: &ClipJob<'_>) -> Result<(), ExtractionError> {
        info!(
            "Writing clip {} ({} - {}) to {}",
            job.segment.index,
            job.segment.start,
            job.segment
                .end
                .map_or_else(|| "END".to_string(), |end| end.to_string()),
            job.output.display()
        );

        let status = Command::new(&self.ffmpeg_path)
            .args(self.build_args(job))
            .status()
            .await
            .map_err(ExtractionError::FfmpegSpawn)?;

        if !status.success() {
            return Err(ExtractionError::FfmpegFailed {
                clip: job.segment.index,
                code: status.code(),
            });
        }

        debug!("Encoded to: {}", job.output.display());
        Ok(())
    }

    fn build_args(&self, job: &ClipJob<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-hide_banner", "-loglevel", "error", "-y", "-i"]
            .iter()
            .map(OsString::from)
            .collect();
        args.push(job.input.into());

        // Seeking after -i keeps -to relative to the source timeline
        args.push("-ss".into());
        args.push(job.segment.start.to_ffmpeg_arg().into());
        if let Some(end) = job.segment.end {
            args.push("-to".into());
            args.push(end.to_ffmpeg_arg().into());
        }

        args.push("-vn".into());
        args.extend(self.format.codec_args().iter().map(OsString::from));

        if let Some(tags) = job.tags {
            args.extend(tags.ffmpeg_args().into_iter().map(OsString::from));
        }

        args.push("--".into());
        args.push(job.output.into());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::ClipTags;
    use crate::splitter::Segment;
    use crate::timestamp::parse_offset;
    use std::path::Path;

    fn args_as_strings(args: Vec<OsString>) -> Vec<String> {
        args.into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_format_from_str() {
        assert_eq!("MP3".parse::<OutputFormat>().unwrap(), OutputFormat::Mp3);
        assert_eq!("m4a".parse::<OutputFormat>().unwrap(), OutputFormat::Aac);
        assert!("wma".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::Aac.extension(), "m4a");
    }

    #[test]
    fn test_bounded_clip_args() {
        let encoder = Encoder::new(PathBuf::from("ffmpeg"), OutputFormat::Mp3);
        let segment = Segment {
            index: 2,
            start: parse_offset("2:30").unwrap(),
            end: Some(parse_offset("5:15").unwrap()),
        };
        let job = ClipJob {
            input: Path::new("mix.m4a"),
            output: Path::new("clip2.mp3"),
            segment: &segment,
            tags: None,
        };

        let args = args_as_strings(encoder.build_args(&job));
        assert_eq!(
            args,
            [
                "-hide_banner", "-loglevel", "error", "-y", "-i", "mix.m4a",
                "-ss", "00:02:30", "-to", "00:05:15", "-vn",
                "-c:a", "libmp3lame", "-q:a", "2",
                "--", "clip2.mp3",
            ]
        );
    }

    #[test]
    fn test_open_ended_tagged_clip_args() {
        let encoder = Encoder::new(PathBuf::from("ffmpeg"), OutputFormat::Flac);
        let segment = Segment {
            index: 3,
            start: parse_offset("1:05:15").unwrap(),
            end: None,
        };
        let tags = ClipTags::new("Mix", 3, 3);
        let job = ClipJob {
            input: Path::new("mix.m4a"),
            output: Path::new("clip3.flac"),
            segment: &segment,
            tags: Some(&tags),
        };

        let args = args_as_strings(encoder.build_args(&job));
        assert!(!args.contains(&"-to".to_string()));
        assert!(args.contains(&"01:05:15".to_string()));
        assert!(args.contains(&"track=3/3".to_string()));
        assert_eq!(args.last().unwrap(), "clip3.flac");
    }
}
