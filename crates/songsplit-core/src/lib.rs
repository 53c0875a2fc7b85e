//! songsplit-core: download a video's audio track and split it into songs
//! using the timestamps of its description

pub mod config;
pub mod encoder;
pub mod error;
pub mod fetcher;
pub mod markers;
pub mod metadata;
pub mod pipeline;
pub mod probe;
pub mod progress;
pub mod splitter;
pub mod timestamp;

#[cfg(all(test, unix))]
mod testutil;

pub use config::Config;
pub use error::{Result, SongSplitError};
pub use fetcher::{AudioAsset, MediaFetcher};
pub use markers::{MarkerExtractor, PageFetcher, SelectorMarkers};
pub use progress::DownloadProgress;
pub use splitter::{plan_segments, Segment, SegmentSplitter};
pub use timestamp::{parse_offset, Offset};
