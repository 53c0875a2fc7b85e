//! Download progress reporting

use std::time::{Duration, Instant};

/// Prefix of the lines yt-dlp prints through our `--progress-template`
pub(crate) const PROGRESS_PREFIX: &str = "[songsplit-progress]";

/// `--progress-template` value matching [`parse_progress_line`]
pub(crate) fn progress_template() -> String {
    format!(
        "download:{PROGRESS_PREFIX} %(progress.downloaded_bytes)s \
         %(progress.total_bytes)s %(progress.total_bytes_estimate)s"
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DownloadProgress {
    pub downloaded: u64,
    pub total: Option<u64>,
}

impl DownloadProgress {
    /// Percentage complete, or `None` when the total size is unknown or zero
    pub fn percent(&self) -> Option<f64> {
        match self.total {
            Some(total) if total > 0 => {
                Some((self.downloaded.min(total) as f64 * 100.0) / total as f64)
            }
            _ => None,
        }
    }
}

/// Parse a progress line printed by yt-dlp.
///
/// The exact size wins over the estimate; yt-dlp prints `NA` for unknown values.
pub fn parse_progress_line(line: &str) -> Option<DownloadProgress> {
    let mut fields = line.trim().strip_prefix(PROGRESS_PREFIX)?.split_whitespace();

    let downloaded = parse_bytes(fields.next()?)?;
    let total = fields.next().and_then(parse_bytes);
    let estimate = fields.next().and_then(parse_bytes);

    Some(DownloadProgress {
        downloaded,
        total: total.or(estimate),
    })
}

// yt-dlp may print sizes as floats ("1234.0")
fn parse_bytes(field: &str) -> Option<u64> {
    field
        .parse::<u64>()
        .ok()
        .or_else(|| field.parse::<f64>().ok().filter(|v| *v >= 0.0).map(|v| v as u64))
}

/// Lets at most one notification through per interval.
///
/// Totals may be estimates, so nothing here is treated as final; the caller sends
/// the closing update itself.
#[derive(Debug)]
pub struct ProgressThrottle {
    interval: Duration,
    last: Option<Instant>,
}

impl ProgressThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    pub fn should_emit(&mut self) -> bool {
        self.should_emit_at(Instant::now())
    }

    fn should_emit_at(&mut self, now: Instant) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => now.duration_since(last) >= self.interval,
        };

        if due {
            self.last = Some(now);
            true
        } else {
            false
        }
    }
}
