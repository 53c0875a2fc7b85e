//! Timestamp markers and the offsets they denote

use crate::error::TimestampError;
use std::fmt;
use std::time::Duration;

/// A position in the source audio, as written in the video description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Offset {
    /// `mm:ss`. Minutes are not bounded: `75:00` is accepted.
    MinSec { minutes: u32, seconds: u32 },
    /// `hh:mm:ss`
    HourMinSec { hours: u32, minutes: u32, seconds: u32 },
}

impl Offset {
    pub fn as_secs(&self) -> u64 {
        match *self {
            Offset::MinSec { minutes, seconds } => minutes as u64 * 60 + seconds as u64,
            Offset::HourMinSec {
                hours,
                minutes,
                seconds,
            } => hours as u64 * 3600 + minutes as u64 * 60 + seconds as u64,
        }
    }

    pub fn as_duration(&self) -> Duration {
        Duration::from_secs(self.as_secs())
    }

    /// `HH:MM:SS`, the form given to ffmpeg `-ss` / `-to`
    pub fn to_ffmpeg_arg(&self) -> String {
        let secs = self.as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Offset::MinSec { minutes, seconds } => write!(f, "{}:{:02}", minutes, seconds),
            Offset::HourMinSec {
                hours,
                minutes,
                seconds,
            } => write!(f, "{}:{:02}:{:02}", hours, minutes, seconds),
        }
    }
}

/// Parse a marker such as `3:45` or `1:02:10`.
///
/// Every colon-separated field must be a non-empty run of ASCII digits.
/// Seconds are at most 59; minutes are at most 59 only when an hour field is present.
pub fn parse_offset(marker: &str) -> Result<Offset, TimestampError> {
    let malformed = |reason| TimestampError::Malformed {
        marker: marker.to_string(),
        reason,
    };

    let fields = marker
        .trim()
        .split(':')
        .map(|field| {
            parse_field(field).ok_or_else(|| malformed("fields must be non-negative integers"))
        })
        .collect::<Result<Vec<u32>, _>>()?;

    let offset = match fields[..] {
        [minutes, seconds] => Offset::MinSec { minutes, seconds },
        [hours, minutes, seconds] => {
            if minutes > 59 {
                return Err(malformed("minutes exceed 59"));
            }
            Offset::HourMinSec {
                hours,
                minutes,
                seconds,
            }
        }
        _ => return Err(malformed("expected mm:ss or hh:mm:ss")),
    };

    let seconds = match offset {
        Offset::MinSec { seconds, .. } | Offset::HourMinSec { seconds, .. } => seconds,
    };
    if seconds > 59 {
        return Err(malformed("seconds exceed 59"));
    }

    Ok(offset)
}

fn parse_field(field: &str) -> Option<u32> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minutes_seconds() {
        assert_eq!(
            parse_offset("3:45").unwrap(),
            Offset::MinSec {
                minutes: 3,
                seconds: 45
            }
        );
        assert_eq!(
            parse_offset("0:00").unwrap(),
            Offset::MinSec {
                minutes: 0,
                seconds: 0
            }
        );
    }

    #[test]
    fn test_parse_hours_minutes_seconds() {
        assert_eq!(
            parse_offset("1:02:10").unwrap(),
            Offset::HourMinSec {
                hours: 1,
                minutes: 2,
                seconds: 10
            }
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(parse_offset("  12:07\n").unwrap().as_secs(), 727);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for marker in ["abc", "", ":", "3:", ":45", "3:4a", "+3:45", "-1:00", "1:2:3:4", "42"] {
            assert!(
                matches!(parse_offset(marker), Err(TimestampError::Malformed { .. })),
                "{marker:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_bounds() {
        assert!(parse_offset("3:60").is_err());
        assert!(parse_offset("1:60:00").is_err());
        assert!(parse_offset("1:00:60").is_err());
        // Two-field minutes are unbounded
        assert_eq!(parse_offset("75:00").unwrap().as_secs(), 4500);
    }

    #[test]
    fn test_ffmpeg_arg() {
        assert_eq!(parse_offset("2:30").unwrap().to_ffmpeg_arg(), "00:02:30");
        assert_eq!(parse_offset("75:05").unwrap().to_ffmpeg_arg(), "01:15:05");
        assert_eq!(parse_offset("1:02:10").unwrap().to_ffmpeg_arg(), "01:02:10");
    }

    #[test]
    fn test_display_keeps_written_form() {
        assert_eq!(parse_offset("05:07").unwrap().to_string(), "5:07");
        assert_eq!(parse_offset("1:02:03").unwrap().to_string(), "1:02:03");
    }
}
