//! Clip tagging and file naming

/// Tags written into every clip cut from one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipTags {
    pub album: String,
    pub title: String,
    pub track: usize,
    pub total: usize,
}

impl ClipTags {
    pub fn new(video_title: &str, track: usize, total: usize) -> Self {
        Self {
            album: video_title.to_string(),
            title: format!("{} ({})", video_title, track),
            track,
            total,
        }
    }

    /// FFmpeg arguments replacing the source container tags with these ones
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-map_metadata".to_string(),
            "-1".to_string(),
            "-metadata".to_string(),
            format!("album={}", self.album),
            "-metadata".to_string(),
            format!("title={}", self.title),
            "-metadata".to_string(),
            format!("track={}/{}", self.track, self.total),
        ]
    }
}

/// Sanitize filename for filesystem
pub fn sanitize_filename(name: &str) -> String {
    let sanitized = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .trim_matches('.')
        .to_string();

    if sanitized.is_empty() {
        "audio".to_string()
    } else {
        sanitized
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Normal Title"), "Normal Title");
        assert_eq!(sanitize_filename("Title/With:Special*Chars"), "Title_With_Special_Chars");
        assert_eq!(sanitize_filename("  Spaces  "), "Spaces");
    }

    #[test]
    fn test_sanitize_never_empty() {
        assert_eq!(sanitize_filename(""), "audio");
        assert_eq!(sanitize_filename(" .. "), "audio");
        assert_eq!(sanitize_filename("line\nbreak"), "line_break");
    }

    #[test]
    fn test_clip_tags() {
        let tags = ClipTags::new("Best of 1999", 2, 12);
        let args = tags.ffmpeg_args();
        assert_eq!(&args[..2], ["-map_metadata", "-1"]);
        assert!(args.contains(&"album=Best of 1999".to_string()));
        assert!(args.contains(&"title=Best of 1999 (2)".to_string()));
        assert!(args.contains(&"track=2/12".to_string()));
    }
}
