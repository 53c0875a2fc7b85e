use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::Path;
use tokio::sync::mpsc;
use tracing::warn;

use songsplit_core::{
    config::Config,
    fetcher::validate_youtube_url,
    pipeline::{Pipeline, PipelineStage},
};

/// Ask for the video URL on standard input
pub fn prompt_url() -> Result<String> {
    print!("Enter video url: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read the video url")?;

    let url = line.trim();
    if url.is_empty() {
        bail!("No video url given");
    }
    Ok(url.to_string())
}

pub async fn run(url: &str, config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    if !validate_youtube_url(url) {
        warn!("{} does not look like a YouTube video; timestamp scraping may find nothing", url);
    }

    // Create progress channel
    let (tx, mut rx) = mpsc::channel(32);

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {msg}",
        )?
        .progress_chars("=>-"),
    );

    // Spawn progress handler
    let progress_handle = tokio::spawn(async move {
        while let Some(stage) = rx.recv().await {
            match stage {
                PipelineStage::Resolving => {
                    pb.set_position(0);
                    pb.set_message("Resolving video...");
                }
                PipelineStage::Downloading { title, progress } => {
                    // Unknown size: leave the bar where it is
                    if let Some(percent) = progress.percent() {
                        pb.set_position((percent * 0.8) as u64);
                    }
                    pb.set_message(format!("Downloading: {}", truncate(&title, 40)));
                }
                PipelineStage::FetchingMarkers => {
                    pb.set_position(80);
                    pb.set_message("Fetching timestamps...");
                }
                PipelineStage::Splitting { clips } => {
                    pb.set_position(85);
                    pb.set_message(format!("Splitting into {} clips...", clips));
                }
                PipelineStage::Complete { clips, duration } => {
                    pb.set_position(100);
                    pb.finish_with_message(format!(
                        "Done: {} clips ({:.1}s)",
                        clips.len(),
                        duration.as_secs_f32()
                    ));
                }
                PipelineStage::Failed { stage, error } => {
                    pb.abandon_with_message(format!("Failed at {}: {}", stage, error));
                }
            }
        }
    });

    // Run pipeline
    let pipeline = Pipeline::new(url, config, tx);
    let result = pipeline.run().await;

    // The sender lives in the pipeline; dropping it ends the progress handler
    drop(pipeline);
    progress_handle.await?;

    match result {
        Ok(output) => {
            println!("\nAudio: {}", output.audio.display());
            if output.clips.is_empty() {
                println!("No timestamps found, nothing was split");
            }
            for clip in &output.clips {
                println!("Clip: {}", clip.display());
            }
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a rather long title", 10), "a rathe...");
        // Never splits a multi-byte character
        assert_eq!(truncate("ééééééééééé", 5), "éé...");
    }
}
