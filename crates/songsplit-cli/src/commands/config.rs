use anyhow::{Context, Result};
use songsplit_core::config::Config;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("songsplit configuration\n");
    print!(
        "{}",
        toml::to_string_pretty(&config).context("Failed to render configuration")?
    );

    if config.paths.yt_dlp.is_none() || config.paths.ffmpeg.is_none() {
        println!("\n# Unset tool paths are looked up in PATH");
    }

    // Later sources override earlier ones
    println!("\nConfig sources (lowest to highest priority):");
    if let Some(p) = Config::default_path() {
        println!("  1. {}", p.display());
    }
    if let Some(p) = config_path {
        println!("  2. {} (specified)", p.display());
    }
    println!("  3. Environment variables (SONGSPLIT_*, nested keys joined with __)");

    Ok(())
}
