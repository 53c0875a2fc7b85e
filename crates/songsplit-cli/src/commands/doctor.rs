use anyhow::Result;
use songsplit_core::{config::Config, error::ConfigError};
use std::path::{Path, PathBuf};
use std::process::Command;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = Config::load(config_path)?;

    println!("songsplit dependency check\n");

    let yt_dlp_ok = check_tool(
        "yt-dlp:",
        config.yt_dlp_path(),
        &["--version"],
        |out| out.trim().to_string(),
        "brew install yt-dlp",
    );

    let ffmpeg_ok = check_tool(
        "ffmpeg:",
        config.ffmpeg_path(),
        &["-version"],
        |out| {
            // First line looks like "ffmpeg version 6.1 Copyright ..."
            out.lines()
                .next()
                .and_then(|line| line.split_whitespace().nth(2))
                .unwrap_or("unknown")
                .to_string()
        },
        "brew install ffmpeg",
    );

    println!();
    if yt_dlp_ok && ffmpeg_ok {
        println!("All dependencies OK!");
    } else {
        println!("Some dependencies are missing. See above for installation instructions.");
    }

    Ok(())
}

fn check_tool(
    label: &str,
    path: Result<PathBuf, ConfigError>,
    version_args: &[&str],
    version: impl Fn(&str) -> String,
    install_hint: &str,
) -> bool {
    print!("{:<9}", label);

    let path = match path {
        Ok(path) => path,
        Err(_) => {
            println!("NOT FOUND");
            println!("         Install with: {}", install_hint);
            return false;
        }
    };

    match Command::new(&path).args(version_args).output() {
        Ok(out) if out.status.success() => {
            println!("OK ({}, {})", version(&String::from_utf8_lossy(&out.stdout)), path.display());
            true
        }
        _ => {
            println!("FOUND at {} but failed to get version", path.display());
            false
        }
    }
}
