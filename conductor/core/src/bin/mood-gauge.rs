//! Mood Gauge CLI
//!
//! Renders the mood dial as a standalone SVG document.
//!
//! # Usage
//!
//! ```bash
//! # Print the dial for "sadness" to stdout
//! mood-gauge sadness
//!
//! # With a confidence badge, written to a file
//! mood-gauge joy --confidence 0.82 --size 300 --output joy.svg
//!
//! # With verbose logging
//! RUST_LOG=debug mood-gauge distress
//! ```
//!
//! Unknown mood labels render with the needle on the first segment.

use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use companion_core::{config, GaugeLayout};

/// Render the companion's mood gauge as SVG
#[derive(Debug, Parser)]
#[command(name = "mood-gauge", version, about)]
struct Args {
    /// Mood label: anger, distress, sadness, neutral, optimism or joy
    mood: String,

    /// Classifier confidence in [0, 1]; adds a percentage badge
    #[arg(short, long)]
    confidence: Option<f32>,

    /// Width in pixels (default: `[ui] gauge_size` from the config file)
    #[arg(short, long)]
    size: Option<u32>,

    /// Write to this file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Configuration file
    #[arg(long, env = "COMPANION_CONFIG")]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = Args::parse();

    let size = match args.size {
        Some(size) => size,
        None => {
            let path = args.config.clone().or_else(config::default_config_path);
            config::load_config_from_path(path)
                .context("loading configuration")?
                .gauge_size
        }
    };

    let layout = GaugeLayout::new(&args.mood, args.confidence, size);
    info!(
        mood = %args.mood,
        index = layout.active_index,
        angle = layout.needle_angle,
        "Rendering gauge"
    );
    let svg = layout.to_svg();

    match args.output {
        Some(path) => {
            std::fs::write(&path, format!("{svg}\n"))
                .with_context(|| format!("writing {}", path.display()))?;
            info!(path = %path.display(), "Gauge written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{svg}").context("writing to stdout")?;
        }
    }

    Ok(())
}
