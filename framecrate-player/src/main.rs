//! Headless frame player
//!
//! Loads a point-cloud sequence, any number of camera image sequences and a
//! box annotation file, then plays them back against an in-memory scene.

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use framecrate_core::{align, FrameIndex, LengthPolicy, StreamSet};
use framecrate_io::{list_files, load_images, load_point_clouds, read_boxes};
use framecrate_player::{PlayerConfig, RecordingBackend, Viewer};
use log::info;
use std::path::{Path, PathBuf};
use std::time::Duration;

const PCD_EXTENSIONS: &[&str] = &["pcd"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];
/// Slack on top of four tick intervals per requested frame
const PLAYBACK_GRACE: Duration = Duration::from_secs(5);

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Preset {
    /// One camera, one frame per second
    Single,
    /// Wayside cameras, ten frames per second
    Wayside,
}

#[derive(Parser, Debug)]
#[command(name = "framecrate")]
#[command(about = "Play back synchronized point clouds, camera images and 3D boxes", long_about = None)]
struct Cli {
    /// Point cloud directory or .pcd files, one per frame
    #[arg(long, required = true, num_args = 1..)]
    pcd: Vec<PathBuf>,

    /// Camera image stream as NAME=DIR (repeatable)
    #[arg(long = "camera", value_parser = parse_camera)]
    cameras: Vec<(String, PathBuf)>,

    /// Box annotations (.csv or .json)
    #[arg(long)]
    boxes: PathBuf,

    /// JSON player configuration
    #[arg(long)]
    config: Option<PathBuf>,

    /// Built-in configuration used when no --config is given
    #[arg(long, value_enum, default_value = "single")]
    preset: Preset,

    /// Override the tick interval in milliseconds
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Refuse to play streams of different lengths
    #[arg(long, default_value = "false")]
    strict_lengths: bool,

    /// Number of frame changes to play before exiting
    #[arg(long, default_value = "10")]
    ticks: u64,
}

fn parse_camera(arg: &str) -> Result<(String, PathBuf), String> {
    match arg.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => Ok((name.to_string(), PathBuf::from(dir))),
        _ => Err(format!("expected NAME=DIR, got '{}'", arg)),
    }
}

fn expand_inputs(inputs: &[PathBuf], extensions: &[&str]) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(list_files(input, extensions).with_context(|| format!("listing {}", input.display()))?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn load_config(cli: &Cli) -> anyhow::Result<PlayerConfig> {
    let mut config = match &cli.config {
        Some(path) => PlayerConfig::from_json_file(path)
            .with_context(|| format!("reading configuration {}", path.display()))?,
        None => match cli.preset {
            Preset::Single => PlayerConfig::single_camera(),
            Preset::Wayside => PlayerConfig::multi_wayside(),
        },
    };
    if let Some(ms) = cli.interval_ms {
        config.tick_interval_ms = ms;
    }
    if cli.strict_lengths {
        config.length_policy = LengthPolicy::Strict;
    }
    config.validate()?;
    Ok(config)
}

fn load_camera(name: &str, dir: &Path) -> anyhow::Result<Vec<framecrate_io::ImageFrame>> {
    let paths = list_files(dir, IMAGE_EXTENSIONS).with_context(|| format!("listing camera '{}'", name))?;
    let images = load_images(&paths).with_context(|| format!("decoding camera '{}'", name))?;
    info!("Camera '{}': {} images from {}", name, images.len(), dir.display());
    Ok(images)
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let report = read_boxes(&cli.boxes).with_context(|| format!("reading boxes {}", cli.boxes.display()))?;
    let frames = FrameIndex::build(report.records).context("indexing box frames")?;

    let pcd_paths = expand_inputs(&cli.pcd, PCD_EXTENSIONS)?;
    let clouds = load_point_clouds(&pcd_paths, [255, 255, 255]).context("loading point clouds")?;

    let mut streams = StreamSet::new(clouds).context("point cloud stream")?;
    for (name, dir) in &cli.cameras {
        streams = streams.with_images(name.clone(), load_camera(name, dir)?)?;
    }

    let timeline = align(frames, streams, config.length_policy).context("aligning streams")?;
    let mut session = Viewer::launch(&config, timeline, RecordingBackend::new())?;

    session.toggle_playback();
    let target = cli.ticks + 1;
    let limit = u32::try_from(target)
        .ok()
        .and_then(|frames| config.tick_interval().checked_mul(frames.saturating_mul(4)))
        .and_then(|expected| expected.checked_add(PLAYBACK_GRACE))
        .unwrap_or(Duration::MAX);
    if !session.pump_until_presented(target, limit) {
        if session.controller().is_finished() {
            bail!("playback thread stopped unexpectedly");
        }
        bail!(
            "only {} of {} frame(s) presented within {:?}",
            session.presenter().presented(),
            target,
            limit
        );
    }

    let last = session.presenter().current().unwrap_or(0);
    let dropped = report.malformed.len();
    session.close();

    println!(
        "Played {} frame change(s) of {} ({} malformed box row(s) skipped); last frame {}",
        cli.ticks,
        session.presenter().timeline().len(),
        dropped,
        last
    );
    println!("Scene holds {} geometries", session.backend().geometry_count());
    Ok(())
}
