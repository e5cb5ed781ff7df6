use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use loopfx::{
    CpuSurface, EffectConfig, FrameLoop, FrameRGBA, HeadlessHost, LoopConfig, Scene, StartOutcome,
    Viewport,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "loopfx", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the available effects.
    List,
    /// Render the frame shown at a given time as a PNG.
    Frame(FrameArgs),
    /// Render consecutive frames as numbered PNGs.
    Frames(FramesArgs),
}

#[derive(Args, Debug)]
struct LoopArgs {
    /// Effect name (see `loopfx list`). Overrides the config's effect with its defaults.
    #[arg(long)]
    effect: Option<String>,

    /// Loop config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical viewport width.
    #[arg(long)]
    width: Option<f64>,

    /// Logical viewport height.
    #[arg(long)]
    height: Option<f64>,

    /// Device pixel ratio.
    #[arg(long)]
    dpr: Option<f64>,

    /// Seed for randomized layouts.
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: LoopArgs,

    /// Elapsed milliseconds to render at.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    #[command(flatten)]
    common: LoopArgs,

    /// Number of frames.
    #[arg(long)]
    count: u64,

    /// Output directory.
    #[arg(long)]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List => {
            for name in EffectConfig::NAMES {
                println!("{name}");
            }
            Ok(())
        }
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn load_config(args: &LoopArgs) -> anyhow::Result<LoopConfig> {
    let mut cfg = match &args.config {
        Some(path) => {
            let f = File::open(path)
                .with_context(|| format!("open config '{}'", path.display()))?;
            LoopConfig::from_reader(BufReader::new(f))
                .with_context(|| format!("parse config '{}'", path.display()))?
        }
        None => LoopConfig::default(),
    };
    if let Some(name) = &args.effect
        && name != cfg.effect.name()
    {
        cfg.effect = EffectConfig::from_name(name)?;
    }
    if let Some(w) = args.width {
        cfg.viewport.width = w;
    }
    if let Some(h) = args.height {
        cfg.viewport.height = h;
    }
    if args.dpr.is_some() {
        cfg.device_pixel_ratio = args.dpr;
    }
    if let Some(seed) = args.seed {
        cfg.seed = seed;
    }
    cfg.validate()?;
    Ok(cfg)
}

/// A started loop plus the host that drives it.
fn start_loop(
    cfg: &LoopConfig,
) -> anyhow::Result<(HeadlessHost, FrameLoop<Box<dyn Scene>, CpuSurface>)> {
    let scene = cfg.build_scene()?;
    let viewport = Viewport::new(cfg.viewport.width, cfg.viewport.height)?;
    let dpr = cfg.device_pixel_ratio.unwrap_or(1.0);
    let mut host = HeadlessHost::new(cfg.fps)?;
    let mut lp = FrameLoop::new(scene, viewport);
    let (w, h) = lp.adapter().backing_size();
    lp.mount(CpuSurface::new(w, h, dpr)?);
    match lp.start(Some(host.scheduler()), cfg.device_pixel_ratio) {
        StartOutcome::Started => Ok((host, lp)),
        other => anyhow::bail!("frame loop did not start: {other:?}"),
    }
}

fn readback(lp: &FrameLoop<Box<dyn Scene>, CpuSurface>) -> anyhow::Result<FrameRGBA> {
    lp.surface()
        .map(CpuSurface::readback)
        .context("frame loop has no surface")
}

fn write_png(frame: &FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.at_ms.is_finite() && args.at_ms >= 0.0,
        "--at-ms must be a non-negative time"
    );
    let cfg = load_config(&args.common)?;
    let (mut host, mut lp) = start_loop(&cfg)?;

    // Effects with running state (grid shifts, puzzle slides) must be stepped up to `at_ms`.
    let frames = (args.at_ms * cfg.fps / 1000.0).floor() as u64 + 1;
    host.run(&mut lp, frames, |_, _| Ok(()))?;
    let frame = readback(&lp)?;
    host.stop(&mut lp);

    write_png(&frame, &args.out)?;
    eprintln!(
        "wrote {} ({} at {:.0} ms)",
        args.out.display(),
        cfg.effect.name(),
        lp.elapsed_ms()
    );
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args.common)?;
    let (mut host, mut lp) = start_loop(&cfg)?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;
    let out_dir = args.out_dir.clone();
    let written = host.run(&mut lp, args.count, |i, lp| {
        let frame = readback(lp)?;
        write_png(&frame, &out_dir.join(format!("frame_{i:05}.png")))?;
        Ok(())
    })?;
    host.stop(&mut lp);

    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}
