use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use lottie_raster::{Animation, Canvas, Surface};

#[derive(Parser, Debug)]
#[command(name = "lottie-raster", version)]
struct Cli {
    /// Log debug output (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print size, timing and markers.
    Info(InfoArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence on the background scheduler.
    Frames(FramesArgs),
}

#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct SizeArgs {
    /// Output width; defaults to the animation width.
    #[arg(long)]
    width: Option<u32>,

    /// Output height; defaults to the animation height.
    #[arg(long)]
    height: Option<u32>,

    /// Stretch to the output size instead of fitting and centering.
    #[arg(long, default_value_t = false)]
    stretch: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Frame number.
    #[arg(long)]
    frame: usize,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    size: SizeArgs,
}

#[derive(Parser, Debug)]
struct FramesArgs {
    /// Input animation JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output directory; files are named `frame_NNNNN.png`.
    #[arg(long)]
    out_dir: PathBuf,

    /// Render every K-th frame.
    #[arg(long, default_value_t = 1)]
    every: usize,

    #[command(flatten)]
    size: SizeArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Info(args) => cmd_info(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Frames(args) => cmd_frames(args),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "lottie_raster=debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn load(path: &Path) -> anyhow::Result<Animation> {
    Animation::load(path).with_context(|| format!("load animation '{}'", path.display()))
}

fn canvas(anim: &Animation, size: &SizeArgs) -> anyhow::Result<Canvas> {
    let (w, h) = anim.size();
    Ok(Canvas::new(size.width.unwrap_or(w), size.height.unwrap_or(h))?)
}

fn write_png(surface: &Surface, path: &Path) -> anyhow::Result<()> {
    image::save_buffer_with_format(
        path,
        &surface.to_rgba8(),
        surface.width(),
        surface.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))
}

fn cmd_info(args: InfoArgs) -> anyhow::Result<()> {
    let anim = load(&args.in_path)?;
    let (w, h) = anim.size();
    println!("size: {w}x{h}");
    println!("frame rate: {}", anim.frame_rate());
    println!("frames: {}", anim.total_frame());
    println!("duration: {:.3}s", anim.duration());
    for (name, start, end) in anim.markers() {
        println!("marker: {name} [{start}, {end}]");
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let anim = load(&args.in_path)?;
    let canvas = canvas(&anim, &args.size)?;
    let mut surface = Surface::with_size(canvas.width, canvas.height);
    anim.render_sync(args.frame, &mut surface, !args.size.stretch);

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    write_png(&surface, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_frames(args: FramesArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.every > 0, "--every must be at least 1");
    let anim = load(&args.in_path)?;
    let canvas = canvas(&anim, &args.size)?;
    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    let keep = !args.size.stretch;
    let start = anim.frame_at_pos(0.0);
    let frames: Vec<usize> = (start..start + anim.total_frame()).step_by(args.every).collect();
    let mut surface = Surface::with_size(canvas.width, canvas.height);
    let mut written = 0usize;
    for frame in frames {
        let rendered = anim
            .render(frame, surface, keep)
            .with_context(|| format!("queue frame {frame}"))?
            .wait()
            .with_context(|| format!("render frame {frame}"))?;
        let path = args.out_dir.join(format!("frame_{frame:05}.png"));
        write_png(&rendered, &path)?;
        surface = rendered;
        written += 1;
    }
    eprintln!("wrote {written} frames to {}", args.out_dir.display());
    Ok(())
}
