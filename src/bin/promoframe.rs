use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "promoframe", version, about = "Render animated promo frames")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a PNG sequence plus `sequence.json` for an external encoder.
    Render(RenderArgs),
    /// Generate a scene JSON from an ad request and a template.
    Template(TemplateArgs),
}

#[derive(Args, Debug)]
struct SceneInput {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Asset root directory. Defaults to the scene file's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Font file (TTF/OTF). Falls back to $PROMOFRAME_FONT, system fonts, then built-in glyphs.
    #[arg(long)]
    font: Option<PathBuf>,

    /// Fail instead of skipping layers whose asset is missing.
    #[arg(long, default_value_t = false)]
    strict: bool,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    input: SceneInput,

    /// Frame index (0-based).
    #[arg(long, conflicts_with = "time")]
    frame: Option<u64>,

    /// Timestamp in seconds, instead of a frame index.
    #[arg(long)]
    time: Option<f64>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    input: SceneInput,

    /// Output directory for frames and the manifest.
    #[arg(long)]
    out_dir: PathBuf,

    /// First frame to render.
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// End frame (exclusive). Defaults to the scene length.
    #[arg(long)]
    end: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 32)]
    chunk_size: usize,
}

#[derive(Args, Debug)]
struct TemplateArgs {
    /// Ad request JSON (`hook`, `price`, `contact`, `ad_copy`, `product_asset`, `logo_asset`,
    /// `audio`).
    #[arg(long)]
    request: PathBuf,

    /// Preset name. Picked from the hook and `--seed` when omitted.
    #[arg(long)]
    name: Option<String>,

    /// Seed for template selection.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 1080)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 1920)]
    height: u32,

    /// Frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Duration in seconds.
    #[arg(long, default_value_t = 8.0)]
    duration: f64,

    /// Output scene JSON. Printed to stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Template(args) => cmd_template(args),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn load_scene(input: &SceneInput) -> anyhow::Result<promoframe::Scene> {
    let def = promoframe::SceneDef::from_path(&input.in_path)
        .with_context(|| format!("load scene '{}'", input.in_path.display()))?;
    let root = match &input.assets {
        Some(dir) => dir.clone(),
        None => input
            .in_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf(),
    };
    let assets = promoframe::DirAssets::new(root);
    let fonts = promoframe::FontLibrary::discover(input.font.as_deref());
    if fonts.is_builtin() {
        tracing::info!("no outline font available, using built-in glyphs");
    }

    let scene = promoframe::Scene::build(&def, &assets, &fonts)?;
    if input.strict {
        scene.require_complete()?;
    }
    Ok(scene)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.input)?;
    let frame = match (args.frame, args.time) {
        (_, Some(t)) => promoframe::render(&scene, t)?,
        (idx, None) => {
            let mut sess = promoframe::RenderSession::new(
                scene,
                promoframe::RenderSessionOpts::default(),
            )?;
            sess.render_frame(promoframe::FrameIndex(idx.unwrap_or(0)))?
        }
    };

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let scene = load_scene(&args.input)?;
    let opts = promoframe::RenderSessionOpts {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
        ..promoframe::RenderSessionOpts::default()
    };
    let mut sess = promoframe::RenderSession::new(scene, opts)?;

    let end = args.end.unwrap_or_else(|| sess.total_frames());
    let range = promoframe::FrameRange::new(
        promoframe::FrameIndex(args.start),
        promoframe::FrameIndex(end),
    )?;
    let mut sink = promoframe::PngSequenceSink::new(&args.out_dir);
    let stats = sess.render_range(range, &mut sink)?;

    eprintln!(
        "wrote {} frames to {}",
        stats.frames_rendered,
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_template(args: TemplateArgs) -> anyhow::Result<()> {
    let f = std::fs::File::open(&args.request)
        .with_context(|| format!("open ad request '{}'", args.request.display()))?;
    let req: promoframe::AdRequest = serde_json::from_reader(std::io::BufReader::new(f))
        .with_context(|| format!("parse ad request '{}'", args.request.display()))?;

    let template = match &args.name {
        Some(name) => promoframe::Template::by_name(name).with_context(|| {
            format!(
                "unknown template '{name}' (expected one of {})",
                promoframe::PRESET_NAMES.join(", ")
            )
        })?,
        None => promoframe::pick_template(&req.hook, args.seed),
    };
    tracing::debug!(template = template.name, "template selected");

    let canvas = promoframe::Canvas {
        width: args.width,
        height: args.height,
    };
    let fps = promoframe::Fps::new(args.fps, 1)?;
    let def = template.scene_def(&req, canvas, fps, args.duration)?;
    let json = def.to_json_pretty()?;

    match &args.out {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("write scene '{}'", path.display()))?;
            eprintln!("wrote {} ({} template)", path.display(), template.name);
        }
        None => println!("{json}"),
    }
    Ok(())
}
