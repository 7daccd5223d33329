use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use photoglyph::config::{AtlasOpts, GlyphOpts, VariantOpts};
use photoglyph::photo::VariantSet;

#[derive(Parser, Debug)]
#[command(name = "photoglyph", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print brightness, saturation and mean color of one image.
    Analyze(AnalyzeArgs),
    /// Copy an image into the store, analyze it and encode its variants.
    Ingest(IngestArgs),
    /// Re-analyze every stored original and regenerate its variants.
    Reindex(StoreArgs),
    /// Pack every catalogued photo into a new atlas and make it current.
    BuildAtlas(BuildAtlasArgs),
    /// Rasterize ticker text into a glyph mask PNG.
    Mask(MaskArgs),
    /// Run the ticker headless and dump frames as PNGs.
    Preview(PreviewArgs),
}

#[derive(Parser, Debug)]
struct AnalyzeArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct StoreArgs {
    /// Store root directory.
    #[arg(long, default_value = "photoglyph-data")]
    store: PathBuf,
}

#[derive(Parser, Debug)]
struct IngestArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Input image; stored under its file name.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct BuildAtlasArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Atlas cell edge in pixels.
    #[arg(long, default_value_t = AtlasOpts::default().cell_size)]
    cell_size: u32,

    /// Maximum atlas width in pixels.
    #[arg(long, default_value_t = AtlasOpts::default().max_width)]
    max_width: u32,
}

#[derive(Parser, Debug)]
struct MaskArgs {
    /// Font file (TTF/OTF).
    #[arg(long)]
    font: PathBuf,

    /// Text to rasterize.
    #[arg(long)]
    text: String,

    /// Glyph scale multiplier.
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    #[command(flatten)]
    store: StoreArgs,

    /// Font file (TTF/OTF).
    #[arg(long)]
    font: PathBuf,

    /// Settings JSON object (`ticker_text`, `scroll_speed`, ...).
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the ticker text.
    #[arg(long)]
    text: Option<String>,

    #[arg(long, default_value_t = 960)]
    width: u32,

    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Number of frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Simulated display refresh rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f64,

    /// Write every Nth presented frame.
    #[arg(long, default_value_t = 10)]
    every: usize,

    /// Hover the viewport center starting at this frame, leaving half a second later.
    #[arg(long)]
    hover_at: Option<u32>,

    /// Output directory for frame PNGs.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Analyze(args) => cmd_analyze(args),
        Command::Ingest(args) => cmd_ingest(args),
        Command::Reindex(args) => cmd_reindex(args),
        Command::BuildAtlas(args) => cmd_build_atlas(args),
        Command::Mask(args) => cmd_mask(args),
        Command::Preview(args) => cmd_preview(args),
    }
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .with_context(|| format!("'{}' has no usable file name", path.display()))
}

fn describe_missing(set: &VariantSet) -> String {
    set.missing()
        .iter()
        .map(|(size, enc)| format!("{}.{}", size.as_str(), enc.extension()))
        .collect::<Vec<_>>()
        .join(", ")
}

fn cmd_analyze(args: AnalyzeArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let stats = photoglyph::analyze_photo(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

fn cmd_ingest(args: IngestArgs) -> anyhow::Result<()> {
    let name = file_name(&args.in_path)?;
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let store = photoglyph::FsPhotoStore::open(&args.store.store)?;
    store.put_original(&name, &bytes)?;
    let record = photoglyph::ingest(&store, &name, &bytes, &VariantOpts::default())?;
    eprintln!(
        "ingested {} as #{} (luma {:.1}, saturation {:.3})",
        record.filename, record.id, record.luma, record.saturation
    );
    Ok(())
}

fn cmd_reindex(args: StoreArgs) -> anyhow::Result<()> {
    let store = photoglyph::FsPhotoStore::open(&args.store)?;
    let report = photoglyph::reindex(&store, &VariantOpts::default())?;
    for f in &report.failures {
        eprintln!("failed {}: {}", f.filename, f.message);
    }
    for record in photoglyph::PhotoStore::list_photos(&store)? {
        if !record.variants.is_complete() {
            eprintln!(
                "degraded {}: missing {}",
                record.filename,
                describe_missing(&record.variants)
            );
        }
    }
    eprintln!(
        "reindexed {}/{} photos",
        report.succeeded, report.processed
    );
    Ok(())
}

fn cmd_build_atlas(args: BuildAtlasArgs) -> anyhow::Result<()> {
    let photos = photoglyph::FsPhotoStore::open(&args.store.store)?;
    let atlases = photoglyph::FsAtlasStore::open(&args.store.store)?;
    let opts = AtlasOpts {
        cell_size: args.cell_size,
        max_width: args.max_width,
    };
    let build = photoglyph::build_atlas(&photos, &atlases, &opts)?;
    for f in &build.skipped {
        eprintln!("skipped {}: {}", f.filename, f.message);
    }
    let doc = &build.snapshot.document;
    eprintln!(
        "wrote atlas {} ({} tiles, {}x{})",
        doc.build_id, doc.tile_count, doc.width, doc.height
    );
    Ok(())
}

fn cmd_mask(args: MaskArgs) -> anyhow::Result<()> {
    let font = photoglyph::FontSource::load_blocking(&args.font)?;
    let mut rasterizer = photoglyph::GlyphRasterizer::new(font, GlyphOpts::default())?;
    let mask = rasterizer.rasterize(&args.text, args.scale)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    mask.to_image()
        .save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} ink pixels)",
        args.out.display(),
        mask.width(),
        mask.height(),
        mask.count_ones()
    );
    Ok(())
}

fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let settings = match &args.settings {
        Some(path) => photoglyph::Settings::from_path(path)?,
        None => photoglyph::Settings::new(),
    };
    let mut config = photoglyph::EngineConfig::from_settings(&settings)?;
    if let Some(text) = args.text {
        config.text = text;
    }
    anyhow::ensure!(args.fps > 0.0, "--fps must be > 0");

    let atlases = photoglyph::FsAtlasStore::open(&args.store.store)?;
    let loader = photoglyph::FsAssetLoader::new(&args.font, &atlases)?;
    let viewport = photoglyph::Viewport::new(args.width, args.height)?;
    let surface = photoglyph::PngSequenceSurface::new(&args.out, viewport, args.every);

    let mut engine = photoglyph::Engine::new(surface, config);
    engine.on_degrade(|signal| {
        tracing::warn!(fps = signal.fps, floor = signal.floor, "preview running below the fps floor");
    });
    engine.initialize_blocking(&loader)?;

    let dt = 1.0 / args.fps;
    let leave_at = args.hover_at.map(|f| f + (args.fps / 2.0).ceil() as u32);
    let center = viewport.center();
    for frame in 0..args.frames {
        if args.hover_at == Some(frame) {
            engine.pointer_move(center.x, center.y);
        }
        if leave_at == Some(frame) {
            engine.pointer_leave();
        }
        engine.tick(dt)?;
    }

    eprintln!(
        "rendered {} frames, wrote {} to {}",
        engine.frames_rendered(),
        engine.surface().written(),
        args.out.display()
    );
    engine.destroy();
    Ok(())
}
