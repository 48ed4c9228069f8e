use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use easel::{
    BitmapBuffer, EditorConfig, EditorDocument, EditorSession, ExportFormat, Scene, TrimOptions,
    effects::{Effect, effect_definitions},
};

#[derive(Parser, Debug)]
#[command(name = "easel", version)]
struct Cli {
    /// Log engine activity at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the effect catalog.
    Effects,
    /// Run one catalog effect over an image.
    Apply(ApplyArgs),
    /// Crop an image to its content.
    Trim(TrimArgs),
    /// Render a saved document to an image.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct OutArgs {
    /// Output image path. `.jpg`/`.jpeg` writes JPEG, anything else PNG.
    #[arg(long)]
    out: PathBuf,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

#[derive(Parser, Debug)]
struct ApplyArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    out: OutArgs,

    /// Catalog key, e.g. `sepia` or `box-blur`.
    #[arg(long)]
    effect: String,

    /// Effect parameter as `name=value`. Repeatable.
    #[arg(long = "param", value_parser = parse_param)]
    params: Vec<(String, f64)>,
}

#[derive(Parser, Debug)]
struct TrimArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    out: OutArgs,

    /// Pixels with alpha at or below this count as empty.
    #[arg(long, default_value_t = 0)]
    alpha_tolerance: u8,

    /// Treat near-white pixels as empty too.
    #[arg(long)]
    remove_white: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input document JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    out: OutArgs,

    /// Editor config JSON.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_param(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{s}'"))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for '{name}': {e}"))?;
    Ok((name.trim().to_owned(), value))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Effects => cmd_effects(),
        Command::Apply(args) => cmd_apply(args),
        Command::Trim(args) => cmd_trim(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn cmd_effects() -> anyhow::Result<()> {
    for def in effect_definitions() {
        let params: Vec<String> = def
            .params
            .iter()
            .map(|p| format!("{}={} [{}..{}]", p.name, p.default, p.min, p.max))
            .collect();
        println!("{:<18} {:<10} {}", def.key, def.category.key(), params.join(" "));
    }
    Ok(())
}

fn read_image(path: &Path) -> anyhow::Result<BitmapBuffer> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    BitmapBuffer::decode(&bytes).with_context(|| format!("decode image '{}'", path.display()))
}

fn write_image(bitmap: &BitmapBuffer, out: &OutArgs) -> anyhow::Result<()> {
    let is_jpeg = out
        .out
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
    let format = if is_jpeg {
        ExportFormat::Jpeg {
            quality: out.quality.clamp(1, 100),
        }
    } else {
        ExportFormat::Png
    };
    let bytes = bitmap.encode(format)?;

    if let Some(parent) = out.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&out.out, bytes)
        .with_context(|| format!("write image '{}'", out.out.display()))?;

    eprintln!("wrote {}", out.out.display());
    Ok(())
}

fn cmd_apply(args: ApplyArgs) -> anyhow::Result<()> {
    let src = read_image(&args.in_path)?;
    let params: BTreeMap<String, f64> = args.params.into_iter().collect();
    let effect = Effect::parse(&args.effect, &params)?;
    let out = effect.apply(&src)?;
    write_image(&out, &args.out)
}

fn cmd_trim(args: TrimArgs) -> anyhow::Result<()> {
    let src = read_image(&args.in_path)?;
    let opts = TrimOptions {
        alpha_tolerance: args.alpha_tolerance,
        remove_white: args.remove_white,
    };
    let (out, bounds) = easel::effects::trim(&src, opts)?;
    eprintln!(
        "trimmed top={} left={} bottom={} right={} -> {}x{}",
        bounds.top, bounds.left, bounds.bottom, bounds.right, bounds.width, bounds.height
    );
    write_image(&out, &args.out)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let json = std::fs::read_to_string(&args.in_path)
        .with_context(|| format!("read document '{}'", args.in_path.display()))?;
    let doc = EditorDocument::from_json_str(&json).with_context(|| "parse document JSON")?;
    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };

    let mut session = EditorSession::attach(Scene::new(1, 1)?, config)?;
    session.load_document(&doc)?;
    let frame = session.render()?;
    write_image(&frame, &args.out)
}
