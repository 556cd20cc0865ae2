use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sceneforge", version)]
struct Cli {
    /// Editor configuration JSON. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory relative resource URLs resolve against. Defaults to the scene's directory.
    #[arg(long, global = true)]
    assets: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check a scene document without loading resources.
    Validate(InArgs),
    /// Render a scene at frame size as a PNG.
    Render(RenderArgs),
    /// Render a scene scaled to fit a square box as a PNG.
    Thumbnail(ThumbnailArgs),
    /// Render one layer of a scene, cropped to its bounds, as a PNG.
    Layer(LayerArgs),
    /// Load a scene into an editor and write back what it exports.
    Roundtrip(RoundtripArgs),
}

#[derive(Parser, Debug)]
struct InArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct ThumbnailArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Longest output side in pixels.
    #[arg(long, default_value_t = 256)]
    size: u32,
}

#[derive(Parser, Debug)]
struct LayerArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Id of the layer to render.
    #[arg(long)]
    id: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Output pixels per layer unit.
    #[arg(long, default_value_t = 1.0)]
    multiplier: f64,

    /// CSS color painted behind the layer.
    #[arg(long)]
    background: Option<String>,
}

#[derive(Parser, Debug)]
struct RoundtripArgs {
    /// Input scene JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output scene JSON; stdout when omitted.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match &cli.cmd {
        Command::Validate(args) => cmd_validate(args),
        Command::Render(args) => cmd_render(&cli, args).await,
        Command::Thumbnail(args) => cmd_thumbnail(&cli, args).await,
        Command::Layer(args) => cmd_layer(&cli, args).await,
        Command::Roundtrip(args) => cmd_roundtrip(&cli, args).await,
    }
}

fn read_scene(path: &Path) -> anyhow::Result<sceneforge::Scene> {
    let scene = sceneforge::Scene::from_path(path)
        .with_context(|| format!("read scene '{}'", path.display()))?;
    scene.validate()?;
    Ok(scene)
}

fn load_config(cli: &Cli, scene_path: &Path) -> anyhow::Result<sceneforge::EditorConfig> {
    let mut config = match &cli.config {
        Some(path) => sceneforge::EditorConfig::from_path(path)?,
        None => sceneforge::EditorConfig::default(),
    };
    config.assets_root = match &cli.assets {
        Some(dir) => dir.clone(),
        None => scene_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    Ok(config)
}

fn make_renderer(cli: &Cli, scene_path: &Path) -> anyhow::Result<sceneforge::Renderer> {
    let config = load_config(cli, scene_path)?;
    let loader = sceneforge::FsResourceLoader::new(config.assets_root);
    Ok(sceneforge::Renderer::new(Arc::new(loader)))
}

fn write_png(frame: &sceneforge::FrameRGBA, out: &Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let png = frame.to_png()?;
    std::fs::write(out, png).with_context(|| format!("write png '{}'", out.display()))?;
    eprintln!("wrote {} ({}x{})", out.display(), frame.width, frame.height);
    Ok(())
}

fn cmd_validate(args: &InArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    eprintln!(
        "ok: {} layers, frame {}x{}, animated: {}",
        scene.layers.len(),
        scene.frame.width,
        scene.frame.height,
        sceneforge::contains_animation(&scene.layers)
    );
    Ok(())
}

async fn cmd_render(cli: &Cli, args: &RenderArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let renderer = make_renderer(cli, &args.in_path)?;
    let frame = renderer.render_canvas(&scene).await?;
    write_png(&frame, &args.out)
}

async fn cmd_thumbnail(cli: &Cli, args: &ThumbnailArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let renderer = make_renderer(cli, &args.in_path)?;
    let frame = renderer.render_thumbnail(&scene, args.size).await?;
    write_png(&frame, &args.out)
}

async fn cmd_layer(cli: &Cli, args: &LayerArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let layer = scene
        .find_layer(&args.id)
        .with_context(|| format!("no layer with id '{}'", args.id))?;
    let renderer = make_renderer(cli, &args.in_path)?;
    let params = sceneforge::RenderLayerParams {
        multiplier: args.multiplier,
        background: args.background.clone(),
    };
    let frame = renderer.render_layer_frame(layer, &params).await?;
    write_png(&frame, &args.out)
}

async fn cmd_roundtrip(cli: &Cli, args: &RoundtripArgs) -> anyhow::Result<()> {
    let scene = read_scene(&args.in_path)?;
    let config = load_config(cli, &args.in_path)?;
    let editor = sceneforge::Editor::with_fs_loader(config)?;
    let report = editor.scene().import_from_json(&scene).await?;
    for failure in &report.failed {
        eprintln!(
            "skipped layer #{} ({}, id {:?}): {}",
            failure.index, failure.layer_type, failure.id, failure.error
        );
    }
    let exported = editor.scene().export_to_json().await;
    match &args.out {
        Some(path) => exported.to_path(path)?,
        None => println!("{}", exported.to_json_string()?),
    }
    Ok(())
}
