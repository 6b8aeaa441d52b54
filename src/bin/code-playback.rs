use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use code_playback::encode::export::default_output_path;
use code_playback::encode::ffmpeg::is_ffmpeg_on_path;
use code_playback::playback::typewriter::{DEFAULT_RATE, RATE_RANGE};
use code_playback::source::server;
use code_playback::{
    Backend, CaptureConfig, FontChoice, Frame, FrameIndex, PlaybackSession, Rasterizer,
    SessionOpts, Settings, SourceFile, Theme, TreeNode, VideoContainer,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "code-playback",
    version,
    about = "Replay source files as typed code and record them to video"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List a repository tree.
    Tree(TreeArgs),
    /// Print a file's contents.
    Cat(CatArgs),
    /// Render a single capture frame as a PNG.
    Frame(FrameArgs),
    /// Type a file out, record it and export a video (requires `ffmpeg` on PATH).
    Record(RecordArgs),
    /// Serve the local-path JSON API.
    Serve(ServeArgs),
    /// List available themes.
    Themes,
}

#[derive(Args, Debug)]
struct RepoArgs {
    /// GitHub repository as `owner/repo` or a github.com URL.
    #[arg(long, conflicts_with = "local")]
    repo: Option<String>,

    /// Local directory to browse instead of GitHub.
    #[arg(long)]
    local: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct TreeArgs {
    #[command(flatten)]
    repo: RepoArgs,

    /// Directory to list, relative to the repository root.
    #[arg(long, default_value = "")]
    path: String,

    /// Descend into subdirectories.
    #[arg(long)]
    recursive: bool,

    /// Print JSON instead of an indented listing.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CatArgs {
    #[command(flatten)]
    repo: RepoArgs,

    /// File path relative to the repository root.
    path: String,
}

#[derive(Args, Debug)]
struct SourceArgs {
    #[command(flatten)]
    repo: RepoArgs,

    /// File path in the repository.
    #[arg(required_unless_present = "file")]
    path: Option<String>,

    /// Read a standalone file from disk instead of a repository.
    #[arg(long, conflicts_with_all = ["repo", "local"])]
    file: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Theme name (see `themes`). Defaults to the saved theme.
    #[arg(long)]
    theme: Option<Theme>,

    /// Monospace font file. Defaults to a common system font.
    #[arg(long, conflicts_with = "no_font")]
    font: Option<PathBuf>,

    /// Render without glyphs.
    #[arg(long)]
    no_font: bool,

    /// Pixel-density multiplier.
    #[arg(long, default_value_t = 3)]
    scale: u32,
}

impl RenderArgs {
    fn font_choice(&self) -> FontChoice {
        match (&self.font, self.no_font) {
            (_, true) => FontChoice::Disabled,
            (Some(p), false) => FontChoice::Path(p.clone()),
            (None, false) => FontChoice::Auto,
        }
    }

    fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            scale: self.scale,
            ..CaptureConfig::default()
        }
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Characters revealed. Defaults to the whole file (with the end cursor).
    #[arg(long)]
    chars: Option<usize>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[command(flatten)]
    source: SourceArgs,

    #[command(flatten)]
    render: RenderArgs,

    /// Typing speed in characters per second.
    #[arg(
        long,
        default_value_t = DEFAULT_RATE,
        value_parser = clap::value_parser!(u32)
            .range(i64::from(*RATE_RANGE.start())..=i64::from(*RATE_RANGE.end()))
    )]
    speed: u32,

    /// Output container.
    #[arg(long, default_value_t = VideoContainer::WebM)]
    container: VideoContainer,

    /// Output file. Defaults to a timestamped name in the current directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Keep recording this long after the last character appears.
    #[arg(long, default_value_t = 1000)]
    hold_ms: u64,
}

#[derive(Args, Debug)]
struct ServeArgs {
    /// Listen address.
    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,code_playback=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Tree(args) => cmd_tree(args).await,
        Command::Cat(args) => cmd_cat(args).await,
        Command::Frame(args) => cmd_frame(args).await,
        Command::Record(args) => cmd_record(args).await,
        Command::Serve(args) => cmd_serve(args).await,
        Command::Themes => {
            let current = Settings::load().theme;
            for theme in Theme::ALL {
                let mark = if theme == current { '*' } else { ' ' };
                println!("{mark} {:<16} {}", theme.slug(), theme.name());
            }
            Ok(())
        }
    }
}

/// Opens the requested backend, falling back to the last saved repository.
fn open_backend(args: &RepoArgs, settings: &mut Settings) -> anyhow::Result<Backend> {
    let backend = match (&args.repo, &args.local) {
        (Some(repo), _) => Backend::github(repo)?,
        (None, Some(dir)) => Backend::local(dir.clone())?,
        (None, None) => {
            let last = settings
                .last_repo
                .clone()
                .context("pass --repo or --local (no saved repository)")?;
            match settings.backend {
                code_playback::BackendKind::GitHub => Backend::github(&last)?,
                code_playback::BackendKind::Local => Backend::local(PathBuf::from(last))?,
            }
        }
    };

    let remembered = match (&args.repo, &args.local) {
        (Some(repo), _) => Some(repo.clone()),
        (None, Some(dir)) => Some(dir.display().to_string()),
        (None, None) => None,
    };
    if let Some(remembered) = remembered {
        settings.last_repo = Some(remembered);
        settings.backend = backend.kind();
    }
    Ok(backend)
}

fn save_settings(settings: &Settings) {
    if let Err(e) = settings.save() {
        tracing::warn!(error = %e, "could not save settings");
    }
}

async fn load_source(args: &SourceArgs, settings: &mut Settings) -> anyhow::Result<SourceFile> {
    if let Some(file) = &args.file {
        let text = std::fs::read_to_string(file)
            .with_context(|| format!("read '{}'", file.display()))?;
        let name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.display().to_string());
        return Ok(SourceFile::new(name, text));
    }

    let path = args
        .path
        .as_deref()
        .context("a file path is required")?;
    let backend = open_backend(&args.repo, settings)?;
    let file = backend.load_file(path).await?;
    save_settings(settings);
    Ok(file)
}

async fn cmd_tree(args: TreeArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load();
    let backend = open_backend(&args.repo, &mut settings)?;

    let roots = match (&backend, args.recursive) {
        (Backend::Local(dir), true) => dir.build_tree(&args.path)?,
        _ => {
            let mut roots = backend.list_children(&args.path).await?;
            if args.recursive {
                expand_all(&backend, &mut roots).await?;
            }
            roots
        }
    };
    save_settings(&settings);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&roots)?);
        return Ok(());
    }
    println!("{}", backend.label());
    print_tree(&roots, 1);
    Ok(())
}

/// Lazily fetches every directory below `nodes`, breadth-first.
async fn expand_all(backend: &Backend, nodes: &mut [TreeNode]) -> anyhow::Result<()> {
    let mut pending: Vec<String> = nodes
        .iter()
        .filter(|n| n.is_dir())
        .map(|n| n.path.clone())
        .collect();
    while let Some(path) = pending.pop() {
        let Some(node) = code_playback::source::tree::find_in_mut(nodes, &path) else {
            continue;
        };
        if backend.expand(node).await? {
            pending.extend(
                node.children
                    .iter()
                    .filter(|c| c.is_dir())
                    .map(|c| c.path.clone()),
            );
        }
    }
    Ok(())
}

fn print_tree(nodes: &[TreeNode], depth: usize) {
    for node in nodes {
        let suffix = if node.is_dir() { "/" } else { "" };
        println!("{}{}{suffix}", "  ".repeat(depth), node.name);
        print_tree(&node.children, depth + 1);
    }
}

async fn cmd_cat(args: CatArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load();
    let backend = open_backend(&args.repo, &mut settings)?;
    let text = backend.read_file(&args.path).await?;
    save_settings(&settings);
    print!("{text}");
    Ok(())
}

fn resolve_theme(requested: Option<Theme>, settings: &mut Settings) -> Theme {
    match requested {
        Some(theme) => {
            settings.theme = theme;
            theme
        }
        None => settings.theme,
    }
}

async fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let mut settings = Settings::load();
    let file = load_source(&args.source, &mut settings).await?;
    let theme = resolve_theme(args.render.theme, &mut settings);

    let total = file.text.chars().count();
    let shown = args.chars.unwrap_or(total).min(total);
    let end = file
        .text
        .char_indices()
        .nth(shown)
        .map_or(file.text.len(), |(i, _)| i);

    let mut raster = Rasterizer::new(
        args.render.capture_config(),
        theme,
        &args.render.font_choice(),
    )?;
    let rgba = raster.render(&file.text[..end], shown == total, &file.language)?;
    let frame = Frame::encode(FrameIndex(0), &rgba)?;
    write_png(&args.out, frame.png())?;

    save_settings(&settings);
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn write_png(out: &Path, png: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(out, png).with_context(|| format!("write png '{}'", out.display()))
}

async fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    if !is_ffmpeg_on_path() {
        anyhow::bail!("ffmpeg is required for video export, but was not found on PATH");
    }

    let mut settings = Settings::load();
    let file = load_source(&args.source, &mut settings).await?;
    let theme = resolve_theme(args.render.theme, &mut settings);
    save_settings(&settings);

    let opts = SessionOpts {
        capture: args.render.capture_config(),
        rate: args.speed,
        theme,
        font: args.render.font_choice(),
        ..SessionOpts::default()
    };
    let (session, task) = PlaybackSession::spawn(opts)?;

    let total = file.text.len();
    eprintln!(
        "recording {} ({} chars at {}/s)",
        file.path,
        file.text.chars().count(),
        args.speed
    );
    session.load(file).await?;
    let mut shown = session.subscribe();
    session.start_recording().await?;

    while shown.borrow_and_update().len() < total {
        shown
            .changed()
            .await
            .context("session ended during recording")?;
    }
    tokio::time::sleep(Duration::from_millis(args.hold_ms)).await;
    let frames = session.stop_recording().await?;
    eprintln!("captured {frames} frames, encoding...");

    let out = args
        .out
        .unwrap_or_else(|| default_output_path(Path::new("."), args.container));
    let report = session.export_file(&out, args.container).await?;
    session.shutdown().await?;
    task.await.context("session task failed")?;

    eprintln!(
        "wrote {} ({} frames, {:.1}s)",
        out.display(),
        report.written,
        report.duration().as_secs_f64()
    );
    Ok(())
}

async fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    eprintln!("listening on http://{}", args.addr);
    tokio::task::spawn_blocking(move || server::serve(&args.addr))
        .await
        .context("server thread failed")??;
    Ok(())
}
