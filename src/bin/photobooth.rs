use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use photobooth::{
    BurstCaptureController, CameraProvider, CaptureEvent, Clock, CpuSurface, EditorSession,
    ExportedFile, Layout, ManualClock, PatternCamera, ReplayCamera, SessionConfig,
    StillExportFormat, SystemClock, session::STICKER_TRAY,
};

#[derive(Parser, Debug)]
#[command(name = "photobooth", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List strip layouts and how many shots each takes.
    Layouts,
    /// List the sticker tray glyphs usable in a config's `stickers`.
    Stickers,
    /// Run a capture session and export the strip.
    Shoot(ShootArgs),
}

#[derive(Parser, Debug)]
struct ShootArgs {
    /// Session config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output directory.
    #[arg(long)]
    out: PathBuf,

    /// Export format. Defaults to the config's still format.
    #[arg(long, value_enum)]
    format: Option<FormatChoice>,

    /// Frame source: `pattern` or a directory of JPEG/PNG stills to replay.
    #[arg(long, default_value = "pattern")]
    source: String,

    /// Wait for real countdown time instead of running on a virtual clock.
    #[arg(long)]
    realtime: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatChoice {
    Png,
    Jpg,
    Gif,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Layouts => cmd_layouts(),
        Command::Stickers => cmd_stickers(),
        Command::Shoot(args) => cmd_shoot(args),
    }
}

fn cmd_layouts() -> anyhow::Result<()> {
    for layout in Layout::ALL {
        let size = layout.geometry().size;
        println!(
            "{:<12} {} shots  {}x{}",
            layout.name(),
            layout.shot_count(),
            size.width.round(),
            size.height.round()
        );
    }
    Ok(())
}

fn cmd_stickers() -> anyhow::Result<()> {
    for (i, glyph) in STICKER_TRAY.iter().enumerate() {
        let code: Vec<String> = glyph.chars().map(|c| format!("U+{:04X}", u32::from(c))).collect();
        println!("{i:>2}  {glyph}  {}", code.join(" "));
    }
    Ok(())
}

fn cmd_shoot(args: ShootArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(path) => SessionConfig::from_path(path)?,
        None => SessionConfig::default(),
    };
    cfg.validate()?;

    let mut camera = open_source(&args.source)?;
    let mut clock: Box<dyn Clock> = if args.realtime {
        Box::new(SystemClock)
    } else {
        Box::new(ManualClock::new())
    };

    let controller = BurstCaptureController::new(cfg.capture_settings())?;
    let outcome = controller
        .run_with_camera(camera.as_mut(), None, clock.as_mut(), &mut print_event)
        .context("capture session")?;

    let mut session = EditorSession::from_capture(outcome, cfg.header());
    cfg.apply_to(&mut session)?;

    let mut surface = CpuSurface::default();
    let mut last = 0u8;
    let mut progress = |p: u8| {
        if p / 10 > last / 10 || p == 100 {
            eprintln!("export {p:>3}%");
        }
        last = p;
    };

    let format = args.format.unwrap_or(match cfg.still.format {
        StillExportFormat::Png => FormatChoice::Png,
        StillExportFormat::Jpeg => FormatChoice::Jpg,
    });
    let file: ExportedFile = match format {
        FormatChoice::Gif => {
            photobooth::export_gif(&mut session, &mut surface, &cfg.gif, &mut progress)?
        }
        FormatChoice::Png | FormatChoice::Jpg => {
            let mut opts = cfg.still.clone();
            opts.format = if matches!(format, FormatChoice::Jpg) {
                StillExportFormat::Jpeg
            } else {
                StillExportFormat::Png
            };
            photobooth::export_still(&mut session, &mut surface, &opts, &mut progress)?
        }
    };

    let path = file.write_to_dir(&args.out)?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn open_source(source: &str) -> anyhow::Result<Box<dyn CameraProvider>> {
    if source == "pattern" {
        return Ok(Box::new(PatternCamera::new(640, 480)));
    }
    let dir = Path::new(source);
    let replay = ReplayCamera::from_dir(dir)
        .with_context(|| format!("load replay stills from '{}'", dir.display()))?;
    Ok(Box::new(replay))
}

fn print_event(ev: &CaptureEvent) {
    match ev {
        CaptureEvent::Countdown { shot, remaining } => {
            eprintln!("shot {}: {remaining}", shot + 1)
        }
        CaptureEvent::Flash { shot } => eprintln!("shot {}: *flash*", shot + 1),
        CaptureEvent::BurstCommitted {
            shot,
            frames,
            dropped,
        } => eprintln!("shot {}: {frames} frames ({dropped} dropped)", shot + 1),
        CaptureEvent::Completed { bursts } => eprintln!("captured {bursts} bursts"),
    }
}
