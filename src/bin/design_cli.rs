//! Terminal client for the interior design server.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tracing::warn;

use interior_design_ai::client::download::save_image;
use interior_design_ai::client::identity::{default_identity_path, load_or_register};
use interior_design_ai::client::{
    BatchQueue, DesignClient, DesignSession, ImageFile, ProcessingMode, ProgressTracker,
};
use interior_design_ai::image_processing::extension_from_mime_type;
use interior_design_ai::logging;
use interior_design_ai::presets::{
    ROOMS, STYLE_PRESETS, THEMES, canonical_room, canonical_theme, find_preset,
};
use interior_design_ai::settings::DesignSettings;

const PROGRESS_INTERVAL: Duration = Duration::from_secs(8);

#[derive(Parser, Debug)]
#[command(name = "interior-design")]
#[command(about = "Restyle room photos with the interior design server")]
#[command(version)]
struct Cli {
    /// Base URL of the design server
    #[arg(long, global = true, env = "DESIGN_SERVER_URL", default_value = "http://localhost:3000")]
    server: String,

    /// Give up on a request after this many seconds
    #[arg(long, global = true, default_value_t = 300)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Design one room photo (`-` reads an image or a data URI from stdin)
    Design(DesignArgs),
    /// Design up to 10 photos one after another
    Batch(BatchArgs),
    /// Show your saved designs
    History {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// List styles, room types and presets
    Presets,
    /// Print the owner id this machine uses
    Whoami,
}

#[derive(Args, Debug)]
struct StyleArgs {
    #[arg(long, default_value = "Modern")]
    theme: String,
    #[arg(long, default_value = "Living Room")]
    room: String,
}

#[derive(Args, Debug)]
struct DesignArgs {
    image: String,

    #[command(flatten)]
    style: StyleArgs,

    /// Start from a preset (see `presets`)
    #[arg(long)]
    preset: Option<String>,

    /// Ask for three variations instead of one design
    #[arg(long)]
    variations: bool,

    #[arg(long)]
    strength: Option<f32>,
    #[arg(long)]
    guidance_scale: Option<f32>,
    #[arg(long)]
    steps: Option<u32>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    upscale: bool,
    #[arg(long)]
    preserve_colors: bool,
    #[arg(long)]
    no_lighting: bool,

    /// Where to write the result (variations get a numeric suffix)
    #[arg(short, long, default_value = "design.png")]
    output: PathBuf,

    /// Do not save the result to your history
    #[arg(long)]
    no_history: bool,
}

#[derive(Args, Debug)]
struct BatchArgs {
    #[arg(required = true)]
    images: Vec<PathBuf>,

    #[command(flatten)]
    style: StyleArgs,

    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    logging::init("warn");

    let cli = Cli::parse();
    let client = DesignClient::new(&cli.server).with_timeout(Duration::from_secs(cli.timeout_secs));

    match cli.command {
        Command::Design(args) => run_design(&client, args).await,
        Command::Batch(args) => run_batch(&client, args).await,
        Command::History { limit } => run_history(&client, limit).await,
        Command::Presets => {
            print_catalogue();
            Ok(())
        }
        Command::Whoami => {
            let path = identity_path()?;
            let owner = load_or_register(&path, &client).await?;
            println!("{owner}");
            println!("stored in {}", path.display());
            Ok(())
        }
    }
}

fn identity_path() -> Result<PathBuf> {
    default_identity_path().ok_or_else(|| anyhow!("no config directory available for the owner id"))
}

fn resolve_style(style: &StyleArgs) -> (String, String) {
    let theme = canonical_theme(&style.theme).map(str::to_string).unwrap_or_else(|| {
        warn!(theme = %style.theme, "theme is not in the catalogue, sending as given");
        style.theme.clone()
    });
    let room = canonical_room(&style.room).map(str::to_string).unwrap_or_else(|| {
        warn!(room = %style.room, "room is not in the catalogue, sending as given");
        style.room.clone()
    });
    (theme, room)
}

/// Defaults, then the preset, then explicit flags; tagged with style and room.
fn build_settings(args: &DesignArgs, theme: &str, room: &str) -> Result<Value> {
    let preset = match args.preset.as_deref() {
        Some(id) => Some(find_preset(id).ok_or_else(|| anyhow!("unknown preset {id:?}"))?),
        None => None,
    };
    let mut settings = DesignSettings::default();
    if let Some(preset) = preset {
        settings = preset.apply_to(settings);
    }
    if let Some(strength) = args.strength {
        settings.strength = strength;
    }
    if let Some(guidance_scale) = args.guidance_scale {
        settings.guidance_scale = guidance_scale;
    }
    if let Some(steps) = args.steps {
        settings.steps = steps;
    }
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }
    settings.enable_upscaling |= args.upscale;
    settings.preserve_colors |= args.preserve_colors;
    if args.no_lighting {
        settings.enhance_lighting = false;
    }
    Ok(settings.clamped().to_request_value(theme, room))
}

async fn read_input(image: &str) -> Result<ImageFile> {
    if image != "-" {
        return ImageFile::from_path(image)
            .await
            .map_err(|err| anyhow!("{image}: {err}"));
    }
    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("read image from stdin")?;
    if let Ok(text) = std::str::from_utf8(&bytes) {
        if let Some(file) = ImageFile::from_pasted_text(text) {
            return Ok(file);
        }
    }
    Ok(ImageFile::from_bytes("stdin", bytes))
}

fn numbered_path(base: &Path, n: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "design".to_string());
    let ext = base
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    base.with_file_name(format!("{stem}_{n}.{ext}"))
}

/// Give an extension-less output path one matching the image's data URI type.
fn output_path_for(base: &Path, image: &str) -> PathBuf {
    if base.extension().is_some() {
        return base.to_path_buf();
    }
    let ext = image
        .strip_prefix("data:")
        .and_then(|rest| rest.split([';', ',']).next())
        .map(extension_from_mime_type)
        .filter(|ext| *ext != "bin")
        .unwrap_or("png");
    base.with_extension(ext)
}

async fn run_design(client: &DesignClient, args: DesignArgs) -> Result<()> {
    let (theme, room) = resolve_style(&args.style);
    let settings = build_settings(&args, &theme, &room)?;
    let mode = if args.variations {
        ProcessingMode::Variations
    } else {
        ProcessingMode::Single
    };
    let owner = if args.no_history {
        None
    } else {
        match default_identity_path() {
            Some(path) => Some(load_or_register(&path, client).await?),
            None => {
                warn!("no config directory, result will not be saved to history");
                None
            }
        }
    };

    let mut session = DesignSession::new();
    let file = read_input(&args.image).await?;
    eprintln!("{} ({})", file.name, file.display_size());
    session.load(file).await?;

    let mut tracker = ProgressTracker::new();
    eprintln!("[{:>3}%] {}", tracker.percent(), tracker.current_phase());
    let outcome = {
        let submit = session.submit(
            client,
            &theme,
            &room,
            Some(&settings),
            owner.as_deref(),
            mode,
        );
        tokio::pin!(submit);
        let mut ticker = tokio::time::interval(PROGRESS_INTERVAL);
        ticker.tick().await;
        loop {
            tokio::select! {
                result = &mut submit => break result,
                _ = ticker.tick() => {
                    tracker.advance();
                    eprintln!("[{:>3}%] {}", tracker.percent(), tracker.current_phase());
                }
            }
        }
    }?;
    tracker.complete();
    eprintln!("[{:>3}%] {}", tracker.percent(), tracker.current_phase());

    if outcome.variations.is_empty() {
        let path = output_path_for(&args.output, &outcome.output_image);
        save_image(client.http(), &outcome.output_image, &path).await?;
        println!("{}", path.display());
    } else {
        for (index, variation) in outcome.variations.iter().enumerate() {
            let path = numbered_path(&args.output, index + 1);
            save_image(client.http(), variation, &path).await?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn run_batch(client: &DesignClient, args: BatchArgs) -> Result<()> {
    let (theme, room) = resolve_style(&args.style);
    let mut queue = BatchQueue::new();
    for path in &args.images {
        let file = ImageFile::from_path(path)
            .await
            .map_err(|err| anyhow!("{}: {err}", path.display()))?;
        queue
            .add(file)
            .map_err(|err| anyhow!("{}: {err}", path.display()))?;
    }

    queue
        .process(client, &theme, &room, |index, item| {
            let detail = item
                .error
                .as_ref()
                .map(|err| format!(" ({err})"))
                .unwrap_or_default();
            eprintln!("{:>2}. {} {}{detail}", index + 1, item.file.name, item.status.label());
        })
        .await;

    let written = queue.download_all(client.http(), &args.output_dir).await?;
    for path in &written {
        println!("{}", path.display());
    }
    if written.is_empty() {
        bail!("no image in the batch could be designed");
    }
    Ok(())
}

async fn run_history(client: &DesignClient, limit: usize) -> Result<()> {
    let path = identity_path()?;
    let owner = load_or_register(&path, client).await?;
    let records = client.history(&owner).await?;
    if records.is_empty() {
        println!("no saved designs yet");
        return Ok(());
    }
    for record in records.iter().take(limit) {
        let image = if record.image_url.starts_with("data:") {
            "(inline image)"
        } else {
            record.image_url.as_str()
        };
        println!("{}  {}", record.created_at.format("%Y-%m-%d %H:%M:%S"), image);
    }
    Ok(())
}

fn print_catalogue() {
    println!("Themes: {}", THEMES.join(", "));
    println!("Rooms:  {}", ROOMS.join(", "));
    println!();
    for preset in &STYLE_PRESETS {
        println!(
            "{:<18} {} / {}  strength {} guidance {}  {}",
            preset.id, preset.style, preset.room_type, preset.strength, preset.guidance_scale, preset.description
        );
    }
}
