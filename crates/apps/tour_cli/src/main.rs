use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use foundation::Point;
use interaction::{HotspotDraft, Placement};
use persistence::ImageFile;
use scene::{Direction, HotspotPatch, ScenePatch, TourData};
use store::{ResetOutcome, SceneImage, TourStore};
use tour_cli::{Backend, TourConfig, TourSession, build_adapter, build_auth};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tour", about = "Author and inspect a panoramic virtual tour")]
struct Cli {
    /// Overrides TOUR_BACKEND.
    #[arg(long, value_enum)]
    backend: Option<Backend>,

    /// Overrides TOUR_DATA_DIR.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Administrator identifier, required by editing commands.
    #[arg(long, global = true)]
    user: Option<String>,

    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List scenes in display order.
    List,
    /// Show one scene and its hotspots.
    Show { scene: String },
    AddScene {
        name: String,
        /// Panorama to upload for the new scene.
        #[arg(long)]
        image: Option<PathBuf>,
    },
    RemoveScene { scene: String },
    RenameScene { scene: String, name: String },
    AddHotspot {
        scene: String,
        name: String,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        direction: Option<String>,
    },
    MoveHotspot {
        scene: String,
        hotspot: String,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
    },
    RemoveHotspot { scene: String, hotspot: String },
    /// Replace a scene's panorama.
    SetImage { scene: String, file: PathBuf },
    /// Restore the default tour locally and in the backend.
    Reset,
    /// Print an argon2 hash for TOUR_ADMIN_PASSWORD_HASH.
    HashPassword { password: String },
}

impl Command {
    fn edits(&self) -> bool {
        !matches!(
            self,
            Command::List | Command::Show { .. } | Command::HashPassword { .. }
        )
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    if let Command::HashPassword { password } = &cli.command {
        // No tour needed; skip opening the store.
        println!("{}", auth::hash_password(password)?);
        return Ok(());
    }

    let mut config = TourConfig::from_env()?;
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(dir) = cli.data_dir.clone() {
        config = config.with_data_dir(dir);
    }
    info!(backend = ?config.backend, data_dir = %config.data_dir.display(), "opening tour");

    let (cache, adapter) = build_adapter(&config);
    let store = Arc::new(TourStore::open(cache, adapter).await.with_image_options(config.image));
    let session = TourSession::new(Arc::clone(&store), Arc::new(build_auth(&config)));

    if cli.command.edits() {
        let (Some(user), Some(password)) = (cli.user.as_deref(), cli.password.as_deref()) else {
            bail!("this command needs --user and --password");
        };
        session.sign_in(user, password).await?;
    }

    run(&session, cli.command).await?;
    store.flush().await;
    Ok(())
}

async fn run(session: &TourSession, command: Command) -> anyhow::Result<()> {
    match command {
        Command::List => print_list(&session.store().data()),
        Command::Show { scene } => {
            let data = session.store().data();
            let scene = data.scene(&scene).with_context(|| format!("no scene {scene:?}"))?;
            println!("{} ({})  {}", scene.name, scene.id, abbreviate(&scene.image));
            for h in &scene.hotspots {
                let target = h.target_scene.as_deref().unwrap_or("-");
                let direction = h.direction.map(Direction::as_str).unwrap_or("-");
                println!(
                    "  {:<24} {:>6.1} {:>6.1}  -> {:<12} {:<5} {}",
                    h.id, h.x, h.y, target, direction, h.name
                );
            }
        }
        Command::AddScene { name, image } => {
            let file = image.as_deref().map(read_image).transpose()?;
            let id = session.create_scene(&name, file).await?;
            println!("{id}");
        }
        Command::RemoveScene { scene } => session.editor()?.remove_scene(&scene)?,
        Command::RenameScene { scene, name } => {
            session.editor()?.update_scene(&scene, ScenePatch::name(name))?
        }
        Command::AddHotspot {
            scene,
            name,
            x,
            y,
            target,
            direction,
        } => {
            let mut draft = HotspotDraft::new(name);
            if let Some(target) = target {
                draft = draft.targeting(target);
            }
            if let Some(direction) = direction {
                draft = draft.direction(direction.parse().map_err(anyhow::Error::msg)?);
            }
            let hotspot = session.place_hotspot(&scene, draft, Placement::Percent(Point::new(x, y)))?;
            println!("{}", hotspot.id);
        }
        Command::MoveHotspot { scene, hotspot, x, y } => {
            let position = Point::new(x, y).clamp_pct();
            session
                .editor()?
                .update_hotspot(&scene, &hotspot, HotspotPatch::position(position))?
        }
        Command::RemoveHotspot { scene, hotspot } => {
            session.editor()?.remove_hotspot(&scene, &hotspot)?
        }
        Command::SetImage { scene, file } => match session.replace_image(&scene, read_image(&file)?).await? {
            SceneImage::Uploaded(url) => println!("{url}"),
            SceneImage::Inline(_) => println!("upload failed; image embedded inline"),
        },
        Command::Reset => match session.reset().await? {
            ResetOutcome::Remote => println!("tour reset"),
            ResetOutcome::LocalOnly(err) => {
                println!("backend reset failed ({err}); local tour reset")
            }
        },
        Command::HashPassword { password } => println!("{}", auth::hash_password(&password)?),
    }
    Ok(())
}

fn read_image(path: &std::path::Path) -> anyhow::Result<ImageFile> {
    ImageFile::from_path(path).with_context(|| format!("reading {}", path.display()))
}

fn print_list(data: &TourData) {
    for scene in &data.scenes {
        let marker = if scene.id == data.start_scene { "*" } else { " " };
        println!(
            "{marker} {:<16} {:<24} {} hotspots",
            scene.id,
            scene.name,
            scene.hotspots.len()
        );
    }
}

fn abbreviate(image: &str) -> String {
    if image.starts_with("data:") {
        let head: String = image.chars().take(32).collect();
        format!("{head}... ({} bytes)", image.len())
    } else {
        image.to_string()
    }
}
