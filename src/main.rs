use std::collections::BTreeSet;
use std::path::PathBuf;
use std::rc::Rc;

use canvas::doc::{Note, NoteId};
use canvas::engine::{Engine, EngineConfig};
use canvas::export;
use canvas::input::{Button, Modifiers};
use canvas::merge::MergeOutcome;
use clap::{Parser, Subcommand, ValueEnum};
use ideas::service::{IdeaError, LlmIdeaService};
use ideas::session::Session;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("idea service unavailable: {0}")]
    Service(#[from] IdeaError),
    #[error("could not read engine config: {0}")]
    ConfigRead(#[from] std::io::Error),
    #[error("invalid engine config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error("notes were not placed on the board")]
    NotPlaced,
    #[error("merge did not commit: {0:?}")]
    Merge(MergeOutcome),
    #[error("outline was not applied")]
    Outline,
}

#[derive(Parser, Debug)]
#[command(name = "ideaboard", about = "Headless idea board driven by an LLM")]
struct Cli {
    /// JSON file overriding engine thresholds and note sizes.
    #[arg(long, env = "IDEABOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Seed for placement jitter, tilt and colors.
    #[arg(long, env = "IDEABOARD_SEED")]
    seed: Option<u64>,

    #[arg(long, env = "IDEABOARD_VIEWPORT_WIDTH", default_value_t = 1280.0)]
    viewport_width: f64,

    #[arg(long, env = "IDEABOARD_VIEWPORT_HEIGHT", default_value_t = 800.0)]
    viewport_height: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate notes for a topic and print the board.
    Generate {
        topic: String,
        #[arg(long, value_enum, default_value_t = Format::Markdown)]
        format: Format,
        /// Also expand every generated note with related notes.
        #[arg(long)]
        expand: bool,
    },
    /// Merge two notes and print the combined content.
    Merge { a: String, b: String },
    /// Rewrite text as an outline.
    Outline { text: String },
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Format {
    Markdown,
    Svg,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenvy::dotenv() {
        debug!(error = %e, "no .env loaded");
    }

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => EngineConfig::default(),
    };
    let mut engine = match cli.seed {
        Some(seed) => Engine::with_seed(config, seed),
        None => Engine::new(config),
    };
    engine.set_viewport(cli.viewport_width, cli.viewport_height);

    let service = LlmIdeaService::from_env()?;
    let session = Session::new(engine, Rc::new(service));

    match cli.command {
        Command::Generate { topic, format, expand } => run_generate(&session, &topic, format, expand, cli.seed).await,
        Command::Merge { a, b } => run_merge(&session, a, b).await,
        Command::Outline { text } => run_outline(&session, text).await,
    }
}

async fn run_generate(
    session: &Session,
    topic: &str,
    format: Format,
    expand: bool,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let ids = session.generate_ideas(topic).await;
    if expand {
        for id in &ids {
            let related = session.expand_note(*id).await;
            info!(note_id = %id, count = related.len(), "cli: expanded");
        }
    }

    let engine = session.engine();
    let rendered = match format {
        Format::Markdown => export::to_markdown(&engine.scene, &BTreeSet::new()),
        Format::Svg => {
            let mut rng = seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
            export::to_svg(&engine.scene, &mut rng)
        }
    };
    println!("{rendered}");
    Ok(())
}

/// Lay out both notes, then drag `a` onto `b` the way a pointer would.
async fn run_merge(session: &Session, a: String, b: String) -> Result<(), CliError> {
    let (ids, _) = session.with_engine(|engine| engine.add_generated_notes(&[a, b]));
    let [source, target]: [NoteId; 2] = ids.try_into().map_err(|_| CliError::NotPlaced)?;

    let actions = session.with_engine(|engine| {
        let (Some(from), Some(to)) = (engine.note(&source).map(Note::center), engine.note(&target).map(Note::center)) else {
            return Vec::new();
        };
        let camera = engine.camera();
        let (from, to) = (camera.world_to_screen(from), camera.world_to_screen(to));
        engine.on_pointer_down(from, Button::Primary, Modifiers::default());
        engine.on_pointer_move(to);
        engine.on_pointer_up(to)
    });

    let outcome = session.dispatch(actions).await.into_iter().next().ok_or(CliError::NotPlaced)?;
    if outcome != MergeOutcome::Committed {
        return Err(CliError::Merge(outcome));
    }
    let engine = session.engine();
    let merged = engine.note(&target).map(|n| n.content.clone()).ok_or(CliError::NotPlaced)?;
    println!("{merged}");
    Ok(())
}

async fn run_outline(session: &Session, text: String) -> Result<(), CliError> {
    let (ids, _) = session.with_engine(|engine| engine.add_generated_notes(&[text]));
    let id = ids.first().copied().ok_or(CliError::NotPlaced)?;
    if !session.format_outline(id).await {
        return Err(CliError::Outline);
    }
    let engine = session.engine();
    let outline = engine.note(&id).map(|n| n.content.clone()).ok_or(CliError::NotPlaced)?;
    println!("{outline}");
    Ok(())
}
