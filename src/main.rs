mod host;
mod replay;
mod script;


use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use viewer::engine::{EngineCore, ViewerConfig};
use viewer::map_index::{MapIndex, MapIndexError};
use viewer::mesh::{JsonMeshProvider, MeshLoadError};
use viewer::render::Frame;

use crate::host::HeadlessHost;
use crate::replay::Replay;
use crate::script::ScriptError;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("map index: {0}")]
    MapIndex(#[from] MapIndexError),
    #[error("{0}")]
    Script(#[from] ScriptError),
    #[error("initial map: {0}")]
    Mesh(#[from] MeshLoadError),
    #[error("map {0} is not in the map index")]
    UnknownMap(u32),
    #[error("invalid viewport {width}x{height}")]
    InvalidViewport { width: f64, height: f64 },
    #[error("no frame was presented")]
    NoFrame,
    #[error("i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "pathview", about = "Pathing mesh viewer: map index and headless replay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the selectable maps.
    Maps(MapsArgs),
    /// Run a JSON-lines script through the viewer without a window.
    Replay(ReplayArgs),
}

#[derive(Args, Debug)]
struct MapsArgs {
    #[arg(long, env = "PATHVIEW_MAP_INDEX")]
    index: PathBuf,
}

#[derive(Args, Debug)]
struct ReplayArgs {
    #[arg(long, env = "PATHVIEW_MESH_DIR")]
    mesh_dir: PathBuf,

    #[arg(long, help = "Script file, one JSON step per line")]
    script: PathBuf,

    #[arg(long, help = "Mesh file id to load before the script runs")]
    file_id: Option<u32>,

    #[arg(long, env = "PATHVIEW_MAP_INDEX", help = "Map index used to resolve --map-id")]
    map_index: Option<PathBuf>,

    #[arg(
        long,
        requires = "map_index",
        conflicts_with = "file_id",
        help = "Map to load before the script runs, centred on its spawn point"
    )]
    map_id: Option<u32>,

    #[arg(long, default_value_t = viewer::consts::DEFAULT_VIEWPORT_WIDTH)]
    width: f64,

    #[arg(long, default_value_t = viewer::consts::DEFAULT_VIEWPORT_HEIGHT)]
    height: f64,

    #[arg(long, help = "Write the last presented frame as JSON")]
    frame_out: Option<PathBuf>,

    #[arg(long, default_value_t = false, help = "Print waypoints in clipboard format")]
    waypoints: bool,
}

fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Maps(args) => run_maps(&args),
        Command::Replay(args) => run_replay(&args),
    }
}

fn run_maps(args: &MapsArgs) -> Result<(), CliError> {
    let index = MapIndex::load(&args.index)?;
    print_json(index.records())
}

fn run_replay(args: &ReplayArgs) -> Result<(), CliError> {
    if !(args.width > 0.0 && args.height > 0.0) {
        return Err(CliError::InvalidViewport { width: args.width, height: args.height });
    }

    let steps = script::load(&args.script)?;
    let provider = JsonMeshProvider::new(&args.mesh_dir);
    let mut core = EngineCore::new(ViewerConfig { width: args.width, height: args.height, ..ViewerConfig::default() });
    if let Some(file_id) = args.file_id {
        core.select_map(&provider, file_id)?;
    }
    if let (Some(map_id), Some(index_path)) = (args.map_id, &args.map_index) {
        select_indexed_map(&mut core, &provider, index_path, map_id)?;
    }

    let mut host = HeadlessHost::new();
    let summary = Replay::new(&mut core, &mut host, &provider).run(steps);
    tracing::info!(ticks = summary.ticks, frames = summary.frames, quit_early = summary.quit_early, "replay finished");

    print_json(&core.info())?;
    if args.waypoints {
        print!("{}", core.waypoints_clipboard_text());
    }

    if let Some(path) = &args.frame_out {
        let frame = host.last_frame().ok_or(CliError::NoFrame)?;
        write_frame(path, frame)?;
        tracing::info!(path = %path.display(), commands = frame.commands.len(), "frame written");
    }
    Ok(())
}

/// Load `map_id` from the index at `index_path` and centre on its spawn point.
fn select_indexed_map(
    core: &mut EngineCore,
    provider: &JsonMeshProvider,
    index_path: &Path,
    map_id: u32,
) -> Result<(), CliError> {
    let index = MapIndex::load(index_path)?;
    let record = index.by_map_id(map_id).ok_or(CliError::UnknownMap(map_id))?;
    core.select_map_record(provider, record)?;
    Ok(())
}

fn write_frame(path: &Path, frame: &Frame) -> Result<(), CliError> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, frame)?;
    writer.flush()?;
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
