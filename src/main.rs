use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use fieldmap_index::SectionCode;
use fieldmap_pack::DirArchive;
use fieldmap_raster::HEIGHT_SCALE;
use fieldmap_runtime::{
    FieldSweep, IndexSource, LogProgress, SweepConfig, SweepRequest, default_archive_dir,
    default_index_path,
};
use simplelog::{ColorChoice, CombinedLogger, LevelFilter, TermLogger, TerminalMode, WriteLogger};

#[derive(Parser, Debug)]
#[command(name = "fieldmap")]
#[command(about = "Composite a terrain field's height tiles into one .r16 heightmap")]
struct Args {
    /// Game dump root (the directory holding `content/`); needed unless
    /// both --index and --archive are given
    #[arg(long)]
    game: Option<PathBuf>,

    #[arg(long, default_value = "MainField")]
    field: String,

    /// LOD level, 0 (coarsest) to 8 (finest); out-of-range values are clamped
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    level: i32,

    /// Section to return placed tiles for, e.g. A-1
    #[arg(long)]
    section: Option<SectionCode>,

    /// Output directory (overrides the config file)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Sweep config TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Also write the material weight PNG
    #[arg(long)]
    weights: bool,

    /// Explicit TSCB path instead of the one under --game
    #[arg(long)]
    index: Option<PathBuf>,

    /// Unpacked tile directory instead of the one under --game
    #[arg(long)]
    archive: Option<PathBuf>,

    /// Also log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Print the effective config and exit
    #[arg(long)]
    print_config: bool,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
#[error("--game is required to locate the default {0}; pass --game or --{0}")]
struct MissingGameRoot(&'static str);

/// Explicit path if given, otherwise the default under the game root.
fn resolve_input(
    explicit: Option<&Path>,
    game: Option<&Path>,
    flag: &'static str,
    default: impl FnOnce(&Path) -> PathBuf,
) -> Result<PathBuf, MissingGameRoot> {
    match (explicit, game) {
        (Some(path), _) => Ok(path.to_path_buf()),
        (None, Some(root)) => Ok(default(root)),
        (None, None) => Err(MissingGameRoot(flag)),
    }
}

fn init_logging(log_file: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    match log_file {
        Some(path) => {
            CombinedLogger::init(vec![
                TermLogger::new(
                    LevelFilter::Info,
                    simplelog::Config::default(),
                    TerminalMode::Mixed,
                    ColorChoice::Auto,
                ),
                WriteLogger::new(
                    LevelFilter::Debug,
                    simplelog::Config::default(),
                    File::create(path)?,
                ),
            ])?;
        }
        None => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
                .init();
        }
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let mut config = match &args.config {
        Some(path) => SweepConfig::from_path(path)?,
        None => SweepConfig::default(),
    };
    if let Some(out) = &args.out {
        config.export.out_dir = out.clone();
    }
    if args.weights {
        config.export.weights = true;
    }
    if args.print_config {
        print!("{}", config.to_toml_string()?);
        return Ok(());
    }

    let game = args.game.as_deref();
    let index = resolve_input(args.index.as_deref(), game, "index", |root| {
        default_index_path(root, &args.field)
    })?;
    let archive_dir = resolve_input(args.archive.as_deref(), game, "archive", |root| {
        default_archive_dir(root, &args.field)
    })?;
    log::info!("index {}, tiles from {}", index.display(), archive_dir.display());

    let request = SweepRequest {
        field: args.field.clone(),
        level: args.level,
        section: args.section,
    };
    let outcome = FieldSweep::new(
        config,
        IndexSource::Path(index),
        Arc::new(DirArchive::new(archive_dir)),
    )
    .with_progress(LogProgress)
    .run(&request)?;

    for (reason, count) in outcome.report.skipped_by() {
        log::warn!("{count} tiles skipped: {reason:?}");
    }
    if let Some((lo, hi)) = outcome.report.height_range_m {
        log::info!("height range {lo:.2} m .. {hi:.2} m (scale {HEIGHT_SCALE})");
    }
    if let Some(code) = args.section {
        log::info!("{} tiles placed for section {code}", outcome.placed.len());
    }
    log::info!("heightmap: {}", outcome.artifacts.heightmap.display());
    if let Some(png) = &outcome.artifacts.weightmap {
        log::info!("weightmap: {}", png.display());
    }
    Ok(())
}
