//! Field sweep orchestration: config, progress, timed tile loading.
#![forbid(unsafe_code)]

mod cancel;
mod config;
mod loader;
mod progress;
mod sweep;

pub use cancel::CancelToken;
pub use config::{
    ConfigError, ExportConfig, LoaderConfig, MAX_GRID_WIDTH, MAX_RASTER_BYTES, MAX_TILE_EDGE,
    RasterConfig, SweepConfig,
};
pub use loader::TileLoader;
pub use progress::{ChannelProgress, LogProgress, Progress, ProgressEvent};
pub use sweep::{
    FieldSweep, IndexSource, PlacedTile, SkipReason, SkippedTile, SweepArtifacts, SweepError,
    SweepOutcome, SweepReport, SweepRequest, default_archive_dir, default_index_path,
};
