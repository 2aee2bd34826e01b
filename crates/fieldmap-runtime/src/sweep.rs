use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use fieldmap_geom::Vec2;
use fieldmap_index::{IndexError, LodLevel, SectionCode, TileIndex, tiles_for_section};
use fieldmap_pack::{Archive, ResourceLayout, TileError, TileResources};
use fieldmap_raster::{
    Compositor, ExportError, PlaceError, TileCell, height_meters, write_r16, write_weight_png,
};
use hashbrown::HashMap;

use crate::cancel::CancelToken;
use crate::config::{ConfigError, SweepConfig};
use crate::loader::TileLoader;
use crate::progress::Progress;

/// `<game>/content/Terrain/A/<field>.tscb`
pub fn default_index_path(game_root: impl AsRef<Path>, field: &str) -> PathBuf {
    game_root
        .as_ref()
        .join("content")
        .join("Terrain")
        .join("A")
        .join(format!("{field}.tscb"))
}

/// Unpacked tile archive for a field, `<game>/content/Terrain/A/<field>/`.
pub fn default_archive_dir(game_root: impl AsRef<Path>, field: &str) -> PathBuf {
    game_root
        .as_ref()
        .join("content")
        .join("Terrain")
        .join("A")
        .join(field)
}

#[derive(thiserror::Error, Debug)]
pub enum SweepError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    #[error("tile index: {0}")]
    Index(#[from] IndexError),

    #[error("sweep cancelled")]
    Cancelled,

    #[error("export: {0}")]
    Export(#[from] ExportError),

    #[error("start loader worker: {0}")]
    Worker(#[source] std::io::Error),
}

pub enum IndexSource {
    Path(PathBuf),
    Loaded(TileIndex),
}

impl IndexSource {
    fn load(self) -> Result<TileIndex, IndexError> {
        match self {
            IndexSource::Path(path) => TileIndex::from_path(path),
            IndexSource::Loaded(index) => Ok(index),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepRequest {
    pub field: String,
    /// Clamped to the LOD table, never rejected.
    pub level: i32,
    /// Section whose tiles are returned as [`PlacedTile`]s.
    pub section: Option<SectionCode>,
}

/// A tile of the requested section, positioned for a renderer.
#[derive(Clone, Debug)]
pub struct PlacedTile {
    pub name: String,
    pub section: SectionCode,
    pub cell: TileCell,
    /// World units.
    pub position: Vec2,
    /// World units per tile edge.
    pub scale: f32,
    pub resources: TileResources,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SkipReason {
    MissingMesh,
    MeshSize,
    ArchiveRead,
    Timeout,
    LoaderGone,
    OutOfBounds,
    BufferSize,
}

impl From<&TileError> for SkipReason {
    fn from(e: &TileError) -> Self {
        match e {
            TileError::MissingTileMesh { .. } => SkipReason::MissingMesh,
            TileError::MeshSizeMismatch { .. } => SkipReason::MeshSize,
            TileError::ArchiveReadFailure { .. } => SkipReason::ArchiveRead,
            TileError::Timeout { .. } => SkipReason::Timeout,
            TileError::WorkerUnavailable { .. } => SkipReason::LoaderGone,
        }
    }
}

impl From<&PlaceError> for SkipReason {
    fn from(e: &PlaceError) -> Self {
        match e {
            PlaceError::TileOutOfBounds { .. } => SkipReason::OutOfBounds,
            PlaceError::BufferSize { .. } => SkipReason::BufferSize,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SkippedTile {
    pub name: String,
    pub section: SectionCode,
    pub reason: SkipReason,
}

#[derive(Clone, Debug, Default)]
pub struct SweepReport {
    pub sections: usize,
    pub tiles_seen: usize,
    pub placed: usize,
    pub skipped: Vec<SkippedTile>,
    /// Min and max height over the whole raster, in metres.
    pub height_range_m: Option<(f32, f32)>,
}

impl SweepReport {
    pub fn skipped_by(&self) -> HashMap<SkipReason, usize> {
        let mut counts = HashMap::new();
        for s in &self.skipped {
            *counts.entry(s.reason).or_insert(0) += 1;
        }
        counts
    }

    fn skip(&mut self, name: &str, section: SectionCode, reason: SkipReason) {
        self.skipped.push(SkippedTile {
            name: name.to_string(),
            section,
            reason,
        });
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SweepArtifacts {
    pub heightmap: PathBuf,
    pub weightmap: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SweepOutcome {
    pub placed: Vec<PlacedTile>,
    pub report: SweepReport,
    pub artifacts: SweepArtifacts,
    pub covered: usize,
    pub missing_cells: Vec<TileCell>,
}

/// One heightmap export over every section of a field.
pub struct FieldSweep {
    config: SweepConfig,
    index: IndexSource,
    archive: Arc<dyn Archive>,
    progress: Box<dyn Progress>,
    cancel: CancelToken,
}

impl FieldSweep {
    pub fn new(config: SweepConfig, index: IndexSource, archive: Arc<dyn Archive>) -> Self {
        Self {
            config,
            index,
            archive,
            progress: Box::new(()),
            cancel: CancelToken::new(),
        }
    }

    pub fn with_progress(mut self, progress: impl Progress + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn run(self, request: &SweepRequest) -> Result<SweepOutcome, SweepError> {
        let FieldSweep {
            config,
            index,
            archive,
            progress,
            cancel,
        } = self;
        let t0 = Instant::now();

        config.validate()?;
        let index = index.load()?;
        let level = LodLevel::clamp(request.level);
        if i32::from(level.get()) != request.level {
            log::warn!(target: "sweep", "level {} clamped to {}", request.level, level);
        }
        log::info!(
            target: "sweep",
            "field {}: {} tiles indexed, level {} (scale {})",
            request.field,
            index.len(),
            level,
            level.scale()
        );

        let grid = config.raster.grid();
        let mut compositor = Compositor::new(grid, config.raster.fill, config.export.weights);
        let mut loader = TileLoader::new(
            archive,
            ResourceLayout {
                tile_edge: grid.tile_edge,
            },
            config.loader.tile_timeout(),
        )
        .map_err(SweepError::Worker)?;

        let geometry = &config.field;
        let mut report = SweepReport::default();
        let mut placed = Vec::new();

        for code in SectionCode::all() {
            if cancel.is_cancelled() {
                log::info!(target: "sweep", "cancelled before section {code}");
                return Err(SweepError::Cancelled);
            }
            report.sections += 1;
            progress.set_status("Get Terrain Tiles");
            let tiles = tiles_for_section(&index, i32::from(level.get()), code, geometry);
            progress.set_status("Load Terrain Textures");
            progress.set_status("Load Terrain Mesh");
            let requested = request.section == Some(code);

            for (i, tile) in tiles.iter().enumerate() {
                if cancel.is_cancelled() {
                    log::info!(target: "sweep", "cancelled at tile {} of {code}", tile.name);
                    return Err(SweepError::Cancelled);
                }
                progress.tile(i + 1, tiles.len());
                report.tiles_seen += 1;

                let resources = match loader.load(tile) {
                    Ok(r) => r,
                    Err(e) => {
                        log::warn!(target: "sweep", "{code}: skipping {e}");
                        report.skip(&tile.name, code, SkipReason::from(&e));
                        continue;
                    }
                };
                let cell = match compositor.place_tile(tile, &resources.mesh) {
                    Ok(cell) => cell,
                    Err(e) => {
                        log::warn!(target: "sweep", "{code}: skipping {e}");
                        report.skip(&tile.name, code, SkipReason::from(&e));
                        continue;
                    }
                };
                if let Some(material) = resources.material.as_deref() {
                    if let Err(e) = compositor.place_weights(tile, material) {
                        log::warn!(target: "sweep", "{code}: weights not placed: {e}");
                    }
                }
                report.placed += 1;

                if requested {
                    placed.push(PlacedTile {
                        name: tile.name.clone(),
                        section: code,
                        cell,
                        position: geometry.world_position(tile),
                        scale: geometry.world_scale(tile),
                        resources,
                    });
                }
            }
        }

        let covered = compositor.covered_count();
        let missing_cells = compositor.missing_cells();
        let (height, weights) = compositor.into_rasters();
        report.height_range_m = height
            .height_range()
            .map(|(lo, hi)| (height_meters(lo), height_meters(hi)));

        let suffix = match request.section {
            Some(code) => code.to_string(),
            None => "all".to_string(),
        };
        let out_dir = &config.export.out_dir;
        let heightmap = out_dir.join(format!("heightmap_{}_{}.r16", request.field, suffix));
        write_r16(&heightmap, &height)?;
        let weightmap = match weights {
            Some(w) => {
                let path = out_dir.join(format!("weightmap_{}_{}.png", request.field, suffix));
                write_weight_png(&path, &w)?;
                Some(path)
            }
            None => None,
        };

        log::info!(
            target: "sweep",
            "done in {} ms: {} sections, {} tiles, {} placed, {} skipped, {} cells covered",
            t0.elapsed().as_millis(),
            report.sections,
            report.tiles_seen,
            report.placed,
            report.skipped.len(),
            covered
        );

        Ok(SweepOutcome {
            placed,
            report,
            artifacts: SweepArtifacts {
                heightmap,
                weightmap,
            },
            covered,
            missing_cells,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_paths_follow_game_layout() {
        let p = default_index_path("/game", "MainField");
        assert!(p.ends_with("content/Terrain/A/MainField.tscb"));
        let d = default_archive_dir("/game", "MainField");
        assert!(d.ends_with("content/Terrain/A/MainField"));
    }

    #[test]
    fn tile_errors_map_to_reasons() {
        let e = TileError::Timeout {
            name: "t".into(),
            millis: 5,
        };
        assert_eq!(SkipReason::from(&e), SkipReason::Timeout);
        let e = TileError::MissingTileMesh { name: "t".into() };
        assert_eq!(SkipReason::from(&e), SkipReason::MissingMesh);
    }
}
