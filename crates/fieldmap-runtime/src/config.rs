use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use fieldmap_index::FieldGeometry;
use fieldmap_raster::GridConfig;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid [{section}] {key} = {value}: {reason}")]
    Invalid {
        section: &'static str,
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Upper bound on tiles per side; the reference field uses 20.
pub const MAX_GRID_WIDTH: usize = 1024;
/// Upper bound on samples per tile edge; the reference tiles use 256.
pub const MAX_TILE_EDGE: usize = 4096;
/// Largest raster (weight raster, 4 bytes per sample) a sweep will allocate.
pub const MAX_RASTER_BYTES: u64 = 1 << 34;

/// Everything a sweep needs besides the index and the archive.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct SweepConfig {
    #[serde(default)]
    pub field: FieldGeometry,
    #[serde(default)]
    pub raster: RasterConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct RasterConfig {
    #[serde(default = "default_grid_width")]
    pub grid_width: usize,
    #[serde(default = "default_tile_edge")]
    pub tile_edge: usize,
    /// Initial height sample for cells no tile covers.
    #[serde(default)]
    pub fill: u16,
}

fn default_grid_width() -> usize {
    GridConfig::default().grid_width
}
fn default_tile_edge() -> usize {
    GridConfig::default().tile_edge
}

impl Default for RasterConfig {
    fn default() -> Self {
        Self {
            grid_width: default_grid_width(),
            tile_edge: default_tile_edge(),
            fill: 0,
        }
    }
}

impl RasterConfig {
    #[inline]
    pub fn grid(&self) -> GridConfig {
        GridConfig {
            grid_width: self.grid_width,
            tile_edge: self.tile_edge,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct ExportConfig {
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,
    /// Also composite and write material weights.
    #[serde(default)]
    pub weights: bool,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("exported")
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            out_dir: default_out_dir(),
            weights: false,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct LoaderConfig {
    #[serde(default = "default_tile_timeout_ms")]
    pub tile_timeout_ms: u64,
}

fn default_tile_timeout_ms() -> u64 {
    5_000
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            tile_timeout_ms: default_tile_timeout_ms(),
        }
    }
}

impl LoaderConfig {
    #[inline]
    pub fn tile_timeout(&self) -> Duration {
        Duration::from_millis(self.tile_timeout_ms)
    }
}

fn invalid(
    section: &'static str,
    key: &'static str,
    value: impl ToString,
    reason: &'static str,
) -> ConfigError {
    ConfigError::Invalid {
        section,
        key,
        value: value.to_string(),
        reason,
    }
}

impl SweepConfig {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        let cfg: SweepConfig = toml::from_str(toml_str)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values that would make the rasters empty, unaddressable, or
    /// larger than [`MAX_RASTER_BYTES`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        let f = &self.field;
        if !(f.section_width.is_finite() && f.section_width > 0.0) {
            return Err(invalid("field", "section_width", f.section_width, "must be positive"));
        }
        if !(f.world_units_per_grid.is_finite() && f.world_units_per_grid > 0.0) {
            return Err(invalid(
                "field",
                "world_units_per_grid",
                f.world_units_per_grid,
                "must be positive",
            ));
        }
        if f.sections_per_side == 0 {
            return Err(invalid("field", "sections_per_side", 0, "must be at least 1"));
        }

        let r = &self.raster;
        if !(1..=MAX_GRID_WIDTH).contains(&r.grid_width) {
            return Err(invalid("raster", "grid_width", r.grid_width, "must be 1..=1024"));
        }
        if !(1..=MAX_TILE_EDGE).contains(&r.tile_edge) {
            return Err(invalid("raster", "tile_edge", r.tile_edge, "must be 1..=4096"));
        }
        let bytes = (r.grid_width as u64)
            .checked_mul(r.tile_edge as u64)
            .and_then(|side| side.checked_mul(side))
            .and_then(|samples| samples.checked_mul(GridConfig::WEIGHT_SAMPLE_BYTES as u64));
        if !bytes.is_some_and(|b| b <= MAX_RASTER_BYTES && usize::try_from(b).is_ok()) {
            return Err(invalid(
                "raster",
                "grid_width",
                r.grid_width,
                "grid_width x tile_edge raster is too large",
            ));
        }

        if self.loader.tile_timeout_ms == 0 {
            return Err(invalid("loader", "tile_timeout_ms", 0, "must be at least 1"));
        }
        Ok(())
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let cfg = Self::from_toml_str(&s)?;
        log::info!(target: "config", "loaded sweep config from {}", path.display());
        Ok(cfg)
    }
}
