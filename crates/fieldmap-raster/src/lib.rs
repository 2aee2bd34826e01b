//! Global height/weight rasters and tile compositing.
#![forbid(unsafe_code)]

mod compositor;
mod export;
mod layout;
mod raster;

pub use compositor::{Compositor, PlaceError, TileCell};
pub use export::{ExportError, read_r16, write_r16, write_weight_png};
pub use layout::{GridConfig, RasterLayout};
pub use raster::{GlobalRaster, HEIGHT_SCALE, height_meters};
