//! Terrain-control index, LOD table, and section resolution.
#![forbid(unsafe_code)]

pub mod error;
pub mod lod;
pub mod section;
pub mod tile;
pub mod tscb;

pub use error::IndexError;
pub use lod::{LodLevel, clamp, scale_of};
pub use section::{FieldGeometry, SectionCode, midpoint_of, tiles_for_section};
pub use tile::{HeightRange, TileDescriptor, TileIndex};
pub use tscb::TscbHeader;
