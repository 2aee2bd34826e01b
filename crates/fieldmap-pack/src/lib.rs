//! Archive access and per-tile resource loading.
#![forbid(unsafe_code)]

pub mod archive;
pub mod resources;

pub use archive::{Archive, ArchiveError, DirArchive, MemoryArchive};
pub use resources::{ResourceKind, ResourceLayout, TileError, TileResources, load_resources};
