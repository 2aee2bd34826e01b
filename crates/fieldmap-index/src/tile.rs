use std::path::Path;

use fieldmap_geom::Vec2;
use hashbrown::HashSet;

use crate::error::IndexError;
use crate::lod::LodLevel;
use crate::tscb::{self, TscbHeader};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

/// One terrain area from the control index.
#[derive(Clone, Debug, PartialEq)]
pub struct TileDescriptor {
    pub name: String,
    /// Center in tile-grid units.
    pub center: Vec2,
    pub lod_scale: f32,
    pub terrain: HeightRange,
    pub water: HeightRange,
}

impl TileDescriptor {
    pub fn new(name: impl Into<String>, center: Vec2, lod_scale: f32) -> Self {
        Self {
            name: name.into(),
            center,
            lod_scale,
            terrain: HeightRange::default(),
            water: HeightRange::default(),
        }
    }

    #[inline]
    pub fn level(&self) -> Option<LodLevel> {
        LodLevel::from_scale(self.lod_scale)
    }
}

/// Parsed terrain-control index. Immutable once loaded.
#[derive(Clone, Debug, Default)]
pub struct TileIndex {
    header: TscbHeader,
    tiles: Vec<TileDescriptor>,
}

impl TileIndex {
    pub fn new(tiles: Vec<TileDescriptor>) -> Self {
        Self {
            header: TscbHeader::default(),
            tiles,
        }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, IndexError> {
        let (header, tiles) = tscb::parse(bytes)?;
        let index = Self { header, tiles };
        let dups = index.duplicate_count();
        if dups > 0 {
            log::warn!(target: "index", "{} tile descriptors share center and scale with another", dups);
        }
        Ok(index)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, IndexError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| IndexError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_bytes(&bytes)?;
        log::info!(
            target: "index",
            "loaded {} tiles from {}",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    #[inline]
    pub fn header(&self) -> &TscbHeader {
        &self.header
    }

    #[inline]
    pub fn tiles(&self) -> &[TileDescriptor] {
        &self.tiles
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn at_scale(&self, scale: f32) -> impl Iterator<Item = &TileDescriptor> {
        self.tiles.iter().filter(move |t| t.lod_scale == scale)
    }

    /// Number of descriptors whose center and scale repeat an earlier one.
    pub fn duplicate_count(&self) -> usize {
        let mut seen = HashSet::with_capacity(self.tiles.len());
        self.tiles
            .iter()
            .filter(|t| {
                !seen.insert((
                    t.center.x.to_bits(),
                    t.center.y.to_bits(),
                    t.lod_scale.to_bits(),
                ))
            })
            .count()
    }
}
