use fieldmap_index::TileDescriptor;

use crate::archive::{Archive, ArchiveError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Mesh,
    Material,
    Water,
}

impl ResourceKind {
    #[inline]
    pub fn extension(self) -> &'static str {
        match self {
            ResourceKind::Mesh => "hght",
            ResourceKind::Material => "mate",
            ResourceKind::Water => "water.extm",
        }
    }

    pub fn key(self, tile: &TileDescriptor) -> String {
        format!("{}.{}", tile.name, self.extension())
    }
}

/// Expected decoded sizes for a tile's buffers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceLayout {
    /// Samples along one tile edge.
    pub tile_edge: usize,
}

impl Default for ResourceLayout {
    fn default() -> Self {
        Self { tile_edge: 256 }
    }
}

impl ResourceLayout {
    pub const HEIGHT_SAMPLE_BYTES: usize = 2;
    pub const WEIGHT_SAMPLE_BYTES: usize = 4;

    #[inline]
    pub fn mesh_len(&self) -> usize {
        self.tile_edge * self.tile_edge * Self::HEIGHT_SAMPLE_BYTES
    }

    #[inline]
    pub fn material_len(&self) -> usize {
        self.tile_edge * self.tile_edge * Self::WEIGHT_SAMPLE_BYTES
    }
}

/// Buffers for one tile. Layout is owned by the decoders; only sizes are checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TileResources {
    /// Row-major u16 LE height samples.
    pub mesh: Vec<u8>,
    /// Row-major packed 4-byte material weights.
    pub material: Option<Vec<u8>>,
    pub water: Option<Vec<u8>>,
}

/// Failures that skip a single tile.
#[derive(thiserror::Error, Debug)]
pub enum TileError {
    #[error("tile {name}: no height mesh in archive")]
    MissingTileMesh { name: String },

    #[error("tile {name}: height mesh is {actual} bytes, expected {expected}")]
    MeshSizeMismatch {
        name: String,
        expected: usize,
        actual: usize,
    },

    #[error("tile {name}: archive read failed: {source}")]
    ArchiveReadFailure {
        name: String,
        #[source]
        source: ArchiveError,
    },

    #[error("tile {name}: load timed out after {millis} ms")]
    Timeout { name: String, millis: u64 },

    #[error("tile {name}: loader worker is not running")]
    WorkerUnavailable { name: String },
}

impl TileError {
    pub fn tile_name(&self) -> &str {
        match self {
            TileError::MissingTileMesh { name }
            | TileError::MeshSizeMismatch { name, .. }
            | TileError::ArchiveReadFailure { name, .. }
            | TileError::Timeout { name, .. }
            | TileError::WorkerUnavailable { name } => name,
        }
    }
}

pub fn load_resources(
    archive: &dyn Archive,
    tile: &TileDescriptor,
    layout: &ResourceLayout,
) -> Result<TileResources, TileError> {
    let mesh = archive
        .read(&ResourceKind::Mesh.key(tile))
        .map_err(|source| TileError::ArchiveReadFailure {
            name: tile.name.clone(),
            source,
        })?
        .ok_or_else(|| TileError::MissingTileMesh {
            name: tile.name.clone(),
        })?;
    if mesh.len() != layout.mesh_len() {
        return Err(TileError::MeshSizeMismatch {
            name: tile.name.clone(),
            expected: layout.mesh_len(),
            actual: mesh.len(),
        });
    }

    let material = optional(archive, tile, ResourceKind::Material).filter(|m| {
        let ok = m.len() == layout.material_len();
        if !ok {
            log::warn!(
                target: "pack",
                "tile {}: material is {} bytes, expected {}; ignoring",
                tile.name,
                m.len(),
                layout.material_len()
            );
        }
        ok
    });
    let water = optional(archive, tile, ResourceKind::Water);

    Ok(TileResources {
        mesh,
        material,
        water,
    })
}

/// Absent or unreadable optional buffers both mean "no data".
fn optional(archive: &dyn Archive, tile: &TileDescriptor, kind: ResourceKind) -> Option<Vec<u8>> {
    match archive.read(&kind.key(tile)) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!(target: "pack", "tile {}: {:?} unreadable: {}", tile.name, kind, e);
            None
        }
    }
}
