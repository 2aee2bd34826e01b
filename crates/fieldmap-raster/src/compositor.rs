use fieldmap_index::TileDescriptor;
use hashbrown::HashSet;

use crate::layout::GridConfig;
use crate::raster::GlobalRaster;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PlaceError {
    #[error("tile {name} centered at ({x}, {y}) lies outside the {grid}x{grid} grid")]
    TileOutOfBounds {
        name: String,
        x: f32,
        y: f32,
        grid: usize,
    },

    #[error("tile {name}: buffer is {actual} bytes, expected {expected}")]
    BufferSize {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Grid cell a tile was written to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCell {
    pub tx: usize,
    pub ty: usize,
}

/// Writes tile buffers into the global rasters and tracks which cells were filled.
pub struct Compositor {
    grid: GridConfig,
    height: GlobalRaster,
    weights: Option<GlobalRaster>,
    coverage: HashSet<TileCell>,
}

impl Compositor {
    /// Height raster starts at `fill`; weight raster (if enabled) at zero.
    pub fn new(grid: GridConfig, fill: u16, weights: bool) -> Self {
        let height = GlobalRaster::new(grid.height_layout(), &fill.to_le_bytes());
        let weights = weights.then(|| GlobalRaster::new(grid.weight_layout(), &[0u8; 4]));
        log::debug!(
            target: "raster",
            "allocated {}x{} grid ({} height bytes, weights {})",
            grid.grid_width,
            grid.grid_width,
            height.as_bytes().len(),
            weights.is_some()
        );
        Self {
            grid,
            height,
            weights,
            coverage: HashSet::new(),
        }
    }

    #[inline]
    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    fn locate(&self, tile: &TileDescriptor) -> Result<TileCell, PlaceError> {
        self.grid
            .cell_of(tile.center)
            .map(|(tx, ty)| TileCell { tx, ty })
            .ok_or_else(|| PlaceError::TileOutOfBounds {
                name: tile.name.clone(),
                x: tile.center.x,
                y: tile.center.y,
                grid: self.grid.grid_width,
            })
    }

    /// Copies a tile's height samples into its cell. Placing the same tile
    /// twice leaves the raster unchanged.
    pub fn place_tile(&mut self, tile: &TileDescriptor, mesh: &[u8]) -> Result<TileCell, PlaceError> {
        let cell = self.locate(tile)?;
        let expected = self.height.layout().tile_bytes();
        if mesh.len() != expected {
            return Err(PlaceError::BufferSize {
                name: tile.name.clone(),
                expected,
                actual: mesh.len(),
            });
        }
        self.height.blit_tile(cell.tx, cell.ty, mesh);
        self.coverage.insert(cell);
        Ok(cell)
    }

    /// Copies material weights into the tile's cell. No-op when weights are off.
    pub fn place_weights(&mut self, tile: &TileDescriptor, material: &[u8]) -> Result<(), PlaceError> {
        let cell = self.locate(tile)?;
        let Some(weights) = self.weights.as_mut() else {
            return Ok(());
        };
        let expected = weights.layout().tile_bytes();
        if material.len() != expected {
            return Err(PlaceError::BufferSize {
                name: tile.name.clone(),
                expected,
                actual: material.len(),
            });
        }
        weights.blit_tile(cell.tx, cell.ty, material);
        Ok(())
    }

    #[inline]
    pub fn is_covered(&self, cell: TileCell) -> bool {
        self.coverage.contains(&cell)
    }

    #[inline]
    pub fn covered_count(&self) -> usize {
        self.coverage.len()
    }

    /// Cells never written, row-major.
    pub fn missing_cells(&self) -> Vec<TileCell> {
        let w = self.grid.grid_width;
        (0..w)
            .flat_map(|ty| (0..w).map(move |tx| TileCell { tx, ty }))
            .filter(|c| !self.coverage.contains(c))
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.coverage.len() == self.grid.grid_width * self.grid.grid_width
    }

    #[inline]
    pub fn height(&self) -> &GlobalRaster {
        &self.height
    }

    #[inline]
    pub fn weights(&self) -> Option<&GlobalRaster> {
        self.weights.as_ref()
    }

    pub fn into_rasters(self) -> (GlobalRaster, Option<GlobalRaster>) {
        (self.height, self.weights)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fieldmap_geom::Vec2;

    fn small() -> GridConfig {
        GridConfig {
            grid_width: 4,
            tile_edge: 2,
        }
    }

    #[test]
    fn reference_corner_tile_lands_at_origin() {
        let mut c = Compositor::new(GridConfig::default(), 0, false);
        let tile = TileDescriptor::new("corner", Vec2::new(-9.5, -9.5), 1.0);
        let mesh = vec![0u8; 256 * 256 * 2];
        assert_eq!(c.place_tile(&tile, &mesh).unwrap(), TileCell { tx: 0, ty: 0 });
        assert!(c.height().as_bytes().iter().all(|&b| b == 0));
        assert_eq!(c.covered_count(), 1);
    }

    #[test]
    fn out_of_bounds_leaves_raster_untouched() {
        let mut c = Compositor::new(small(), 7, false);
        let before = c.height().clone();
        let tile = TileDescriptor::new("far", Vec2::new(2.5, 0.5), 1.0);
        let err = c.place_tile(&tile, &[1u8; 8]).unwrap_err();
        assert!(matches!(err, PlaceError::TileOutOfBounds { .. }));
        assert_eq!(c.height(), &before);
        assert_eq!(c.covered_count(), 0);
    }

    #[test]
    fn wrong_sized_mesh_is_rejected() {
        let mut c = Compositor::new(small(), 0, false);
        let tile = TileDescriptor::new("t", Vec2::new(-1.5, -1.5), 1.0);
        assert!(matches!(
            c.place_tile(&tile, &[0u8; 7]),
            Err(PlaceError::BufferSize { expected: 8, actual: 7, .. })
        ));
    }

    #[test]
    fn weights_disabled_is_a_no_op() {
        let mut c = Compositor::new(small(), 0, false);
        let tile = TileDescriptor::new("t", Vec2::new(-1.5, -1.5), 1.0);
        c.place_weights(&tile, &[9u8; 3]).unwrap();
        assert!(c.weights().is_none());
    }

    #[test]
    fn missing_cells_lists_unwritten() {
        let mut c = Compositor::new(small(), 0, true);
        let tile = TileDescriptor::new("t", Vec2::new(0.5, -0.5), 1.0);
        c.place_tile(&tile, &[1u8; 8]).unwrap();
        c.place_weights(&tile, &[2u8; 16]).unwrap();
        let missing = c.missing_cells();
        assert_eq!(missing.len(), 15);
        assert!(!missing.contains(&TileCell { tx: 2, ty: 1 }));
        assert!(!c.is_complete());
        let weights = c.weights().unwrap();
        assert_eq!(weights.tile_bytes(2, 1), Some(vec![2u8; 16]));
    }
}
