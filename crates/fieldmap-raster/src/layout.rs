use fieldmap_geom::Vec2;
use serde::{Deserialize, Serialize};

/// Shape of the tile grid the rasters cover.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Tiles along each side.
    #[serde(default = "default_grid_width")]
    pub grid_width: usize,
    /// Samples along each tile edge.
    #[serde(default = "default_tile_edge")]
    pub tile_edge: usize,
}

fn default_grid_width() -> usize {
    20
}
fn default_tile_edge() -> usize {
    256
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_width: default_grid_width(),
            tile_edge: default_tile_edge(),
        }
    }
}

impl GridConfig {
    pub const HEIGHT_SAMPLE_BYTES: usize = 2;
    pub const WEIGHT_SAMPLE_BYTES: usize = 4;

    /// Offset from a tile center to its cell index.
    /// Exact only for centers on half-integers.
    #[inline]
    pub fn half_extent(&self) -> f32 {
        self.grid_width as f32 / 2.0 - 0.5
    }

    /// Grid cell a tile center falls in, if any.
    pub fn cell_of(&self, center: Vec2) -> Option<(usize, usize)> {
        let cell = (center + Vec2::splat(self.half_extent())).floor();
        let limit = self.grid_width as f32;
        if !cell.is_finite() || cell.x < 0.0 || cell.y < 0.0 || cell.x >= limit || cell.y >= limit {
            return None;
        }
        Some((cell.x as usize, cell.y as usize))
    }

    #[inline]
    pub fn height_layout(&self) -> RasterLayout {
        RasterLayout::new(self.grid_width, self.tile_edge, Self::HEIGHT_SAMPLE_BYTES)
    }

    #[inline]
    pub fn weight_layout(&self) -> RasterLayout {
        RasterLayout::new(self.grid_width, self.tile_edge, Self::WEIGHT_SAMPLE_BYTES)
    }
}

/// Byte addressing for a square grid of square tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RasterLayout {
    pub grid_width: usize,
    pub tile_edge: usize,
    pub sample_bytes: usize,
}

impl RasterLayout {
    #[inline]
    pub const fn new(grid_width: usize, tile_edge: usize, sample_bytes: usize) -> Self {
        Self {
            grid_width,
            tile_edge,
            sample_bytes,
        }
    }

    /// Samples along one side of the whole raster.
    #[inline]
    pub fn pixel_width(&self) -> usize {
        self.grid_width * self.tile_edge
    }

    #[inline]
    pub fn row_stride(&self) -> usize {
        self.pixel_width() * self.sample_bytes
    }

    #[inline]
    pub fn byte_len(&self) -> usize {
        self.pixel_width() * self.row_stride()
    }

    /// Bytes in one tile's source buffer.
    #[inline]
    pub fn tile_bytes(&self) -> usize {
        self.tile_edge * self.tile_edge * self.sample_bytes
    }

    /// Byte offset of sample (`lx`,`ly`) of tile (`tx`,`ty`).
    #[inline]
    pub fn offset(&self, tx: usize, ty: usize, lx: usize, ly: usize) -> usize {
        (ty * self.tile_edge + ly) * self.row_stride()
            + (tx * self.tile_edge + lx) * self.sample_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_half_extent_is_nine_and_a_half() {
        assert_eq!(GridConfig::default().half_extent(), 9.5);
    }

    #[test]
    fn cell_of_maps_half_integer_centers() {
        let g = GridConfig::default();
        assert_eq!(g.cell_of(Vec2::new(-9.5, -9.5)), Some((0, 0)));
        assert_eq!(g.cell_of(Vec2::new(9.5, 7.5)), Some((19, 17)));
        assert_eq!(g.cell_of(Vec2::new(10.5, 0.5)), None);
        assert_eq!(g.cell_of(Vec2::new(-10.5, 0.5)), None);
        assert_eq!(g.cell_of(Vec2::new(f32::NAN, 0.5)), None);
    }

    #[test]
    fn offset_matches_reference_formula() {
        let l = GridConfig::default().height_layout();
        let (tx, ty, x, y) = (3, 7, 10, 200);
        assert_eq!(
            l.offset(tx, ty, x, y),
            (ty * 256 + y) * (256 * 20 * 2) + (tx * 256 + x) * 2
        );
        assert_eq!(l.byte_len(), 256 * 256 * 2 * 20 * 20);
    }
}
