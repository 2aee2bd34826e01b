use crate::layout::RasterLayout;

/// Metres per height sample unit.
pub const HEIGHT_SCALE: f32 = 0.0122075;

#[inline]
pub fn height_meters(sample: u16) -> f32 {
    sample as f32 * HEIGHT_SCALE
}

/// Fixed-size flat raster for the whole field. Never resized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalRaster {
    layout: RasterLayout,
    data: Vec<u8>,
}

impl GlobalRaster {
    /// Allocates the raster with every sample set to `fill`.
    pub fn new(layout: RasterLayout, fill: &[u8]) -> Self {
        assert_eq!(fill.len(), layout.sample_bytes, "fill must be one sample");
        let data = if fill.iter().all(|&b| b == 0) {
            vec![0u8; layout.byte_len()]
        } else {
            fill.repeat(layout.byte_len() / layout.sample_bytes)
        };
        Self { layout, data }
    }

    /// Wraps bytes read back from an artifact; `None` if the length is wrong.
    pub fn from_bytes(layout: RasterLayout, data: Vec<u8>) -> Option<Self> {
        (data.len() == layout.byte_len()).then_some(Self { layout, data })
    }

    #[inline]
    pub fn layout(&self) -> &RasterLayout {
        &self.layout
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Copies one tile's row-major samples into cell (`tx`,`ty`).
    /// Caller guarantees the cell is in range and `src` is one tile.
    pub(crate) fn blit_tile(&mut self, tx: usize, ty: usize, src: &[u8]) {
        let l = self.layout;
        let row = l.tile_edge * l.sample_bytes;
        debug_assert_eq!(src.len(), l.tile_bytes());
        if row == 0 {
            return;
        }
        for (ly, line) in src.chunks_exact(row).enumerate() {
            let at = l.offset(tx, ty, 0, ly);
            self.data[at..at + row].copy_from_slice(line);
        }
    }

    /// Copy of one tile's region, row-major, as it would be read from a source buffer.
    /// `None` if the cell is outside the grid.
    pub fn tile_bytes(&self, tx: usize, ty: usize) -> Option<Vec<u8>> {
        let l = self.layout;
        if tx >= l.grid_width || ty >= l.grid_width {
            return None;
        }
        let row = l.tile_edge * l.sample_bytes;
        let mut out = Vec::with_capacity(l.tile_bytes());
        for ly in 0..l.tile_edge {
            let at = l.offset(tx, ty, 0, ly);
            out.extend_from_slice(&self.data[at..at + row]);
        }
        Some(out)
    }

    /// Little-endian 16-bit sample at global pixel (`x`,`y`).
    pub fn sample_u16(&self, x: usize, y: usize) -> Option<u16> {
        let w = self.layout.pixel_width();
        if self.layout.sample_bytes != 2 || x >= w || y >= w {
            return None;
        }
        let at = y * self.layout.row_stride() + x * 2;
        Some(u16::from_le_bytes([self.data[at], self.data[at + 1]]))
    }

    /// Min and max of all 16-bit samples.
    pub fn height_range(&self) -> Option<(u16, u16)> {
        if self.layout.sample_bytes != 2 {
            return None;
        }
        self.data
            .chunks_exact(2)
            .map(|s| u16::from_le_bytes([s[0], s[1]]))
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
