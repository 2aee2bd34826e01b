use crate::error::IndexError;

/// Tile size in grid units for each level, coarsest first.
const LOD_SCALES: [f32; 9] = [32.0, 16.0, 8.0, 4.0, 2.0, 1.0, 0.5, 0.25, 0.125];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LodLevel(u8);

impl LodLevel {
    pub const COARSEST: LodLevel = LodLevel(0);
    pub const FINEST: LodLevel = LodLevel(8);

    pub fn new(level: i32) -> Result<Self, IndexError> {
        if (0..=Self::FINEST.0 as i32).contains(&level) {
            Ok(Self(level as u8))
        } else {
            Err(IndexError::InvalidLevel(level))
        }
    }

    /// Saturates out-of-range requests to the nearest valid level.
    #[inline]
    pub fn clamp(level: i32) -> Self {
        Self(level.clamp(0, Self::FINEST.0 as i32) as u8)
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn scale(self) -> f32 {
        LOD_SCALES[self.0 as usize]
    }

    pub fn from_scale(scale: f32) -> Option<Self> {
        LOD_SCALES
            .iter()
            .position(|&s| s == scale)
            .map(|i| Self(i as u8))
    }

    pub fn all() -> impl Iterator<Item = LodLevel> {
        (0..=Self::FINEST.0).map(LodLevel)
    }
}

impl std::fmt::Display for LodLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub fn scale_of(level: i32) -> Result<f32, IndexError> {
    LodLevel::new(level).map(LodLevel::scale)
}

#[inline]
pub fn clamp(level: i32) -> LodLevel {
    LodLevel::clamp(level)
}
