use std::str::FromStr;

use fieldmap_geom::{Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::error::IndexError;
use crate::lod::LodLevel;
use crate::tile::{TileDescriptor, TileIndex};

pub const SECTION_COLUMNS: u8 = 10;
pub const SECTION_ROWS: u8 = 9;

/// Section name: column letter A-J and row digit 1-9, shown as `A-1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SectionCode {
    column: u8,
    row: u8,
}

impl SectionCode {
    #[inline]
    pub fn new(column: u8, row: u8) -> Option<Self> {
        (column < SECTION_COLUMNS && row < SECTION_ROWS).then_some(Self { column, row })
    }

    /// Accepts `A1`, `A-1` and lowercase letters.
    pub fn parse(code: &str) -> Result<Self, IndexError> {
        let invalid = || IndexError::InvalidSectionCode(code.to_string());
        let bytes = code.as_bytes();
        let (letter, digit) = match bytes {
            [l, d] => (*l, *d),
            [l, b'-', d] => (*l, *d),
            _ => return Err(invalid()),
        };
        let column = letter.to_ascii_uppercase().wrapping_sub(b'A');
        let row = digit.wrapping_sub(b'1');
        Self::new(column, row).ok_or_else(invalid)
    }

    #[inline]
    pub fn column(self) -> u8 {
        self.column
    }

    #[inline]
    pub fn row(self) -> u8 {
        self.row
    }

    #[inline]
    pub fn letter(self) -> char {
        (b'A' + self.column) as char
    }

    /// Every code in sweep order: letters outer, digits inner.
    pub fn all() -> impl Iterator<Item = SectionCode> {
        (0..SECTION_COLUMNS)
            .flat_map(|column| (0..SECTION_ROWS).map(move |row| SectionCode { column, row }))
    }
}

impl FromStr for SectionCode {
    type Err = IndexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for SectionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.letter(), self.row + 1)
    }
}

/// World layout of the section grid.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldGeometry {
    /// Section edge in world units.
    #[serde(default = "default_section_width")]
    pub section_width: f32,
    /// World units covered by one tile-grid unit.
    #[serde(default = "default_world_units_per_grid")]
    pub world_units_per_grid: f32,
    /// Sections along each side of the (square) field.
    #[serde(default = "default_sections_per_side")]
    pub sections_per_side: u8,
}

fn default_section_width() -> f32 {
    1000.0
}
fn default_world_units_per_grid() -> f32 {
    500.0
}
fn default_sections_per_side() -> u8 {
    SECTION_COLUMNS
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            section_width: default_section_width(),
            world_units_per_grid: default_world_units_per_grid(),
            sections_per_side: default_sections_per_side(),
        }
    }
}

impl FieldGeometry {
    /// Section edge in tile-grid units.
    #[inline]
    pub fn section_span(&self) -> f32 {
        self.section_width / self.world_units_per_grid
    }

    /// Half of the field edge in tile-grid units.
    #[inline]
    pub fn field_half_extent(&self) -> f32 {
        self.sections_per_side as f32 * self.section_span() / 2.0
    }

    /// Center of a section in grid units. Sections are laid out symmetrically
    /// about the field origin, so (0, 0) is the shared corner of E-5, E-6, F-5
    /// and F-6 and never inside A-1; on the reference layout A-1 is (-9, -9).
    pub fn midpoint_of(&self, code: SectionCode) -> Vec2 {
        let origin = self.sections_per_side as f32 / 2.0;
        let span = self.section_span();
        Vec2::new(
            (code.column as f32 + 0.5 - origin) * span,
            (code.row as f32 + 0.5 - origin) * span,
        )
    }

    /// Search box for a section at one LOD; never narrower than half a tile.
    pub fn section_box(&self, code: SectionCode, scale: f32) -> Rect {
        let half = (self.section_span() / 2.0).max(scale / 2.0);
        Rect::from_center_half(self.midpoint_of(code), half)
    }

    #[inline]
    pub fn world_position(&self, tile: &TileDescriptor) -> Vec2 {
        tile.center * self.world_units_per_grid
    }

    #[inline]
    pub fn world_scale(&self, tile: &TileDescriptor) -> f32 {
        tile.lod_scale * self.world_units_per_grid
    }
}

pub fn midpoint_of(code: &str, geometry: &FieldGeometry) -> Result<Vec2, IndexError> {
    SectionCode::parse(code).map(|c| geometry.midpoint_of(c))
}

/// Tiles at the (clamped) level whose centers fall in the section's box.
pub fn tiles_for_section<'a>(
    index: &'a TileIndex,
    level: i32,
    code: SectionCode,
    geometry: &FieldGeometry,
) -> Vec<&'a TileDescriptor> {
    let scale = LodLevel::clamp(level).scale();
    let area = geometry.section_box(code, scale);
    index
        .at_scale(scale)
        .filter(|t| area.contains(t.center))
        .collect()
}
