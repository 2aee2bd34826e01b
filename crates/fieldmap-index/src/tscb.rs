//! Terrain scene control binary (TSCB) reader.
//!
//! Big-endian layout:
//!
//! ```text
//! 0x00  magic "TSCB"
//! 0x04  u32 version
//! 0x08  u32 (always 1)
//! 0x0C  u32 string table offset, relative to 0x0C
//! 0x10  f32 world scale
//! 0x14  f32 max terrain height
//! 0x18  u32 material count
//! 0x1C  u32 area count
//! 0x20  u32, u32 (zero)
//! 0x28  f32 tile size
//! 0x2C  u32 (always 8)
//! 0x30  material offsets, then area offsets; each relative to its own slot
//! ```
//!
//! Area entries hold `x, z, size, min_h, max_h, min_water, max_water` (f32),
//! an unknown u32, a name offset relative to its own field, two unknown u32s,
//! and a count of trailing u32 extra words.

use fieldmap_geom::Vec2;

use crate::error::IndexError;
use crate::lod::LodLevel;
use crate::tile::{HeightRange, TileDescriptor};

pub const MAGIC: [u8; 4] = *b"TSCB";
const HEADER_LEN: usize = 0x30;
const AREA_FIXED_LEN: usize = 0x30;
const AREA_NAME_FIELD: usize = 0x20;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TscbHeader {
    pub version: u32,
    pub world_scale: f32,
    pub max_height: f32,
    pub material_count: u32,
    pub area_count: u32,
    pub tile_size: f32,
}

impl Default for TscbHeader {
    fn default() -> Self {
        Self {
            version: 0x0A00_0000,
            world_scale: 500.0,
            max_height: 800.0,
            material_count: 0,
            area_count: 0,
            tile_size: 32.0,
        }
    }
}

struct Bytes<'a>(&'a [u8]);

impl<'a> Bytes<'a> {
    fn slice(&self, offset: usize, len: usize) -> Result<&'a [u8], IndexError> {
        offset
            .checked_add(len)
            .and_then(|end| self.0.get(offset..end))
            .ok_or(IndexError::Truncated {
                offset,
                needed: len,
            })
    }

    fn u32(&self, offset: usize) -> Result<u32, IndexError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.slice(offset, 4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn f32(&self, offset: usize) -> Result<f32, IndexError> {
        self.u32(offset).map(f32::from_bits)
    }

    /// Follows an offset stored relative to the position it was read from.
    fn relative(&self, offset: usize) -> Result<usize, IndexError> {
        Ok(offset + self.u32(offset)? as usize)
    }

    fn cstr(&self, offset: usize) -> Result<&'a str, IndexError> {
        let rest = self
            .0
            .get(offset..)
            .ok_or(IndexError::Truncated { offset, needed: 1 })?;
        let len = rest.iter().position(|&b| b == 0).ok_or(IndexError::Truncated {
            offset,
            needed: rest.len() + 1,
        })?;
        std::str::from_utf8(&rest[..len]).map_err(|_| IndexError::InvalidName { offset })
    }
}

pub fn parse(bytes: &[u8]) -> Result<(TscbHeader, Vec<TileDescriptor>), IndexError> {
    let b = Bytes(bytes);
    let magic = b.slice(0, 4)?;
    if magic != MAGIC {
        let mut m = [0u8; 4];
        m.copy_from_slice(magic);
        return Err(IndexError::BadMagic(m));
    }
    b.slice(0, HEADER_LEN)?;

    let header = TscbHeader {
        version: b.u32(0x04)?,
        world_scale: b.f32(0x10)?,
        max_height: b.f32(0x14)?,
        material_count: b.u32(0x18)?,
        area_count: b.u32(0x1C)?,
        tile_size: b.f32(0x28)?,
    };

    let area_table = HEADER_LEN + header.material_count as usize * 4;
    let mut tiles = Vec::with_capacity((header.area_count as usize).min(bytes.len() / AREA_FIXED_LEN));
    for i in 0..header.area_count as usize {
        let area = b.relative(area_table + i * 4)?;
        tiles.push(parse_area(&b, area)?);
    }
    log::debug!(
        target: "index",
        "TSCB v{:#x}: {} materials, {} areas, world scale {}",
        header.version,
        header.material_count,
        header.area_count,
        header.world_scale
    );
    Ok((header, tiles))
}

fn parse_area(b: &Bytes<'_>, at: usize) -> Result<TileDescriptor, IndexError> {
    b.slice(at, AREA_FIXED_LEN)?;
    let name = b.cstr(b.relative(at + AREA_NAME_FIELD)?)?.to_string();
    let lod_scale = b.f32(at + 0x08)?;
    if LodLevel::from_scale(lod_scale).is_none() {
        return Err(IndexError::UnknownLodScale {
            name,
            scale: lod_scale,
        });
    }
    let extra_len = b.u32(at + 0x2C)? as usize;
    b.slice(at + AREA_FIXED_LEN, extra_len.saturating_mul(4))?;
    Ok(TileDescriptor {
        name,
        center: Vec2::new(b.f32(at)?, b.f32(at + 0x04)?),
        lod_scale,
        terrain: HeightRange {
            min: b.f32(at + 0x0C)?,
            max: b.f32(at + 0x10)?,
        },
        water: HeightRange {
            min: b.f32(at + 0x14)?,
            max: b.f32(at + 0x18)?,
        },
    })
}
