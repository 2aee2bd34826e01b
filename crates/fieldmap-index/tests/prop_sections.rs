use hashbrown::HashSet;

use fieldmap_geom::Vec2;
use fieldmap_index::{
    FieldGeometry, LodLevel, SectionCode, TileDescriptor, TileIndex, clamp, scale_of,
    tiles_for_section,
};
use proptest::prelude::*;

const TABLE: [f32; 9] = [32.0, 16.0, 8.0, 4.0, 2.0, 1.0, 0.5, 0.25, 0.125];

/// One tile per cell of a `per_side`×`per_side` grid at `scale`, centered on the origin.
fn grid_index(scale: f32, per_side: usize) -> TileIndex {
    let half = per_side as f32 * scale / 2.0;
    let mut tiles = Vec::new();
    for y in 0..per_side {
        for x in 0..per_side {
            let center = Vec2::new(
                x as f32 * scale + scale / 2.0 - half,
                y as f32 * scale + scale / 2.0 - half,
            );
            tiles.push(TileDescriptor::new(format!("t{scale}_{x}_{y}"), center, scale));
        }
    }
    TileIndex::new(tiles)
}

proptest! {
    // Any requested level resolves to a table scale; out-of-range saturates
    #[test]
    fn clamped_level_always_has_a_scale(level in -1_000i32..1_000) {
        let clamped = clamp(level);
        let expect = TABLE[level.clamp(0, 8) as usize];
        prop_assert_eq!(clamped.scale(), expect);
        prop_assert_eq!(scale_of(clamped.get() as i32).unwrap(), expect);
    }

    // Every resolved tile is at the requested scale and inside the section box
    #[test]
    fn resolved_tiles_lie_in_section_box(col in 0u8..10, row in 0u8..9, level in 3i32..=7) {
        let g = FieldGeometry::default();
        let scale = LodLevel::clamp(level).scale();
        let per_side = (20.0 / scale) as usize;
        let index = grid_index(scale, per_side);
        let code = SectionCode::new(col, row).unwrap();
        let area = g.section_box(code, scale);
        let tiles = tiles_for_section(&index, level, code, &g);
        prop_assert!(!tiles.is_empty());
        for t in tiles {
            prop_assert_eq!(t.lod_scale, scale);
            prop_assert!(area.contains(t.center));
        }
    }
}

#[test]
fn levels_zero_to_eight_match_table() {
    for level in 0..=8 {
        assert_eq!(scale_of(clamp(level).get() as i32).unwrap(), TABLE[level as usize]);
    }
}

#[test]
fn midpoints_are_injective_and_inside_field() {
    let g = FieldGeometry::default();
    let bound = g.field_half_extent();
    let mut seen = HashSet::new();
    for code in SectionCode::all() {
        let m = g.midpoint_of(code);
        assert!(m.x.abs() <= bound && m.y.abs() <= bound, "{code} at {m:?}");
        assert!(seen.insert((m.x.to_bits(), m.y.to_bits())), "{code} repeats a midpoint");
    }
    assert_eq!(seen.len(), 90);
}

#[test]
fn reference_level_five_gives_four_tiles_per_section() {
    let g = FieldGeometry::default();
    let index = grid_index(1.0, 20);
    for code in SectionCode::all() {
        let tiles = tiles_for_section(&index, 5, code, &g);
        assert_eq!(tiles.len(), 4, "section {code}");
    }
}

#[test]
fn single_tile_resolves_in_its_section() {
    let g = FieldGeometry::default();
    let index = TileIndex::new(vec![TileDescriptor::new("A-1", Vec2::new(-9.5, -9.5), 1.0)]);
    let a1 = SectionCode::parse("A-1").unwrap();
    let tiles = tiles_for_section(&index, 5, a1, &g);
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].name, "A-1");
    let b1 = SectionCode::parse("B-1").unwrap();
    assert!(tiles_for_section(&index, 5, b1, &g).is_empty());
    // Wrong level: no tiles, no error.
    assert!(tiles_for_section(&index, 6, a1, &g).is_empty());
}

#[test]
fn level_nine_clamps_to_finest() {
    let g = FieldGeometry::default();
    let index = TileIndex::new(vec![
        TileDescriptor::new("fine", Vec2::new(-9.0625, -9.0625), 0.125),
        TileDescriptor::new("coarse", Vec2::new(-9.5, -9.5), 1.0),
    ]);
    let a1 = SectionCode::parse("A-1").unwrap();
    let tiles = tiles_for_section(&index, 9, a1, &g);
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].name, "fine");
}

#[test]
fn duplicates_are_returned_together() {
    let g = FieldGeometry::default();
    let tile = TileDescriptor::new("dup", Vec2::new(0.5, 0.5), 1.0);
    let index = TileIndex::new(vec![tile.clone(), tile]);
    assert_eq!(index.duplicate_count(), 1);
    let f6 = SectionCode::parse("F-6").unwrap();
    assert_eq!(tiles_for_section(&index, 5, f6, &g).len(), 2);
}
