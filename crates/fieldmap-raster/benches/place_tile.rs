use criterion::{Criterion, black_box, criterion_group, criterion_main};

use fieldmap_geom::Vec2;
use fieldmap_index::TileDescriptor;
use fieldmap_raster::{Compositor, GridConfig};

fn bench_place_tile_reference_grid(c: &mut Criterion) {
    let mut group = c.benchmark_group("place_tile");
    let grid = GridConfig::default();
    let mesh = vec![0x5Au8; grid.height_layout().tile_bytes()];
    let h = grid.half_extent();
    let tiles: Vec<TileDescriptor> = (0..grid.grid_width)
        .map(|i| TileDescriptor::new(format!("t{i}"), Vec2::new(i as f32 - h, i as f32 - h), 1.0))
        .collect();
    let mut comp = Compositor::new(grid, 0, false);
    group.bench_function("diagonal_20_tiles_256", |b| {
        b.iter(|| {
            for t in &tiles {
                black_box(comp.place_tile(t, &mesh).ok());
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_place_tile_reference_grid);
criterion_main!(benches);
