use fieldmap_geom::Vec2;
use fieldmap_index::TileDescriptor;
use fieldmap_raster::{
    Compositor, ExportError, GridConfig, height_meters, read_r16, write_r16, write_weight_png,
};

const GRID: GridConfig = GridConfig {
    grid_width: 2,
    tile_edge: 4,
};

#[test]
fn r16_round_trips_byte_for_byte() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = Compositor::new(GRID, 500, false);
    let mesh: Vec<u8> = (0..32u8).collect();
    c.place_tile(&TileDescriptor::new("a", Vec2::new(0.5, -0.5), 1.0), &mesh)
        .unwrap();
    let path = dir.path().join("out").join("heightmap_test_all.r16");
    write_r16(&path, c.height()).unwrap();

    let back = read_r16(&path, GRID.height_layout()).unwrap();
    assert_eq!(&back, c.height());
    assert_eq!(std::fs::metadata(&path).unwrap().len(), 8 * 8 * 2);
}

#[test]
fn read_r16_rejects_wrong_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("short.r16");
    std::fs::write(&path, [0u8; 10]).unwrap();
    let err = read_r16(&path, GRID.height_layout()).unwrap_err();
    assert!(matches!(
        err,
        ExportError::SizeMismatch {
            expected: 128,
            actual: 10,
            ..
        }
    ));
}

#[test]
fn weight_png_has_raster_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut c = Compositor::new(GRID, 0, true);
    let tile = TileDescriptor::new("a", Vec2::new(-0.5, -0.5), 1.0);
    c.place_weights(&tile, &[200u8; 64]).unwrap();
    let path = dir.path().join("weightmap_test_all.png");
    write_weight_png(&path, c.weights().unwrap()).unwrap();

    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (8, 8));
    assert_eq!(img.get_pixel(0, 0).0, [200, 200, 200, 200]);
    assert_eq!(img.get_pixel(7, 7).0, [0, 0, 0, 0]);
}

#[test]
fn sample_width_is_checked() {
    let dir = tempfile::tempdir().unwrap();
    let c = Compositor::new(GRID, 0, true);
    let err = write_r16(dir.path().join("x.r16"), c.weights().unwrap()).unwrap_err();
    assert!(matches!(err, ExportError::SampleWidth(4, 2)));
    let err = write_weight_png(dir.path().join("x.png"), c.height()).unwrap_err();
    assert!(matches!(err, ExportError::SampleWidth(2, 4)));
}

#[test]
fn height_scale_to_meters() {
    assert_eq!(height_meters(0), 0.0);
    assert!((height_meters(0xFFFF) - 800.02).abs() < 0.01);
}
