use fieldmap_geom::Vec2;
use fieldmap_index::TileDescriptor;
use fieldmap_pack::{
    Archive, ArchiveError, DirArchive, MemoryArchive, ResourceLayout, TileError, load_resources,
};

const LAYOUT: ResourceLayout = ResourceLayout { tile_edge: 4 };

fn tile(name: &str) -> TileDescriptor {
    TileDescriptor::new(name, Vec2::new(0.5, 0.5), 1.0)
}

struct BrokenArchive;

impl Archive for BrokenArchive {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        Err(ArchiveError::BadKey(key.to_string()))
    }
}

#[test]
fn full_triple_loads() {
    let archive = MemoryArchive::new();
    archive.insert("t0.hght", vec![7; LAYOUT.mesh_len()]);
    archive.insert("t0.mate", vec![1; LAYOUT.material_len()]);
    archive.insert("t0.water.extm", vec![2; 12]);
    let res = load_resources(&archive, &tile("t0"), &LAYOUT).unwrap();
    assert_eq!(res.mesh.len(), 32);
    assert_eq!(res.material.as_deref().map(<[u8]>::len), Some(64));
    assert_eq!(res.water, Some(vec![2; 12]));
}

#[test]
fn mesh_only_is_enough() {
    let archive = MemoryArchive::new();
    archive.insert("t0.hght", vec![0; LAYOUT.mesh_len()]);
    let res = load_resources(&archive, &tile("t0"), &LAYOUT).unwrap();
    assert!(res.material.is_none());
    assert!(res.water.is_none());
}

#[test]
fn missing_mesh_is_reported_for_that_tile() {
    let archive = MemoryArchive::new();
    archive.insert("t0.mate", vec![1; LAYOUT.material_len()]);
    let err = load_resources(&archive, &tile("t0"), &LAYOUT).unwrap_err();
    assert!(matches!(err, TileError::MissingTileMesh { .. }));
    assert_eq!(err.tile_name(), "t0");
}

#[test]
fn wrong_sized_buffers() {
    let archive = MemoryArchive::new();
    archive.insert("short.hght", vec![0; 3]);
    let err = load_resources(&archive, &tile("short"), &LAYOUT).unwrap_err();
    assert!(matches!(err, TileError::MeshSizeMismatch { expected: 32, actual: 3, .. }));

    archive.insert("ok.hght", vec![0; LAYOUT.mesh_len()]);
    archive.insert("ok.mate", vec![0; 5]);
    let res = load_resources(&archive, &tile("ok"), &LAYOUT).unwrap();
    assert!(res.material.is_none());
}

#[test]
fn archive_failure_is_tile_scoped() {
    let err = load_resources(&BrokenArchive, &tile("t0"), &LAYOUT).unwrap_err();
    assert!(matches!(err, TileError::ArchiveReadFailure { .. }));
}

#[test]
fn dir_archive_reads_unpacked_files() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("t1.hght"), vec![9u8; LAYOUT.mesh_len()]).unwrap();
    let archive = DirArchive::new(dir.path());
    let res = load_resources(&archive, &tile("t1"), &LAYOUT).unwrap();
    assert!(res.mesh.iter().all(|&b| b == 9));
    assert!(matches!(
        load_resources(&archive, &tile("t2"), &LAYOUT),
        Err(TileError::MissingTileMesh { .. })
    ));
    assert!(matches!(archive.read("../t1.hght"), Err(ArchiveError::BadKey(_))));
}
