use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use image::{ImageBuffer, Rgba};

use crate::layout::RasterLayout;
use crate::raster::GlobalRaster;

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("encode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{path}: {actual} bytes, expected {expected}")]
    SizeMismatch {
        path: PathBuf,
        expected: usize,
        actual: usize,
    },

    #[error("raster has {0}-byte samples; expected {1}")]
    SampleWidth(usize, usize),
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => {
            fs::create_dir_all(dir).map_err(|source| ExportError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

/// Raw little-endian 16-bit heights, headerless, row-major.
pub fn write_r16(path: impl AsRef<Path>, raster: &GlobalRaster) -> Result<(), ExportError> {
    let path = path.as_ref();
    if raster.layout().sample_bytes != 2 {
        return Err(ExportError::SampleWidth(raster.layout().sample_bytes, 2));
    }
    ensure_parent(path)?;
    fs::write(path, raster.as_bytes()).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(
        target: "export",
        "wrote {} ({} bytes, {}x{})",
        path.display(),
        raster.as_bytes().len(),
        raster.layout().pixel_width(),
        raster.layout().pixel_width()
    );
    Ok(())
}

pub fn read_r16(path: impl AsRef<Path>, layout: RasterLayout) -> Result<GlobalRaster, ExportError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let actual = bytes.len();
    GlobalRaster::from_bytes(layout, bytes).ok_or_else(|| ExportError::SizeMismatch {
        path: path.to_path_buf(),
        expected: layout.byte_len(),
        actual,
    })
}

/// Material weights as an RGBA8 PNG; one channel per packed byte.
pub fn write_weight_png(path: impl AsRef<Path>, raster: &GlobalRaster) -> Result<(), ExportError> {
    let path = path.as_ref();
    let layout = raster.layout();
    if layout.sample_bytes != 4 {
        return Err(ExportError::SampleWidth(layout.sample_bytes, 4));
    }
    let side = layout.pixel_width() as u32;
    let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
        ImageBuffer::from_raw(side, side, raster.as_bytes().to_vec()).ok_or_else(|| {
            ExportError::SizeMismatch {
                path: path.to_path_buf(),
                expected: layout.byte_len(),
                actual: raster.as_bytes().len(),
            }
        })?;
    ensure_parent(path)?;
    img.save(path).map_err(|source| ExportError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!(target: "export", "wrote {} ({}x{} RGBA)", path.display(), side, side);
    Ok(())
}
