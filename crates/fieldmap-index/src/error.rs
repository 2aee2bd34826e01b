use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    #[error("invalid LOD level {0} (expected 0..=8)")]
    InvalidLevel(i32),

    #[error("invalid section code {0:?} (expected A-J followed by 1-9)")]
    InvalidSectionCode(String),

    #[error("failed to read index {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad TSCB magic {0:?}")]
    BadMagic([u8; 4]),

    #[error("TSCB truncated: need {needed} bytes at offset {offset:#x}")]
    Truncated { offset: usize, needed: usize },

    #[error("TSCB name at offset {offset:#x} is not valid UTF-8")]
    InvalidName { offset: usize },

    #[error("tile {name} has area size {scale}, which is not a LOD scale")]
    UnknownLodScale { name: String, scale: f32 },
}
