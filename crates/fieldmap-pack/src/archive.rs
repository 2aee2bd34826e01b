use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use hashbrown::HashMap;

#[derive(thiserror::Error, Debug)]
pub enum ArchiveError {
    #[error("read {key} from {path}: {source}")]
    Io {
        key: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("archive entry key {0:?} is not a plain file name")]
    BadKey(String),
}

/// Byte store keyed by entry name (`<tile>.hght`, ...).
///
/// `Ok(None)` means the entry is absent; `Err` means it could not be read.
pub trait Archive: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError>;
}

/// Unpacked archive: one file per entry under `root`.
pub struct DirArchive {
    root: PathBuf,
}

impl DirArchive {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf, ArchiveError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(ArchiveError::BadKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }
}

impl Archive for DirArchive {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let path = self.entry_path(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ArchiveError::Io {
                key: key.to_string(),
                path,
                source,
            }),
        }
    }
}

/// In-memory archive, handy for tools that already decompressed a pack.
#[derive(Default)]
pub struct MemoryArchive {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: impl Into<String>, bytes: Vec<u8>) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(key.into(), bytes);
    }

    pub fn remove(&self, key: &str) -> Option<Vec<u8>> {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Archive for MemoryArchive {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.get(key).cloned())
    }
}
