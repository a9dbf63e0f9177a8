use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{Result, SceneError};

/// Supplies the binary blobs a scene file refers to by `src` path.
pub trait DataSource {
    fn read(&mut self, src: &str) -> Result<Arc<[u8]>>;
}

/// Reads blobs from disk relative to a base directory, caching each file.
///
/// Attribute arrays of one mesh usually share a file, so every blob is read
/// at most once.
#[derive(Debug)]
pub struct FsSource {
    root: PathBuf,
    cache: HashMap<String, Arc<[u8]>>,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), cache: HashMap::new() }
    }

    /// A source rooted at the directory containing `scene_path`.
    pub fn beside(scene_path: &Path) -> Self {
        Self::new(scene_path.parent().unwrap_or_else(|| Path::new(".")))
    }
}

impl DataSource for FsSource {
    fn read(&mut self, src: &str) -> Result<Arc<[u8]>> {
        if let Some(hit) = self.cache.get(src) {
            return Ok(hit.clone());
        }

        let path = self.root.join(src);
        let bytes: Arc<[u8]> = std::fs::read(&path)
            .map_err(|source| SceneError::Io { path: path.display().to_string(), source })?
            .into();

        log::debug!("read {} bytes from {}", bytes.len(), path.display());
        self.cache.insert(src.to_string(), bytes.clone());
        Ok(bytes)
    }
}

/// In-memory blobs keyed by `src`.
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    blobs: HashMap<String, Arc<[u8]>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.blobs.insert(src.into(), bytes.into().into());
    }

    pub fn with(mut self, src: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.insert(src, bytes);
        self
    }
}

impl DataSource for MemorySource {
    fn read(&mut self, src: &str) -> Result<Arc<[u8]>> {
        self.blobs.get(src).cloned().ok_or_else(|| SceneError::Io {
            path: src.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such blob"),
        })
    }
}
