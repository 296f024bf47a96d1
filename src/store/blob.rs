// src/store/blob.rs

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};
use tracing::trace;

/// Somewhere to keep the most recent upload. The content is opaque here.
pub trait BlobStore: Send + Sync {
    fn put(&self, bytes: &[u8]) -> io::Result<()>;
    /// `Ok(None)` when nothing has been stored yet.
    fn get(&self) -> io::Result<Option<Vec<u8>>>;
}

/// A single file on disk. Writes go to a `.tmp` sibling first and are renamed
/// into place, so a reader only ever sees a complete upload.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    path: PathBuf,
}

impl FsBlobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "blob".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl BlobStore for FsBlobStore {
    fn put(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp_path = self.tmp_path();
        let mut tmp = fs::File::create(&tmp_path)
            .map_err(|e| io::Error::new(e.kind(), format!("creating {:?}: {}", tmp_path, e)))?;
        tmp.write_all(bytes)?;
        tmp.sync_all()?;
        drop(tmp);

        fs::rename(&tmp_path, &self.path).map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("renaming {:?} -> {:?}: {}", tmp_path, self.path, e),
            )
        })?;
        trace!(path = %self.path.display(), bytes = bytes.len(), "blob written");
        Ok(())
    }

    fn get(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io::Error::new(
                e.kind(),
                format!("reading {:?}: {}", self.path, e),
            )),
        }
    }
}

/// In-process blob, mostly for tests.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl BlobStore for MemoryBlobStore {
    fn put(&self, bytes: &[u8]) -> io::Result<()> {
        *self.bytes.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes.to_vec());
        Ok(())
    }

    fn get(&self) -> io::Result<Option<Vec<u8>>> {
        Ok(self
            .bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone())
    }
}
