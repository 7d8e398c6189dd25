//! Storage module - flat dataset directory
//!
//! Files are addressed by their sanitized upload name. Nothing here locks:
//! concurrent writers to the same name race and the last write wins.

use std::io;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tokio::fs;

use crate::models::StoredFile;
use crate::upload::is_secure;

#[derive(Debug, Clone)]
pub struct DatasetStore {
    dir: PathBuf,
}

impl DatasetStore {
    /// Open the storage directory, creating it if absent
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        tracing::info!("Dataset storage ready at {}", dir.display());
        Ok(Self { dir })
    }

    /// Path for a stored name. Names that are not already sanitized are
    /// refused so nothing can resolve outside the directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        is_secure(name).then(|| self.dir.join(name))
    }

    /// Look up a stored file; `None` when the name is unsafe or the file is gone
    pub async fn find(&self, name: &str) -> io::Result<Option<StoredFile>> {
        let Some(path) = self.resolve(name) else {
            return Ok(None);
        };
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Ok(Some(stored_file(name.to_string(), path, &meta))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Write `bytes` under `name`, replacing any previous file of that name
    pub async fn save(&self, name: &str, bytes: &[u8]) -> io::Result<StoredFile> {
        let path = self.resolve(name).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, format!("unsafe file name: {name}"))
        })?;
        fs::write(&path, bytes).await?;
        let meta = fs::metadata(&path).await?;
        Ok(stored_file(name.to_string(), path, &meta))
    }

    /// Remove one file. Missing files and unsafe names are a no-op.
    pub async fn remove(&self, name: &str) -> io::Result<bool> {
        let Some(path) = self.resolve(name) else {
            return Ok(false);
        };
        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Remove every regular file in the directory; sub-directories stay
    pub async fn clear(&self) -> io::Result<usize> {
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match fs::remove_file(entry.path()).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }
        Ok(removed)
    }

    /// All regular files, sorted by name
    pub async fn list(&self) -> io::Result<Vec<StoredFile>> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            files.push(stored_file(name, entry.path(), &meta));
        }
        files.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(files)
    }
}

fn stored_file(name: String, path: PathBuf, meta: &std::fs::Metadata) -> StoredFile {
    StoredFile {
        name,
        path,
        size_bytes: meta.len(),
        modified_at: meta.modified().ok().map(DateTime::<Utc>::from),
    }
}
