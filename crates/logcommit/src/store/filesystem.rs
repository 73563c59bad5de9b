use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::ArchiveStore;
use crate::error::StoreError;

/// `ArchiveStore` over a local directory tree. Keys map to relative paths
/// under the root; objects are created exclusively and never overwritten.
pub struct FilesystemArchiveStore {
    root: PathBuf,
}

impl FilesystemArchiveStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a key to a path, rejecting absolute keys and traversal.
    fn object_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(StoreError::Other(format!("Invalid object key: {}", key)));
        }
        Ok(self.root.join(relative))
    }

    async fn ensure_directory(&self, path: &Path, key: &str) -> Result<(), StoreError> {
        if tokio::fs::symlink_metadata(path).await.is_err() {
            tokio::fs::create_dir_all(path)
                .await
                .map_err(|e| map_io_error(key, e))?;
        }
        Ok(())
    }
}

fn map_io_error(key: &str, e: std::io::Error) -> StoreError {
    match e.kind() {
        ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
        ErrorKind::PermissionDenied => StoreError::AccessDenied {
            key: key.to_string(),
            detail: e.to_string(),
        },
        ErrorKind::AlreadyExists => {
            StoreError::Other(format!("Object '{}' already exists", key))
        }
        _ => StoreError::Other(e.to_string()),
    }
}

#[async_trait]
impl ArchiveStore for FilesystemArchiveStore {
    fn backend_name(&self) -> &'static str {
        "filesystem"
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let path = self.object_path(key)?;
        // symlink_metadata so that broken symlinks still count as taken
        match tokio::fs::symlink_metadata(&path).await {
            Ok(_) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(map_io_error(key, e)),
        }
    }

    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            self.ensure_directory(parent, key).await?;
        }

        // create_new gives O_CREAT | O_EXCL: an existing object is never replaced
        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| map_io_error(key, e))?;

        file.write_all(bytes)
            .await
            .map_err(|e| map_io_error(key, e))?;
        file.sync_all().await.map_err(|e| map_io_error(key, e))?;
        Ok(())
    }
}
