//! The local log file the pipeline deletes once both remote writes are durable.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::SourceError;

#[async_trait]
pub trait SourceFile: Send + Sync {
    /// Path shown in logs and messages.
    fn path(&self) -> &Path;

    async fn delete_source(&self) -> Result<(), SourceError>;
}

/// A log file on the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalSourceFile {
    path: PathBuf,
}

impl LocalSourceFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

#[async_trait]
impl SourceFile for LocalSourceFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn delete_source(&self) -> Result<(), SourceError> {
        let metadata = match tokio::fs::metadata(&self.path).await {
            Ok(m) if m.is_file() => m,
            _ => return Err(SourceError::NotAFile(self.path.clone())),
        };

        let mut permissions = metadata.permissions();
        if permissions.readonly() {
            #[allow(clippy::permissions_set_readonly_false)]
            permissions.set_readonly(false);
            tokio::fs::set_permissions(&self.path, permissions)
                .await
                .map_err(|source| SourceError::Permissions {
                    path: self.path.clone(),
                    source,
                })?;
        }

        tokio::fs::remove_file(&self.path)
            .await
            .map_err(|source| SourceError::Remove {
                path: self.path.clone(),
                source,
            })
    }
}
