//! Local filesystem access via tokio

use super::{FileService, ServiceError};
use std::path::Path;

/// [`FileService`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileService;

impl FileService for LocalFileService {
    async fn read_file(&self, path: &Path) -> Result<String, ServiceError> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ServiceError::io(path, e))
    }

    async fn write_file(&self, path: &Path, content: &str) -> Result<(), ServiceError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::io(parent, e))?;
        }
        tokio::fs::write(path, content)
            .await
            .map_err(|e| ServiceError::io(path, e))?;
        log::debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }
}
