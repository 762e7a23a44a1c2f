use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use uuid::Uuid;

/// Filesystem store for processed result images
///
/// Results are written as `<output_dir>/<request-id>.jpg`. Ids are generated
/// per request, so no two requests ever share an output path.
pub struct ResultStore {
    output_dir: PathBuf,
}

impl ResultStore {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Create the output directory if it does not exist yet
    pub async fn prepare(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .with_context(|| format!("creating output dir {}", self.output_dir.display()))?;
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Location the result with this id is written to
    pub fn path_for(&self, id: &Uuid) -> PathBuf {
        self.output_dir.join(format!("{}.jpg", id))
    }

    /// Open a stored result for streaming; None when the id is unknown
    pub async fn open(&self, id: &Uuid) -> std::io::Result<Option<tokio::fs::File>> {
        match tokio::fs::File::open(self.path_for(id)).await {
            Ok(file) => Ok(Some(file)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether the output directory exists and is a directory
    pub async fn is_available(&self) -> bool {
        tokio::fs::metadata(&self.output_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prepare_creates_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path().join("output"));
        assert!(!store.is_available().await);

        store.prepare().await.unwrap();
        assert!(store.is_available().await);
    }

    #[tokio::test]
    async fn test_path_for_uses_id_and_jpg_extension() {
        let store = ResultStore::new("output");
        let id = Uuid::new_v4();
        assert_eq!(store.path_for(&id), PathBuf::from(format!("output/{}.jpg", id)));
    }

    #[tokio::test]
    async fn test_open_returns_none_for_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        assert!(store.open(&Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_returns_stored_result() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::new(dir.path());
        let id = Uuid::new_v4();
        tokio::fs::write(store.path_for(&id), b"jpeg").await.unwrap();

        assert!(store.open(&id).await.unwrap().is_some());
    }
}
