use async_trait::async_trait;
use dasq_lib::{DasqError, DataAvailabilityHeader, Share, ShareKey, ShareStore};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Share store over a directory holding one extended square, as `row.<r>/share<c>.data` files next to its `dah.commit`.
pub struct FileShareStore {
    square_dir_path: PathBuf,
    dah_hash: blake3::Hash,
}

impl FileShareStore {
    pub fn new(square_dir_path: &Path, dah: &DataAvailabilityHeader) -> Self {
        FileShareStore {
            square_dir_path: square_dir_path.to_path_buf(),
            dah_hash: dah.hash(),
        }
    }

    pub fn share_path(&self, row: usize, col: usize) -> PathBuf {
        let mut share_path = self.square_dir_path.clone();
        share_path.push(format!("row.{}", row));
        share_path.push(format!("share{:03}.data", col));
        share_path
    }
}

#[async_trait]
impl ShareStore for FileShareStore {
    async fn get(&self, key: &ShareKey) -> Result<Share, DasqError> {
        if key.dah_hash != self.dah_hash {
            return Err(DasqError::NotFound(key.row, key.col));
        }

        match tokio::fs::read(self.share_path(key.row, key.col)).await {
            Ok(bytes) => Share::new(bytes),
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(row = key.row, col = key.col, %e, "failed to read share file");
                }
                Err(DasqError::NotFound(key.row, key.col))
            }
        }
    }

    async fn put(&self, key: ShareKey, share: Share) -> Result<(), DasqError> {
        let share_path = self.share_path(key.row, key.col);

        if let Some(row_dir_path) = share_path.parent() {
            tokio::fs::create_dir_all(row_dir_path).await.map_err(|e| DasqError::StoreFailed(e.to_string()))?;
        }
        tokio::fs::write(&share_path, share.as_bytes()).await.map_err(|e| DasqError::StoreFailed(e.to_string()))
    }
}
