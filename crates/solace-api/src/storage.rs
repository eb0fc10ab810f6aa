use anyhow::Result;
use std::path::PathBuf;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// On-disk store for uploaded diary images.
///
/// Each image is a single flat file at `{dir}/{media_id}`; metadata (owner,
/// content type) lives in the `media` table.
pub struct MediaStore {
    dir: PathBuf,
}

impl MediaStore {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Media storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, id: Uuid) -> PathBuf {
        self.dir.join(id.to_string())
    }

    pub async fn save(&self, id: Uuid, data: &[u8]) -> Result<()> {
        let path = self.file_path(id);
        let mut file = fs::File::create(&path).await?;
        file.write_all(data).await?;
        file.flush().await?;
        Ok(())
    }

    pub async fn read(&self, id: Uuid) -> Result<Vec<u8>> {
        Ok(fs::read(self.file_path(id)).await?)
    }

    pub async fn exists(&self, id: Uuid) -> bool {
        fs::try_exists(self.file_path(id)).await.unwrap_or(false)
    }

    /// Missing files are not an error.
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let path = self.file_path(id);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted media {}", id);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Media {} already gone", id);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
