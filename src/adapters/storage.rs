use crate::domain::model::{ImageMime, ImageUpload};
use crate::domain::ports::Storage;
use crate::utils::error::{QuoterError, Result};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: String) -> Self {
        Self { base_path }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }
}

/// 讀取價格表圖片；只接受 PNG 與 JPEG
pub async fn load_image<S: Storage>(storage: &S, path: &str) -> Result<ImageUpload> {
    let mime = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(ImageMime::from_extension)
        .ok_or_else(|| QuoterError::UnsupportedImage {
            path: path.to_string(),
        })?;

    let bytes = storage.read_file(path).await?;
    let name = Path::new(path)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(path)
        .to_string();

    tracing::debug!("Loaded image '{}' ({} bytes)", name, bytes.len());
    Ok(ImageUpload { name, mime, bytes })
}
