// src/services/storage.rs
// DOCUMENTATION: On-disk storage for uploaded images
// PURPOSE: Each upload is a flat file `{upload_dir}/{uuid}.{ext}`

use anyhow::{bail, Result};
use std::path::PathBuf;
use tokio::fs;

/// Accepted image types and the extension they are stored under
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/webp", "webp"),
    ("image/gif", "gif"),
];

pub fn extension_for(content_type: &str) -> Option<&'static str> {
    let mime = content_type.split(';').next()?.trim().to_ascii_lowercase();
    IMAGE_TYPES
        .iter()
        .find(|(ct, _)| *ct == mime)
        .map(|(_, ext)| *ext)
}

pub fn content_type_for(filename: &str) -> Option<&'static str> {
    let ext = filename.rsplit_once('.')?.1.to_ascii_lowercase();
    let ext = if ext == "jpeg" { "jpg".to_string() } else { ext };
    IMAGE_TYPES
        .iter()
        .find(|(_, e)| *e == ext)
        .map(|(ct, _)| *ct)
}

/// Only names this service generates: a plain stem plus one extension
pub fn is_safe_filename(name: &str) -> bool {
    let Some((stem, ext)) = name.split_once('.') else {
        return false;
    };
    !stem.is_empty()
        && !ext.is_empty()
        && stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub size: usize,
}

pub struct UploadStorage {
    dir: PathBuf,
}

impl UploadStorage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        log::info!("Upload directory: {}", dir.display());
        Ok(Self { dir })
    }

    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    pub async fn save(&self, content_type: &str, data: &[u8]) -> Result<StoredFile> {
        let Some(ext) = extension_for(content_type) else {
            bail!("unsupported content type {}", content_type);
        };

        let filename = format!("{}.{}", uuid::Uuid::new_v4(), ext);
        fs::write(self.file_path(&filename), data).await?;

        log::info!("Stored upload {} ({} bytes)", filename, data.len());
        Ok(StoredFile {
            filename,
            size: data.len(),
        })
    }

    /// `None` when the name is not one of ours or the file is gone
    pub async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>> {
        if !is_safe_filename(filename) {
            log::warn!("Rejected upload path {:?}", filename);
            return Ok(None);
        }

        match fs::read(self.file_path(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for("image/png"), Some("png"));
        assert_eq!(extension_for("image/JPEG; charset=binary"), Some("jpg"));
        assert_eq!(extension_for("application/pdf"), None);
        assert_eq!(extension_for(""), None);
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("a.webp"), Some("image/webp"));
        assert_eq!(content_type_for("a.jpeg"), Some("image/jpeg"));
        assert_eq!(content_type_for("a.exe"), None);
        assert_eq!(content_type_for("noext"), None);
    }

    #[test]
    fn test_is_safe_filename() {
        assert!(is_safe_filename("0b7c3a4e-1f2d-4c5b-9a8e-7d6c5b4a3f2e.png"));
        assert!(!is_safe_filename("../etc/passwd"));
        assert!(!is_safe_filename("..png"));
        assert!(!is_safe_filename("a/b.png"));
        assert!(!is_safe_filename("a.b.png"));
        assert!(!is_safe_filename("noext"));
    }

    #[tokio::test]
    async fn test_save_and_read() {
        let dir = std::env::temp_dir().join(format!("donasi-storage-{}", uuid::Uuid::new_v4()));
        let storage = UploadStorage::new(dir.clone()).await.unwrap();

        let stored = storage.save("image/gif", b"GIF89a").await.unwrap();
        assert!(stored.filename.ends_with(".gif"));
        assert_eq!(stored.size, 6);

        let bytes = storage.read(&stored.filename).await.unwrap();
        assert_eq!(bytes.as_deref(), Some(&b"GIF89a"[..]));
        assert!(storage.read("missing.png").await.unwrap().is_none());
        assert!(storage.save("text/plain", b"hi").await.is_err());

        let _ = tokio::fs::remove_dir_all(dir).await;
    }
}
