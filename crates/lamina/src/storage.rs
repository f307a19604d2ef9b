//! Persistence of extracted binary assets.

use crate::decode::ImageData;
use crate::error::{LaminaError, Result};
use crate::fsutil::resolve_unique_path;
use std::path::PathBuf;
use uuid::Uuid;

/// Sink for binary assets pulled out of a document. Returns a reference
/// string the emitted elements carry in place of the bytes.
pub trait AssetStorage: Send + Sync {
    /// Store `image` under a name derived from `context_prefix` and return
    /// the reference to record in the output.
    fn store(&self, image: &ImageData, context_prefix: &str) -> Result<String>;
}

/// Stores assets as files in a directory, creating it on first use. File
/// names are `<prefix>_<uuid8>.<suffix>`; collisions with pre-existing
/// files resolve through numeric suffixes.
#[derive(Debug, Clone)]
pub struct LocalAssetStorage {
    directory: PathBuf,
}

impl LocalAssetStorage {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }
}

impl AssetStorage for LocalAssetStorage {
    fn store(&self, image: &ImageData, context_prefix: &str) -> Result<String> {
        std::fs::create_dir_all(&self.directory).map_err(|e| {
            LaminaError::storage_with_source(
                format!("Failed to create asset directory {}", self.directory.display()),
                e,
            )
        })?;

        let id = Uuid::new_v4().simple().to_string();
        let name = format!("{context_prefix}_{}.{}", &id[..8], image.suffix);
        let path = resolve_unique_path(&self.directory.join(name))?;

        std::fs::write(&path, &image.bytes).map_err(|e| {
            LaminaError::storage_with_source(
                format!("Failed to write asset {}", path.display()),
                e,
            )
        })?;

        Ok(path.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image() -> ImageData {
        ImageData {
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
            suffix: "png".to_string(),
            native_width: 10,
            native_height: 10,
        }
    }

    #[test]
    fn test_store_creates_directory_and_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path().join("assets"));

        let reference = storage.store(&image(), "report_p1").unwrap();

        let path = std::path::Path::new(&reference);
        assert!(path.exists());
        assert_eq!(std::fs::read(path).unwrap(), image().bytes);
        let name = path.file_name().unwrap().to_string_lossy();
        assert!(name.starts_with("report_p1_"));
        assert!(name.ends_with(".png"));
    }

    #[test]
    fn test_store_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let storage = LocalAssetStorage::new(dir.path());

        let a = storage.store(&image(), "doc").unwrap();
        let b = storage.store(&image(), "doc").unwrap();
        assert_ne!(a, b);
    }
}
