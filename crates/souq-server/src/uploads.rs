//! Image upload pipeline.
//!
//! Incoming multipart file parts are validated and written to the content
//! directory through a [`StagedBatch`]: files land on disk as they arrive,
//! and any validation failure later in the same batch discards everything
//! staged so far, so a rejected request leaves no orphaned files behind.
//!
//! Stored files are renamed to `<millis>-<random-9-digits><ext>`; the
//! original filename is discarded except for its extension.

use std::path::{Path, PathBuf};

use chrono::Utc;
use rand::Rng;
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::ApiError;

/// Offers created through the full pipeline carry exactly this many images.
pub const REQUIRED_IMAGE_COUNT: usize = 4;

/// Collision-resistant name for a stored upload, keeping only the original
/// extension.
fn stored_file_name(original: &str) -> String {
    let ext = Path::new(original)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
        .unwrap_or_default();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("{}-{:09}{}", Utc::now().timestamp_millis(), suffix, ext)
}

/// Owner of the content directory where uploaded images live.
#[derive(Debug)]
pub struct UploadStore {
    base_dir: PathBuf,
    max_size: usize,
}

impl UploadStore {
    /// Create the store, recursively creating the content directory if it
    /// does not exist yet.
    pub async fn new(base_dir: impl AsRef<Path>, max_size: usize) -> Result<Self, ApiError> {
        let base_dir = base_dir.as_ref().to_path_buf();

        fs::create_dir_all(&base_dir).await.map_err(|e| {
            ApiError::Internal(format!(
                "Failed to create upload directory '{}': {}",
                base_dir.display(),
                e
            ))
        })?;

        info!(path = %base_dir.display(), "Upload store initialized");

        Ok(Self { base_dir, max_size })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Start staging an upload batch.
    pub fn begin_batch(&self) -> StagedBatch<'_> {
        StagedBatch {
            store: self,
            staged: Vec::new(),
        }
    }

    /// Public URL for each stored filename, resolvable by the client that
    /// made the request. `scheme` should honor `x-forwarded-proto` so URLs
    /// stay correct behind a reverse proxy; `host` is the inbound Host
    /// header verbatim.
    pub fn public_urls(&self, stored: &[String], scheme: &str, host: &str) -> Vec<String> {
        stored
            .iter()
            .map(|name| format!("{scheme}://{host}/uploads/{name}"))
            .collect()
    }

    /// Best-effort removal of the files behind the given image URLs.
    ///
    /// Takes the trailing path component of each URL and deletes that file
    /// from the content directory. Missing files and OS failures are logged
    /// and ignored; this never fails the surrounding delete operation.
    pub async fn delete_files(&self, urls: &[String]) {
        for url in urls {
            let name = url.rsplit('/').next().unwrap_or("");
            if name.is_empty() || name.contains("..") || name.contains('\\') {
                warn!(url = %url, "Skipping suspicious image URL during cleanup");
                continue;
            }

            let path = self.base_dir.join(name);
            match fs::remove_file(&path).await {
                Ok(()) => debug!(file = name, "Deleted image file"),
                Err(e) => warn!(file = name, error = %e, "Failed to delete image file"),
            }
        }
    }
}

/// An in-progress upload batch. Accepted files are already on disk; the
/// batch tracks them so they can be discarded together if the request is
/// ultimately rejected.
pub struct StagedBatch<'a> {
    store: &'a UploadStore,
    staged: Vec<String>,
}

impl StagedBatch<'_> {
    /// Validate one file part and write it to the content directory.
    ///
    /// Rejections happen per file, in arrival order: a non-image third part
    /// fails with "file must be an image" before the batch size is ever
    /// checked. The caller must [`discard`](Self::discard) the batch when
    /// this returns an error.
    pub async fn add(
        &mut self,
        file_name: &str,
        content_type: &str,
        data: &[u8],
    ) -> Result<(), ApiError> {
        if !content_type.starts_with("image/") {
            return Err(ApiError::Validation("file must be an image".to_string()));
        }
        if data.len() > self.store.max_size {
            return Err(ApiError::Validation(format!(
                "image exceeds the maximum size of {} bytes",
                self.store.max_size
            )));
        }

        let stored = stored_file_name(file_name);
        let path = self.store.base_dir.join(&stored);

        fs::write(&path, data).await.map_err(|e| {
            ApiError::Internal(format!("Failed to write upload '{}': {}", stored, e))
        })?;

        debug!(file = %stored, size = data.len(), "Staged uploaded image");
        self.staged.push(stored);
        Ok(())
    }

    /// Enforce the exact batch size and hand back the stored filenames.
    /// A wrong count discards everything staged before returning the error.
    pub async fn finish(mut self) -> Result<Vec<String>, ApiError> {
        if self.staged.len() != REQUIRED_IMAGE_COUNT {
            self.discard().await;
            return Err(ApiError::Validation("must upload 4 images".to_string()));
        }
        Ok(std::mem::take(&mut self.staged))
    }

    /// Best-effort removal of everything staged so far.
    pub async fn discard(&mut self) {
        for name in self.staged.drain(..) {
            let path = self.store.base_dir.join(&name);
            if let Err(e) = fs::remove_file(&path).await {
                warn!(file = %name, error = %e, "Failed to discard staged upload");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn test_store() -> (UploadStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = UploadStore::new(dir.path().join("uploads"), 1024)
            .await
            .unwrap();
        (store, dir)
    }

    fn dir_count(store: &UploadStore) -> usize {
        std::fs::read_dir(store.base_dir()).unwrap().count()
    }

    #[tokio::test]
    async fn batch_of_four_is_accepted() {
        let (store, _dir) = test_store().await;

        let mut batch = store.begin_batch();
        for i in 0..4 {
            batch
                .add(&format!("photo{i}.jpg"), "image/jpeg", b"jpegdata")
                .await
                .unwrap();
        }
        let stored = batch.finish().await.unwrap();

        assert_eq!(stored.len(), 4);
        assert_eq!(dir_count(&store), 4);
        for name in &stored {
            assert!(name.ends_with(".jpg"));
            assert!(store.base_dir().join(name).is_file());
        }
    }

    #[tokio::test]
    async fn stored_names_are_millis_dash_nine_digits() {
        let (store, _dir) = test_store().await;

        let mut batch = store.begin_batch();
        batch.add("cat.png", "image/png", b"png").await.unwrap();
        let name = &batch.staged[0];

        let stem = name.strip_suffix(".png").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().unwrap() > 0);
        assert_eq!(suffix.len(), 9);
        assert!(suffix.chars().all(|c| c.is_ascii_digit()));

        // No extension on the original means none on the stored name.
        batch.add("noext", "image/png", b"png").await.unwrap();
        let bare = &batch.staged[1];
        assert!(!bare.contains('.'));

        batch.discard().await;
    }

    #[tokio::test]
    async fn non_image_is_rejected_per_file() {
        let (store, _dir) = test_store().await;

        let mut batch = store.begin_batch();
        batch.add("a.jpg", "image/jpeg", b"ok").await.unwrap();

        let err = batch.add("b.txt", "text/plain", b"nope").await.unwrap_err();
        assert!(err.to_string().contains("must be an image"));

        batch.discard().await;
        assert_eq!(dir_count(&store), 0);
    }

    #[tokio::test]
    async fn oversized_image_is_rejected() {
        let (store, _dir) = test_store().await;
        let big = vec![0u8; 2048]; // store limit is 1024 in tests

        let mut batch = store.begin_batch();
        let err = batch.add("big.jpg", "image/jpeg", &big).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        batch.discard().await;
        assert_eq!(dir_count(&store), 0);
    }

    #[tokio::test]
    async fn wrong_count_discards_staged_files() {
        let (store, _dir) = test_store().await;

        let mut batch = store.begin_batch();
        for i in 0..3 {
            batch
                .add(&format!("p{i}.jpg"), "image/jpeg", b"x")
                .await
                .unwrap();
        }
        assert_eq!(dir_count(&store), 3);

        let err = batch.finish().await.unwrap_err();
        assert!(err.to_string().contains("must upload 4 images"));
        assert_eq!(dir_count(&store), 0);
    }

    #[tokio::test]
    async fn public_urls_use_scheme_and_host() {
        let (store, _dir) = test_store().await;
        let stored = vec!["1-000000001.jpg".to_string()];

        let urls = store.public_urls(&stored, "https", "shop.example.com");
        assert_eq!(urls, ["https://shop.example.com/uploads/1-000000001.jpg"]);
    }

    #[tokio::test]
    async fn delete_files_removes_only_the_trailing_component() {
        let (store, _dir) = test_store().await;

        let mut batch = store.begin_batch();
        batch.add("a.jpg", "image/jpeg", b"x").await.unwrap();
        let name = batch.staged[0].clone();
        drop(batch);

        let url = format!("http://host/uploads/{name}");
        store.delete_files(&[url]).await;
        assert_eq!(dir_count(&store), 0);
    }

    #[tokio::test]
    async fn delete_files_swallows_missing_and_suspicious_names() {
        let (store, _dir) = test_store().await;

        // Neither of these should panic, error, or escape the content dir.
        store
            .delete_files(&[
                "http://host/uploads/does-not-exist.jpg".to_string(),
                "http://host/uploads/..".to_string(),
            ])
            .await;
        assert_eq!(dir_count(&store), 0);
    }
}
