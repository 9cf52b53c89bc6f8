//! Filesystem storage for user photos
//!
//! Photos live flat under a single root directory. Each stored file is named
//! `<discriminator>_<original file name>`, where the discriminator is a Unix
//! millisecond timestamp that never repeats within the process. Callers only
//! ever see paths relative to the root.

use chrono::Utc;
use std::{
    io,
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicI64, Ordering},
    },
};
use tokio::fs;
use tracing::debug;

const FALLBACK_FILE_NAME: &str = "photo";

/// Photo storage rooted at a configured directory
#[derive(Debug, Clone)]
pub struct PhotoStore {
    root: PathBuf,
    last_discriminator: Arc<AtomicI64>,
}

impl PhotoStore {
    /// Create a store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            last_discriminator: Arc::new(AtomicI64::new(0)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute (or root-relative) location of a stored photo
    pub fn resolve(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Millisecond timestamp, bumped past the previous value when the clock
    /// has not advanced
    fn next_discriminator(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        let previous = self
            .last_discriminator
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
                Some(now.max(last + 1))
            })
            .unwrap_or_else(|last| last);

        now.max(previous + 1)
    }

    /// Storage name for an uploaded file
    pub fn storage_name(&self, original_file_name: &str) -> String {
        format!(
            "{}_{}",
            self.next_discriminator(),
            sanitize_file_name(original_file_name)
        )
    }

    /// Write `bytes` under a fresh storage name and return its relative path
    pub async fn write(&self, original_file_name: &str, bytes: &[u8]) -> io::Result<String> {
        fs::create_dir_all(&self.root).await?;

        let name = self.storage_name(original_file_name);
        fs::write(self.resolve(&name), bytes).await?;

        debug!(file = %name, size = bytes.len(), "Stored photo");
        Ok(name)
    }

    pub async fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        fs::read(self.resolve(relative)).await
    }

    pub async fn remove(&self, relative: &str) -> io::Result<()> {
        fs::remove_file(self.resolve(relative)).await?;
        debug!(file = %relative, "Removed photo");
        Ok(())
    }

    pub async fn exists(&self, relative: &str) -> io::Result<bool> {
        fs::try_exists(self.resolve(relative)).await
    }
}

/// Keep only the final path component of a client-supplied file name
fn sanitize_file_name(original: &str) -> String {
    let name = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    match name {
        "" | "." | ".." => FALLBACK_FILE_NAME.to_string(),
        name => name.to_string(),
    }
}

/// Response content type for a stored photo, guessed from its extension
pub fn content_type(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}
