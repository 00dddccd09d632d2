//! ImageCache - persistent disk cache for scaled images.
//!
//! Scaled images are kept as PNG files named after a hash of the source
//! path, its modification time and the target pixel box.

use image::{ImageFormat, RgbImage};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const EXTENSION: &str = "png";

/// Errors that can occur while writing to the cache.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode cached image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Persistent disk cache for scaled images.
#[derive(Debug, Clone)]
pub struct ImageCache {
    cache_dir: PathBuf,
}

impl ImageCache {
    /// Create an ImageCache with the given cache directory.
    /// Does not create the directory - call `ensure_dir_exists()` to create it.
    pub fn new(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    /// Default cache directory: `~/.cache/termlayer/`.
    pub fn default_dir() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("termlayer")
    }

    /// Ensure the cache directory exists, creating it if necessary.
    /// An already existing directory is not an error.
    pub fn ensure_dir_exists(&self) -> Result<(), std::io::Error> {
        std::fs::create_dir_all(&self.cache_dir)
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Deterministic cache key for a source file scaled into a pixel box.
    /// Returns a 32-character hex string (first 16 bytes of SHA256).
    pub fn key(source: &Path, modified: SystemTime, box_width: u32, box_height: u32) -> String {
        let mtime = modified
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or(0);

        let mut hasher = Sha256::new();
        hasher.update(source.to_string_lossy().as_bytes());
        hasher.update([0u8]);
        hasher.update(mtime.to_le_bytes());
        hasher.update(box_width.to_le_bytes());
        hasher.update(box_height.to_le_bytes());
        let result = hasher.finalize();
        hex::encode(&result[..16])
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.{}", key, EXTENSION))
    }

    /// Get the cached image path for `key`, if present.
    pub fn get(&self, key: &str) -> Option<PathBuf> {
        let path = self.entry_path(key);
        if path.is_file() {
            Some(path)
        } else {
            None
        }
    }

    /// Store a scaled image under `key`.
    ///
    /// The PNG is written to a `.part` file and renamed into place.
    pub fn store(&self, key: &str, image: &RgbImage) -> Result<PathBuf, CacheError> {
        self.ensure_dir_exists()?;
        let final_path = self.entry_path(key);
        let tmp_path = self.cache_dir.join(format!("{}.{}.part", key, EXTENSION));
        image.save_with_format(&tmp_path, ImageFormat::Png)?;
        if let Err(e) = std::fs::rename(&tmp_path, &final_path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(final_path)
    }

    /// Store an image and trim the cache to `max_size_mb`.
    pub fn store_with_cleanup(
        &self,
        key: &str,
        image: &RgbImage,
        max_size_mb: u64,
    ) -> Result<PathBuf, CacheError> {
        let path = self.store(key, image)?;
        self.cleanup_if_needed(max_size_mb)?;
        Ok(path)
    }

    fn cached_files(&self) -> Result<Vec<(PathBuf, std::fs::Metadata)>, std::io::Error> {
        let mut files = Vec::new();
        if !self.cache_dir.exists() {
            return Ok(files);
        }
        for entry in std::fs::read_dir(&self.cache_dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Ok(metadata) = entry.metadata() {
                if metadata.is_file() {
                    files.push((path, metadata));
                }
            }
        }
        Ok(files)
    }

    /// Remove old files if the cache exceeds `max_size_mb`.
    /// Deletes oldest files first (by modification time) until under limit.
    pub fn cleanup_if_needed(&self, max_size_mb: u64) -> Result<(), std::io::Error> {
        let max_size_bytes = max_size_mb.saturating_mul(1024 * 1024);
        let mut files = self.cached_files()?;
        let mut total_size: u64 = files.iter().map(|(_, m)| m.len()).sum();

        if total_size <= max_size_bytes {
            return Ok(());
        }

        files.sort_by_key(|(_, m)| m.modified().unwrap_or(UNIX_EPOCH));

        for (path, metadata) in files {
            if total_size <= max_size_bytes {
                break;
            }
            if std::fs::remove_file(&path).is_ok() {
                total_size = total_size.saturating_sub(metadata.len());
                log::debug!("Evicted cached image {}", path.display());
            }
        }

        Ok(())
    }

    /// Total size of all cached images in bytes.
    pub fn total_size_bytes(&self) -> Result<u64, std::io::Error> {
        Ok(self.cached_files()?.iter().map(|(_, m)| m.len()).sum())
    }

    /// List cached entries sorted by key.
    pub fn list_entries(&self) -> Result<Vec<CacheEntry>, std::io::Error> {
        let mut entries: Vec<CacheEntry> = self
            .cached_files()?
            .into_iter()
            .map(|(path, metadata)| CacheEntry {
                key: path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .unwrap_or("")
                    .to_string(),
                size_bytes: metadata.len(),
                path,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(entries)
    }

    /// Remove all cached images. Returns the number removed.
    pub fn clear_all(&self) -> Result<usize, std::io::Error> {
        let mut count = 0;
        for (path, _) in self.cached_files()? {
            if std::fs::remove_file(&path).is_ok() {
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Information about a cached image.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Cache key (file stem)
    pub key: String,
    /// Size of the PNG in bytes
    pub size_bytes: u64,
    /// Full path to the cached file
    pub path: PathBuf,
}
