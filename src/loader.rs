//! Image decoding and scaling.
//!
//! [`ImageLoader`] is the seam the command loop calls; [`DiskLoader`] is the
//! production implementation backed by the `image` crate and the on-disk
//! [`ImageCache`].

use image::imageops::FilterType;
use image::{DynamicImage, RgbImage};
use std::path::Path;

use crate::cache::ImageCache;
use crate::geometry::{fit_within, Placement};
use crate::terminal::TerminalContext;

/// A decoded image, already scaled to fit its placement.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageHandle {
    image: RgbImage,
}

impl ImageHandle {
    pub fn from_rgb(image: RgbImage) -> Self {
        Self { image }
    }

    /// A single-color image, handy for tests and placeholders.
    pub fn solid(width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_rgb(RgbImage::from_pixel(width, height, image::Rgb(rgb)))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGB value at (x, y); out-of-range coordinates read as black.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        if x < self.width() && y < self.height() {
            self.image.get_pixel(x, y).0
        } else {
            [0, 0, 0]
        }
    }

    pub fn as_rgb(&self) -> &RgbImage {
        &self.image
    }
}

/// Source of decoded images.
///
/// Implementations must not panic; any read or decode failure is reported
/// as `None`.
pub trait ImageLoader {
    fn load(&self, ctx: &TerminalContext, placement: &Placement, path: &Path) -> Option<ImageHandle>;
}

/// Loads images from the filesystem, optionally through an [`ImageCache`].
#[derive(Debug, Clone)]
pub struct DiskLoader {
    cache: Option<ImageCache>,
    max_cache_mb: u64,
}

impl DiskLoader {
    /// A loader that always decodes from the source file.
    pub fn uncached() -> Self {
        Self {
            cache: None,
            max_cache_mb: 0,
        }
    }

    /// A loader that keeps scaled results in `cache`, trimmed to `max_cache_mb`.
    pub fn with_cache(cache: ImageCache, max_cache_mb: u64) -> Self {
        Self {
            cache: Some(cache),
            max_cache_mb,
        }
    }

    fn decode(path: &Path) -> Result<DynamicImage, image::ImageError> {
        image::io::Reader::open(path)?
            .with_guessed_format()?
            .decode()
    }

    fn from_cache(&self, key: &str) -> Option<ImageHandle> {
        let cached = self.cache.as_ref()?.get(key)?;
        match image::open(&cached) {
            Ok(img) => {
                log::debug!("Cache hit: {}", cached.display());
                Some(ImageHandle::from_rgb(img.to_rgb8()))
            }
            Err(e) => {
                log::debug!("Ignoring unreadable cache entry {}: {}", cached.display(), e);
                None
            }
        }
    }
}

impl ImageLoader for DiskLoader {
    fn load(&self, ctx: &TerminalContext, placement: &Placement, path: &Path) -> Option<ImageHandle> {
        if placement.is_empty() {
            log::warn!("No room to draw {} on a {}x{} terminal", path.display(), ctx.cols, ctx.rows);
            return None;
        }

        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            Ok(_) => {
                log::warn!("Not a regular file: {}", path.display());
                return None;
            }
            Err(e) => {
                log::warn!("Unable to read {}: {}", path.display(), e);
                return None;
            }
        };

        let (box_width, box_height) = (placement.pixel_width(), placement.pixel_height());
        let key = match (&self.cache, metadata.modified()) {
            (Some(_), Ok(modified)) => {
                let source = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
                Some(ImageCache::key(&source, modified, box_width, box_height))
            }
            _ => None,
        };

        if let Some(handle) = key.as_deref().and_then(|k| self.from_cache(k)) {
            return Some(handle);
        }

        let img = match Self::decode(path) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Unable to decode {}: {}", path.display(), e);
                return None;
            }
        };

        let (width, height) = fit_within(img.width(), img.height(), box_width, box_height);
        if width == 0 || height == 0 {
            log::warn!("Image {} has no pixels", path.display());
            return None;
        }
        let rgb = if (width, height) == (img.width(), img.height()) {
            img.to_rgb8()
        } else {
            img.resize_exact(width, height, FilterType::Triangle).to_rgb8()
        };

        if let (Some(cache), Some(key)) = (&self.cache, key) {
            if let Err(e) = cache.store_with_cleanup(&key, &rgb, self.max_cache_mb) {
                log::warn!("Failed to cache {}: {}", path.display(), e);
            }
        }

        Some(ImageHandle::from_rgb(rgb))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, height, image::Rgb([10, 200, 30]))
            .save(&path)
            .unwrap();
        path
    }

    fn setup() -> (TerminalContext, Placement) {
        let ctx = TerminalContext::with_size(80, 24, 800, 480);
        let placement = geometry::compute(&ctx, 0, 0, 10, 5);
        (ctx, placement)
    }

    #[test]
    fn test_handle_pixel_bounds() {
        let handle = ImageHandle::solid(2, 2, [1, 2, 3]);
        assert_eq!(handle.pixel(1, 1), [1, 2, 3]);
        assert_eq!(handle.pixel(2, 0), [0, 0, 0]);
    }

    #[test]
    fn test_load_small_image_unscaled() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "small.png", 20, 10);
        let (ctx, placement) = setup();

        let handle = DiskLoader::uncached().load(&ctx, &placement, &path).unwrap();
        assert_eq!((handle.width(), handle.height()), (20, 10));
        assert_eq!(handle.pixel(0, 0), [10, 200, 30]);
    }

    #[test]
    fn test_load_scales_to_placement() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "big.png", 1000, 500);
        let (ctx, placement) = setup();
        // placement box is 10x5 cells of 10x20 px = 100x100 px

        let handle = DiskLoader::uncached().load(&ctx, &placement, &path).unwrap();
        assert_eq!((handle.width(), handle.height()), (100, 50));
    }

    #[test]
    fn test_load_guesses_format_without_extension() {
        let dir = TempDir::new().unwrap();
        let png = write_png(dir.path(), "real.png", 4, 4);
        let renamed = dir.path().join("no_extension");
        std::fs::rename(&png, &renamed).unwrap();
        let (ctx, placement) = setup();

        assert!(DiskLoader::uncached().load(&ctx, &placement, &renamed).is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let (ctx, placement) = setup();
        let loader = DiskLoader::uncached();
        assert!(loader
            .load(&ctx, &placement, Path::new("/definitely/not/here.png"))
            .is_none());
    }

    #[test]
    fn test_load_garbage_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"this is not a png").unwrap();
        let (ctx, placement) = setup();

        assert!(DiskLoader::uncached().load(&ctx, &placement, &path).is_none());
    }

    #[test]
    fn test_load_directory_is_rejected() {
        let dir = TempDir::new().unwrap();
        let (ctx, placement) = setup();
        assert!(DiskLoader::uncached().load(&ctx, &placement, dir.path()).is_none());
    }

    #[test]
    fn test_load_populates_and_uses_cache() {
        let dir = TempDir::new().unwrap();
        let path = write_png(dir.path(), "big.png", 1000, 500);
        let cache = ImageCache::new(dir.path().join("cache"));
        let loader = DiskLoader::with_cache(cache.clone(), 16);
        let (ctx, placement) = setup();

        let first = loader.load(&ctx, &placement, &path).unwrap();
        assert_eq!(cache.list_entries().unwrap().len(), 1);

        let second = loader.load(&ctx, &placement, &path).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.list_entries().unwrap().len(), 1);
    }
}
