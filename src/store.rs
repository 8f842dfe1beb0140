//! # Image Store
//!
//! File access for batch correction goes through [`ImageStore`] so the batch
//! logic can be exercised without touching disk. [`FsImageStore`] is the real
//! implementation, decoding and encoding with the `image` crate; the format
//! follows the file extension.

use std::fs;
use std::path::{Path, PathBuf};

use image::{ColorType, DynamicImage, ImageError, RgbImage, RgbaImage};

use crate::core::PixelBuffer;
use crate::error::{EngineError, EngineResult};

/// File extensions (lowercase) that [`collect_images`] picks up.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "tga", "bmp", "tif", "tiff", "webp"];

pub trait ImageStore: Send + Sync {
    /// Decode an image. Plain RGB files load as RGB; every other colour type
    /// (RGBA, grayscale, grayscale + alpha) loads as RGBA, opaque where the
    /// file carries no alpha.
    fn load(&self, path: &Path) -> EngineResult<PixelBuffer>;

    /// Encode `image` to `path`, creating parent directories as needed.
    fn save(&self, path: &Path, image: &PixelBuffer) -> EngineResult<()>;

    /// Byte-for-byte copy, used for backups.
    fn copy(&self, from: &Path, to: &Path) -> EngineResult<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageStore;

impl FsImageStore {
    pub fn new() -> Self {
        Self
    }
}

fn map_image_error(operation: &str, path: &Path, error: ImageError) -> EngineError {
    match error {
        ImageError::IoError(source) => EngineError::io(operation, path, source),
        other => EngineError::codec(path, other),
    }
}

impl ImageStore for FsImageStore {
    fn load(&self, path: &Path) -> EngineResult<PixelBuffer> {
        let decoded = image::open(path).map_err(|e| map_image_error("load", path, e))?;
        let (width, height) = (decoded.width(), decoded.height());
        match decoded.color() {
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => {
                PixelBuffer::new(width, height, 3, decoded.into_rgb8().into_raw())
            }
            _ => PixelBuffer::new(width, height, 4, decoded.into_rgba8().into_raw()),
        }
    }

    fn save(&self, path: &Path, image: &PixelBuffer) -> EngineResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| EngineError::io("create directory", parent, e))?;
        }
        let (w, h) = (image.width(), image.height());
        let data = image.data().to_vec();
        let encodable = if image.has_alpha() {
            RgbaImage::from_raw(w, h, data).map(DynamicImage::ImageRgba8)
        } else {
            RgbImage::from_raw(w, h, data).map(DynamicImage::ImageRgb8)
        }
        .ok_or_else(|| EngineError::codec(path, "pixel data does not match dimensions"))?;
        encodable.save(path).map_err(|e| map_image_error("save", path, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> EngineResult<()> {
        fs::copy(from, to).map_err(|e| EngineError::io("copy", from, e))?;
        Ok(())
    }
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.iter().any(|s| s.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Supported image files under `dir`, sorted. Subdirectories are searched when `recursive`.
pub fn collect_images(dir: &Path, recursive: bool) -> EngineResult<Vec<PathBuf>> {
    let mut found = Vec::new();
    let mut pending = vec![dir.to_path_buf()];
    while let Some(current) = pending.pop() {
        let entries = fs::read_dir(&current).map_err(|e| EngineError::io("read directory", &current, e))?;
        for entry in entries {
            let entry = entry.map_err(|e| EngineError::io("read directory", &current, e))?;
            let path = entry.path();
            if path.is_dir() {
                if recursive {
                    pending.push(path);
                }
            } else if is_supported(&path) {
                found.push(path);
            }
        }
    }
    found.sort();
    Ok(found)
}
