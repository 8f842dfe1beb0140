//! Common test utilities and helpers for the texture engine tests
//!
//! This module provides buffer builders, an in-memory image store and
//! assertions shared by the integration tests.
#![allow(dead_code)]

/// Route `log` output through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Test image builders
pub mod test_images {
    use texture_engine::PixelBuffer;

    /// Create a solid colour image (3 or 4 component pixel)
    pub fn solid(width: u32, height: u32, pixel: &[u8]) -> PixelBuffer {
        PixelBuffer::filled(width, height, pixel).expect("valid solid image")
    }

    /// RGBA image whose alpha runs 0..=255 along each row (wrapping)
    pub fn alpha_ramp(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 4) as usize);
        for _y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&[90, 140, 200, (x % 256) as u8]);
            }
        }
        PixelBuffer::new(width, height, 4, data).expect("valid ramp")
    }

    /// RGBA image with the given alpha plane and a constant colour
    pub fn with_alpha(width: u32, height: u32, alpha: &[u8]) -> PixelBuffer {
        let data = alpha.iter().flat_map(|&a| [10, 20, 30, a]).collect();
        PixelBuffer::new(width, height, 4, data).expect("valid alpha image")
    }

    /// Black/white checkerboard with square cells of `cell` pixels
    pub fn checkerboard(width: u32, height: u32, cell: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let v = if (x / cell + y / cell) % 2 == 0 { 0 } else { 255 };
                data.extend_from_slice(&[v, v, v]);
            }
        }
        PixelBuffer::new(width, height, 3, data).expect("valid checkerboard")
    }

    /// Horizontal red / vertical green gradient with constant blue
    pub fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut data = Vec::with_capacity((width * height * 3) as usize);
        for y in 0..height {
            for x in 0..width {
                let r = ((x as f32 / width as f32) * 255.0) as u8;
                let g = ((y as f32 / height as f32) * 255.0) as u8;
                data.extend_from_slice(&[r, g, 128]);
            }
        }
        PixelBuffer::new(width, height, 3, data).expect("valid gradient")
    }

    /// Deterministic pseudo-random pixels
    pub fn noise(width: u32, height: u32, channels: u8, seed: u32) -> PixelBuffer {
        let mut state = seed.max(1);
        let data = (0..width * height * channels as u32)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        PixelBuffer::new(width, height, channels, data).expect("valid noise")
    }
}

/// In-memory image store
pub mod mem_store {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};

    use texture_engine::store::ImageStore;
    use texture_engine::{EngineError, EngineResult, PixelBuffer};

    /// Clones share the same files, so a test can keep one handle and give
    /// the engine another.
    #[derive(Clone, Default)]
    pub struct MemStore {
        files: Arc<Mutex<HashMap<PathBuf, PixelBuffer>>>,
    }

    impl MemStore {
        pub fn insert(&self, path: impl Into<PathBuf>, image: PixelBuffer) {
            self.files.lock().unwrap().insert(path.into(), image);
        }

        pub fn get(&self, path: impl AsRef<Path>) -> Option<PixelBuffer> {
            self.files.lock().unwrap().get(path.as_ref()).cloned()
        }

        pub fn len(&self) -> usize {
            self.files.lock().unwrap().len()
        }
    }

    impl ImageStore for MemStore {
        fn load(&self, path: &Path) -> EngineResult<PixelBuffer> {
            self.get(path).ok_or_else(|| {
                EngineError::io(
                    "load",
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such image"),
                )
            })
        }

        fn save(&self, path: &Path, image: &PixelBuffer) -> EngineResult<()> {
            self.insert(path, image.clone());
            Ok(())
        }

        fn copy(&self, from: &Path, to: &Path) -> EngineResult<()> {
            let image = self.load(from)?;
            self.insert(to, image);
            Ok(())
        }
    }
}

/// Custom assertions for testing
pub mod assertions {
    use std::collections::BTreeSet;

    use texture_engine::PixelBuffer;

    /// Distinct alpha values of an RGBA image
    pub fn unique_alpha(image: &PixelBuffer) -> BTreeSet<u8> {
        image
            .alpha_plane()
            .expect("image has alpha")
            .into_iter()
            .collect()
    }

    /// Assert that an image has the expected geometry
    pub fn assert_geometry(image: &PixelBuffer, width: u32, height: u32, channels: u8) {
        assert_eq!(
            (image.width(), image.height(), image.channels()),
            (width, height, channels),
            "Image geometry mismatch"
        );
        assert_eq!(image.data().len(), (width * height * channels as u32) as usize);
    }

    /// Assert that RGB channels of two equally sized RGBA images match
    pub fn assert_colour_unchanged(left: &PixelBuffer, right: &PixelBuffer) {
        assert_eq!(left.data().len(), right.data().len());
        for (l, r) in left.data().chunks_exact(4).zip(right.data().chunks_exact(4)) {
            assert_eq!(&l[..3], &r[..3], "Colour channels changed");
        }
    }
}
