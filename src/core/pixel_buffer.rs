//! # Pixel Buffer
//!
//! The shared data unit of the engine: a tightly packed, row-major,
//! channel-interleaved 8-bit image with 3 (RGB) or 4 (RGBA) channels.
//!
//! The length invariant `data.len() == width * height * channels` is checked
//! once at construction, so every compute operation can index the buffer
//! without re-validating it. Zero-sized images are rejected for the same reason.

use std::borrow::Cow;

use crate::error::{EngineError, EngineResult};

/// An 8-bit RGB or RGBA image owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Wrap raw interleaved bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidInput`] if `channels` is not 3 or 4, a
    /// dimension is zero, or `data.len()` does not equal `width * height * channels`.
    pub fn new(width: u32, height: u32, channels: u8, data: Vec<u8>) -> EngineResult<Self> {
        if channels != 3 && channels != 4 {
            return Err(EngineError::invalid_input("channels", "must be 3 or 4", channels));
        }
        if width == 0 || height == 0 {
            return Err(EngineError::invalid_input(
                "dimensions",
                "width and height must be non-zero",
                format!("{}x{}", width, height),
            ));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(channels as usize))
            .ok_or_else(|| {
                EngineError::invalid_input("dimensions", "byte length overflows usize", format!("{}x{}", width, height))
            })?;
        if data.len() != expected {
            return Err(EngineError::invalid_input(
                "data",
                format!("length must equal {}x{}x{} = {}", width, height, channels, expected),
                data.len(),
            ));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Build an image where every pixel is `pixel` (3 or 4 bytes).
    pub fn filled(width: u32, height: u32, pixel: &[u8]) -> EngineResult<Self> {
        let channels = u8::try_from(pixel.len())
            .map_err(|_| EngineError::invalid_input("pixel", "must have 3 or 4 components", pixel.len()))?;
        let count = (width as usize) * (height as usize);
        Self::new(width, height, channels, pixel.repeat(count))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable access to the bytes; the length cannot change through a slice.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    pub fn pixel_count(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    pub fn has_alpha(&self) -> bool {
        self.channels == 4
    }

    /// Pixel at `(x, y)` as a channel slice, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<&[u8]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let c = self.channels as usize;
        let offset = ((y as usize) * (self.width as usize) + x as usize) * c;
        self.data.get(offset..offset + c)
    }

    /// RGB view of the image. Borrows when the buffer is already RGB.
    pub fn to_rgb(&self) -> Cow<'_, PixelBuffer> {
        if self.channels == 3 {
            return Cow::Borrowed(self);
        }
        let rgb: Vec<u8> = self
            .data
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect();
        Cow::Owned(Self {
            width: self.width,
            height: self.height,
            channels: 3,
            data: rgb,
        })
    }

    /// Copy of the alpha plane, or `None` for RGB images.
    pub fn alpha_plane(&self) -> Option<Vec<u8>> {
        if !self.has_alpha() {
            return None;
        }
        Some(self.data.chunks_exact(4).map(|px| px[3]).collect())
    }

    /// Overwrite the alpha plane. `alpha` must hold one byte per pixel.
    pub(crate) fn write_alpha_plane(&mut self, alpha: &[u8]) {
        debug_assert_eq!(alpha.len(), self.pixel_count());
        for (px, &a) in self.data.chunks_exact_mut(4).zip(alpha) {
            px[3] = a;
        }
    }

    pub(crate) fn plan_size(&self) -> tex_scale::presets::Size {
        tex_scale::presets::Size {
            w: self.width,
            h: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, 4, vec![0; 15]).unwrap_err();
        assert_eq!(err.category(), "invalid_input");
    }

    #[test]
    fn rejects_bad_channels_and_zero_size() {
        assert!(PixelBuffer::new(2, 2, 2, vec![0; 8]).is_err());
        assert!(PixelBuffer::new(0, 2, 3, vec![]).is_err());
    }

    #[test]
    fn strips_alpha_without_touching_source() {
        let rgba = PixelBuffer::new(2, 1, 4, vec![1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let rgb = rgba.to_rgb();
        assert_eq!(rgb.channels(), 3);
        assert_eq!(rgb.data(), &[1, 2, 3, 5, 6, 7]);
        assert_eq!(rgba.data().len(), 8);
    }

    #[test]
    fn rgb_view_is_borrowed() {
        let rgb = PixelBuffer::filled(3, 3, &[9, 9, 9]).unwrap();
        assert!(matches!(rgb.to_rgb(), Cow::Borrowed(_)));
        assert!(rgb.alpha_plane().is_none());
    }

    #[test]
    fn alpha_plane_round_trips() {
        let mut img = PixelBuffer::filled(2, 2, &[0, 0, 0, 7]).unwrap();
        assert_eq!(img.alpha_plane().unwrap(), vec![7; 4]);
        img.write_alpha_plane(&[1, 2, 3, 4]);
        assert_eq!(img.alpha_plane().unwrap(), vec![1, 2, 3, 4]);
        assert_eq!(img.pixel(1, 1), Some(&[0, 0, 0, 4][..]));
    }

    #[test]
    fn pixel_outside_image_is_none() {
        let img = PixelBuffer::filled(2, 2, &[1, 2, 3]).unwrap();
        assert_eq!(img.pixel(1, 0), Some(&[1, 2, 3][..]));
        assert_eq!(img.pixel(5, 5), None);
        assert_eq!(img.pixel(2, 0), None);
        assert_eq!(img.pixel(0, 2), None);
    }
}
