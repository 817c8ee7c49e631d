//! Raw bitmap data ready for GPU upload.

use glaze_core::{Color, PhysicalSize};

use crate::error::CaptureError;

/// RGBA8 pixel buffer in device pixels
#[derive(Debug, Clone)]
pub struct Bitmap {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
}

impl Bitmap {
    /// Create a bitmap from raw RGBA pixels.
    pub fn from_rgba(pixels: Vec<u8>, width: u32, height: u32) -> Result<Self, CaptureError> {
        let expected_len = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected_len {
            return Err(CaptureError::Decode(format!(
                "invalid pixel data length: expected {}, got {}",
                expected_len,
                pixels.len()
            )));
        }
        Ok(Self {
            pixels,
            width,
            height,
        })
    }

    /// Decode a bitmap from encoded bytes (png/jpeg).
    pub fn from_bytes(data: &[u8]) -> Result<Self, CaptureError> {
        let img = image::load_from_memory(data)
            .map_err(|e| CaptureError::Decode(e.to_string()))?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(Self {
            pixels: rgba.into_raw(),
            width,
            height,
        })
    }

    /// Uniform fill, used by tests and as the degraded background when
    /// a host supplies a fallback color instead of a capture.
    pub fn solid(color: Color, width: u32, height: u32) -> Self {
        let px = color.to_rgba8();
        let mut pixels = Vec::with_capacity((width as usize) * (height as usize) * 4);
        for _ in 0..(width as usize) * (height as usize) {
            pixels.extend_from_slice(&px);
        }
        Self {
            pixels,
            width,
            height,
        }
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> PhysicalSize {
        PhysicalSize::new(self.width, self.height)
    }

    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rgba_validates_length() {
        let ok = Bitmap::from_rgba(vec![0; 16], 2, 2);
        assert!(ok.is_ok());

        let short = Bitmap::from_rgba(vec![0; 4], 2, 2);
        assert!(matches!(short, Err(CaptureError::Decode(_))));
    }

    #[test]
    fn solid_fill() {
        let bmp = Bitmap::solid(Color::rgb(1.0, 0.0, 0.0), 3, 2);
        assert_eq!(bmp.size(), PhysicalSize::new(3, 2));
        assert_eq!(bmp.byte_len(), 24);
        assert_eq!(&bmp.pixels()[..4], &[255, 0, 0, 255]);
    }
}
