//! Video frame types

use image::RgbImage;

use crate::CaptureError;

/// Decoded RGB video frame
#[derive(Debug, Clone)]
pub struct VideoFrame {
    /// RGB pixel data (width * height * 3)
    pub data: Vec<u8>,
    /// Frame width
    pub width: u32,
    /// Frame height
    pub height: u32,
    /// Capture timestamp (seconds since epoch)
    pub timestamp: f64,
    /// Frame sequence number
    pub sequence: u64,
}

impl VideoFrame {
    /// Create a new video frame from raw RGB data
    pub fn new(
        data: Vec<u8>,
        width: u32,
        height: u32,
        timestamp: f64,
        sequence: u64,
    ) -> Result<Self, CaptureError> {
        if width == 0 || height == 0 || data.len() != (width as usize) * (height as usize) * 3 {
            return Err(CaptureError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
            timestamp,
            sequence,
        })
    }

    /// Uniformly colored frame, mostly useful for tests and synthetic input
    pub fn filled(width: u32, height: u32, rgb: [u8; 3], timestamp: f64) -> Self {
        let data = rgb
            .iter()
            .copied()
            .cycle()
            .take((width as usize) * (height as usize) * 3)
            .collect();
        Self {
            data,
            width,
            height,
            timestamp,
            sequence: 0,
        }
    }

    /// Get pixel at (x, y)
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 3) as usize;
        Some([self.data[idx], self.data[idx + 1], self.data[idx + 2]])
    }

    /// View as an `image` buffer for region operations
    pub fn to_rgb_image(&self) -> Result<RgbImage, CaptureError> {
        RgbImage::from_raw(self.width, self.height, self.data.clone()).ok_or(
            CaptureError::InvalidDimensions {
                width: self.width,
                height: self.height,
            },
        )
    }
}
