//! Forehead region of interest

use camera_capture::{FaceLandmarks, VideoFrame};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

use crate::RppgError;

/// Face-oval polygon vertices, upper forehead first
pub const FOREHEAD_INDICES: [usize; 30] = [
    10, 338, 297, 332, 284, 251, 389, 356, 454, 323, 361, 288, 397, 365, 379, 378, 400, 377, 152,
    148, 176, 149, 150, 136, 172, 58, 132, 93, 234, 127,
];

/// Mean color inside the filled landmark polygon
#[derive(Debug, Clone)]
pub struct ForeheadRoi {
    indices: Vec<usize>,
}

impl Default for ForeheadRoi {
    fn default() -> Self {
        Self {
            indices: FOREHEAD_INDICES.to_vec(),
        }
    }
}

impl ForeheadRoi {
    pub fn new(indices: Vec<usize>) -> Self {
        Self { indices }
    }

    /// Polygon in integer pixel coordinates, closing vertex dropped
    pub fn polygon(&self, face: &FaceLandmarks, width: u32, height: u32) -> Vec<Point<i32>> {
        let mut points: Vec<Point<i32>> = self
            .indices
            .iter()
            .filter_map(|&i| face.pixel(i, width, height))
            .map(|p| Point::new(p.x as i32, p.y as i32))
            .collect();
        points.dedup();
        while points.len() > 1 && points.first() == points.last() {
            points.pop();
        }
        points
    }

    /// Mean RGB over the filled polygon
    pub fn mean_rgb(&self, frame: &VideoFrame, face: &FaceLandmarks) -> Result<[f64; 3], RppgError> {
        let polygon = self.polygon(face, frame.width, frame.height);
        if polygon.len() < 3 {
            return Err(RppgError::EmptyRoi);
        }

        let mut mask = GrayImage::new(frame.width, frame.height);
        draw_polygon_mut(&mut mask, &polygon, Luma([255u8]));

        let image = frame.to_rgb_image()?;
        let mut sum = [0.0f64; 3];
        let mut count = 0usize;
        for (x, y, pixel) in image.enumerate_pixels() {
            if mask.get_pixel(x, y).0[0] == 0 {
                continue;
            }
            for (acc, &channel) in sum.iter_mut().zip(pixel.0.iter()) {
                *acc += channel as f64;
            }
            count += 1;
        }

        if count == 0 {
            return Err(RppgError::EmptyRoi);
        }
        Ok(sum.map(|s| s / count as f64))
    }
}
