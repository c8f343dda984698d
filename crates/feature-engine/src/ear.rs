//! Eye Aspect Ratio

use camera_capture::{FaceLandmarks, LandmarkFrame, Point2};
use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Left eye mesh indices: p1 (outer corner), p2, p3 (upper lid), p4 (inner corner), p5, p6 (lower lid)
pub const LEFT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

/// Right eye mesh indices, same p1..p6 layout
pub const RIGHT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];

const EPSILON: f64 = 1e-6;

/// EAR = (|p2-p6| + |p3-p5|) / (2 |p1-p4| + eps)
pub fn eye_aspect_ratio(p: &[Point2; 6]) -> f64 {
    let vertical = p[1].distance(&p[5]) + p[2].distance(&p[4]);
    let horizontal = p[0].distance(&p[3]);
    vertical / (2.0 * horizontal + EPSILON)
}

/// Openness of both eyes for one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarReading {
    pub left: f64,
    pub right: f64,
}

impl EarReading {
    pub fn average(&self) -> f64 {
        (self.left + self.right) / 2.0
    }
}

/// Computes per-eye EAR from a face mesh in pixel space
#[derive(Debug, Clone)]
pub struct EarEstimator {
    left: [usize; 6],
    right: [usize; 6],
}

impl Default for EarEstimator {
    fn default() -> Self {
        Self {
            left: LEFT_EYE,
            right: RIGHT_EYE,
        }
    }
}

impl EarEstimator {
    pub fn new(left: [usize; 6], right: [usize; 6]) -> Self {
        Self { left, right }
    }

    /// `Ok(None)` when the frame has no face
    pub fn measure(&self, frame: &LandmarkFrame) -> Result<Option<EarReading>, FeatureError> {
        let Some(face) = frame.face.as_ref() else {
            return Ok(None);
        };
        Ok(Some(self.measure_face(face, frame.width, frame.height)?))
    }

    pub fn measure_face(
        &self,
        face: &FaceLandmarks,
        width: u32,
        height: u32,
    ) -> Result<EarReading, FeatureError> {
        let left = eye_points(face, &self.left, width, height)?;
        let right = eye_points(face, &self.right, width, height)?;
        Ok(EarReading {
            left: eye_aspect_ratio(&left),
            right: eye_aspect_ratio(&right),
        })
    }
}

fn eye_points(
    face: &FaceLandmarks,
    indices: &[usize; 6],
    width: u32,
    height: u32,
) -> Result<[Point2; 6], FeatureError> {
    let mut points = [Point2::default(); 6];
    for (slot, &index) in points.iter_mut().zip(indices) {
        *slot = face
            .pixel(index, width, height)
            .ok_or(FeatureError::MissingLandmark(index))?;
    }
    Ok(points)
}
