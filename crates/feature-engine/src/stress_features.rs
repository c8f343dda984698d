//! Facial Stress Feature Vector

use camera_capture::{FaceLandmarks, Point2};
use serde::{Deserialize, Serialize};

use crate::ear::{eye_aspect_ratio, LEFT_EYE, RIGHT_EYE};
use crate::FeatureError;

/// Number of features in the vector
pub const STRESS_FEATURE_DIM: usize = 7;

// Mesh indices
const LEFT_BROW: usize = 105;
const LEFT_EYE_TOP: usize = 159;
const RIGHT_BROW: usize = 334;
const RIGHT_EYE_TOP: usize = 386;
const LEFT_INNER_BROW: usize = 107;
const RIGHT_INNER_BROW: usize = 336;
const UPPER_LIP: usize = 13;
const LOWER_LIP: usize = 14;
const MOUTH_LEFT: usize = 61;
const MOUTH_RIGHT: usize = 291;
const JAW_LEFT: usize = 172;
const JAW_RIGHT: usize = 397;

/// Stress features, distances in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StressFeatures {
    pub left_brow_eye: f64,
    pub right_brow_eye: f64,
    pub brow_gap: f64,
    /// Mouth height / mouth width
    pub mouth_ratio: f64,
    pub jaw_width: f64,
    pub left_ear: f64,
    pub right_ear: f64,
}

impl StressFeatures {
    /// Ordered as [brow_l, brow_r, brow_gap, mouth_ratio, jaw_width, ear_l, ear_r]
    pub fn to_array(&self) -> [f64; STRESS_FEATURE_DIM] {
        [
            self.left_brow_eye,
            self.right_brow_eye,
            self.brow_gap,
            self.mouth_ratio,
            self.jaw_width,
            self.left_ear,
            self.right_ear,
        ]
    }

    pub fn from_array(values: [f64; STRESS_FEATURE_DIM]) -> Self {
        Self {
            left_brow_eye: values[0],
            right_brow_eye: values[1],
            brow_gap: values[2],
            mouth_ratio: values[3],
            jaw_width: values[4],
            left_ear: values[5],
            right_ear: values[6],
        }
    }
}

/// Extracts `StressFeatures` from one face mesh
#[derive(Debug, Clone, Default)]
pub struct StressFeatureExtractor;

impl StressFeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(
        &self,
        face: &FaceLandmarks,
        width: u32,
        height: u32,
    ) -> Result<StressFeatures, FeatureError> {
        let px = |index: usize| -> Result<Point2, FeatureError> {
            face.pixel(index, width, height)
                .ok_or(FeatureError::MissingLandmark(index))
        };

        let mouth_height = px(UPPER_LIP)?.distance(&px(LOWER_LIP)?);
        let mouth_width = px(MOUTH_LEFT)?.distance(&px(MOUTH_RIGHT)?);

        let mut left_eye = [Point2::default(); 6];
        for (slot, &index) in left_eye.iter_mut().zip(&LEFT_EYE) {
            *slot = px(index)?;
        }
        let mut right_eye = [Point2::default(); 6];
        for (slot, &index) in right_eye.iter_mut().zip(&RIGHT_EYE) {
            *slot = px(index)?;
        }

        Ok(StressFeatures {
            left_brow_eye: px(LEFT_BROW)?.distance(&px(LEFT_EYE_TOP)?),
            right_brow_eye: px(RIGHT_BROW)?.distance(&px(RIGHT_EYE_TOP)?),
            brow_gap: px(LEFT_INNER_BROW)?.distance(&px(RIGHT_INNER_BROW)?),
            mouth_ratio: mouth_height / (mouth_width + 1e-6),
            jaw_width: px(JAW_LEFT)?.distance(&px(JAW_RIGHT)?),
            left_ear: eye_aspect_ratio(&left_eye),
            right_ear: eye_aspect_ratio(&right_eye),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_with(overrides: &[(usize, f64, f64)]) -> FaceLandmarks {
        let mut points = vec![Point2::new(0.5, 0.5); 468];
        for &(i, x, y) in overrides {
            points[i] = Point2::new(x, y);
        }
        FaceLandmarks::new(points).unwrap()
    }

    #[test]
    fn test_distances_are_in_pixels() {
        let face = face_with(&[
            (LEFT_BROW, 0.30, 0.30),
            (LEFT_EYE_TOP, 0.30, 0.40),
            (RIGHT_BROW, 0.70, 0.30),
            (RIGHT_EYE_TOP, 0.70, 0.45),
            (LEFT_INNER_BROW, 0.45, 0.30),
            (RIGHT_INNER_BROW, 0.55, 0.30),
            (UPPER_LIP, 0.50, 0.70),
            (LOWER_LIP, 0.50, 0.72),
            (MOUTH_LEFT, 0.40, 0.71),
            (MOUTH_RIGHT, 0.60, 0.71),
            (JAW_LEFT, 0.20, 0.80),
            (JAW_RIGHT, 0.80, 0.80),
        ]);

        let f = StressFeatureExtractor::new().extract(&face, 400, 400).unwrap();
        assert!((f.left_brow_eye - 40.0).abs() < 1e-9);
        assert!((f.right_brow_eye - 60.0).abs() < 1e-9);
        assert!((f.brow_gap - 40.0).abs() < 1e-9);
        assert!((f.mouth_ratio - 0.1).abs() < 1e-6);
        assert!((f.jaw_width - 240.0).abs() < 1e-9);
    }

    #[test]
    fn test_array_order() {
        let f = StressFeatures::from_array([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        assert_eq!(f.mouth_ratio, 4.0);
        assert_eq!(f.right_ear, 7.0);
        assert_eq!(f.to_array(), [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }
}
