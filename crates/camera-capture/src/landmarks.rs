//! Facial landmark types

use serde::{Deserialize, Serialize};

use crate::CaptureError;

/// Minimum landmark count of a face mesh (478 with iris refinement)
pub const MIN_LANDMARKS: usize = 468;

/// 2D point, normalized [0,1] or pixel space depending on context
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance
    pub fn distance(&self, other: &Point2) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn scale(&self, sx: f64, sy: f64) -> Point2 {
        Point2::new(self.x * sx, self.y * sy)
    }
}

/// Landmark set of one detected face.
///
/// Construction guarantees at least `MIN_LANDMARKS` points, so every fixed
/// mesh index below 468 is addressable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point2>", into = "Vec<Point2>")]
pub struct FaceLandmarks {
    points: Vec<Point2>,
}

impl FaceLandmarks {
    pub fn new(points: Vec<Point2>) -> Result<Self, CaptureError> {
        if points.len() < MIN_LANDMARKS {
            return Err(CaptureError::TooFewLandmarks {
                expected: MIN_LANDMARKS,
                actual: points.len(),
            });
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Normalized point by mesh index
    pub fn get(&self, index: usize) -> Option<Point2> {
        self.points.get(index).copied()
    }

    /// Point by mesh index denormalized to pixel space
    pub fn pixel(&self, index: usize, width: u32, height: u32) -> Option<Point2> {
        self.get(index)
            .map(|p| p.scale(width as f64, height as f64))
    }

    pub fn points(&self) -> &[Point2] {
        &self.points
    }
}

impl TryFrom<Vec<Point2>> for FaceLandmarks {
    type Error = CaptureError;

    fn try_from(points: Vec<Point2>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<FaceLandmarks> for Vec<Point2> {
    fn from(face: FaceLandmarks) -> Self {
        face.points
    }
}

/// Everything the landmark detector reports for one camera frame
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture time (seconds since epoch)
    pub timestamp: f64,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// The single tracked face, if any
    pub face: Option<FaceLandmarks>,
}

impl LandmarkFrame {
    pub fn with_face(timestamp: f64, width: u32, height: u32, face: FaceLandmarks) -> Self {
        Self {
            timestamp,
            width,
            height,
            face: Some(face),
        }
    }

    pub fn no_face(timestamp: f64, width: u32, height: u32) -> Self {
        Self {
            timestamp,
            width,
            height,
            face: None,
        }
    }

    pub fn has_face(&self) -> bool {
        self.face.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn mesh(n: usize) -> Vec<Point2> {
        (0..n).map(|i| Point2::new(i as f64 / n as f64, 0.5)).collect()
    }

    #[test]
    fn test_rejects_short_mesh() {
        let err = FaceLandmarks::new(mesh(100)).unwrap_err();
        assert!(matches!(
            err,
            CaptureError::TooFewLandmarks { expected: 468, actual: 100 }
        ));
    }

    #[test]
    fn test_pixel_denormalizes() {
        let face = FaceLandmarks::new(mesh(478)).unwrap();
        let p = face.pixel(239, 640, 480).unwrap();
        assert!((p.x - 239.0 / 478.0 * 640.0).abs() < 1e-9);
        assert!((p.y - 240.0).abs() < 1e-9);
        assert!(face.pixel(478, 640, 480).is_none());
    }

    #[test]
    fn test_deserialize_validates_length() {
        let short = serde_json::to_string(&mesh(10)).unwrap();
        assert!(serde_json::from_str::<FaceLandmarks>(&short).is_err());

        let full = serde_json::to_string(&mesh(468)).unwrap();
        let face: FaceLandmarks = serde_json::from_str(&full).unwrap();
        assert_eq!(face.len(), 468);
    }

    #[test]
    fn test_point_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(a.distance(&b), 5.0);
    }

    proptest! {
        #[test]
        fn normalized_points_land_inside_frame(
            coords in prop::collection::vec((0.0f64..=1.0, 0.0f64..=1.0), 468..480),
            width in 1u32..2000,
            height in 1u32..2000,
        ) {
            let points = coords.iter().map(|&(x, y)| Point2::new(x, y)).collect();
            let face = FaceLandmarks::new(points).unwrap();
            for i in 0..face.len() {
                let p = face.pixel(i, width, height).unwrap();
                prop_assert!(p.x >= 0.0 && p.x <= width as f64);
                prop_assert!(p.y >= 0.0 && p.y <= height as f64);
            }
        }

        #[test]
        fn mesh_length_decides_deserialization(n in 400usize..520) {
            let json = serde_json::to_string(&mesh(n)).unwrap();
            let parsed = serde_json::from_str::<FaceLandmarks>(&json);
            prop_assert_eq!(parsed.is_ok(), n >= MIN_LANDMARKS);
            if let Ok(face) = parsed {
                let expected = mesh(n);
                prop_assert_eq!(face.points(), expected.as_slice());
            }
        }
    }
}
