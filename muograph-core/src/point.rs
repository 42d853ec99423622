//! Geometric points and reconstructed trajectories.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A point in global survey coordinates, in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point3 {
    /// East-west coordinate.
    pub x: f64,
    /// North-south coordinate.
    pub y: f64,
    /// Depth above the detector bottom.
    pub z: f64,
}

impl Point3 {
    /// Creates a new point.
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Where one reconstructed trajectory crosses the three reference planes.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrajectoryPoints {
    /// Crossing at the requested image depth.
    pub image: Point3,
    /// Crossing at the upper trigger plane.
    pub upper_trigger: Point3,
    /// Crossing at the surface.
    pub surface: Point3,
}

impl TrajectoryPoints {
    /// Creates a trajectory from its three crossings.
    pub fn new(image: Point3, upper_trigger: Point3, surface: Point3) -> Self {
        Self {
            image,
            upper_trigger,
            surface,
        }
    }
}
