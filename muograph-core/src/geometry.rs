//! Detector geometry constants.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fixed geometry of one muon detector: four planes of triangular
/// scintillator bars between two trigger planes.
///
/// All lengths are in centimeters. Planes 0 and 1 (x/y upper) sit above the
/// configurable plane separation; planes 2 and 3 (x/y lower) sit below it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DetectorGeometry {
    /// Width of one scintillator bar.
    pub bar_width: f64,
    /// Height of one scintillator bar.
    pub bar_height: f64,
    /// Number of bars per plane.
    pub num_bars: usize,
    /// Thickness of each trigger plane.
    pub trigger_width: f64,
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self {
            bar_width: 3.2,
            bar_height: 1.7,
            num_bars: 27,
            trigger_width: 1.0,
        }
    }
}

impl DetectorGeometry {
    /// Creates the default survey detector geometry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the bar width.
    #[must_use]
    pub fn with_bar_width(mut self, width: f64) -> Self {
        self.bar_width = width;
        self
    }

    /// Sets the bar height.
    #[must_use]
    pub fn with_bar_height(mut self, height: f64) -> Self {
        self.bar_height = height;
        self
    }

    /// Sets the number of bars per plane.
    #[must_use]
    pub fn with_num_bars(mut self, bars: usize) -> Self {
        self.num_bars = bars;
        self
    }

    /// Length of the wedge hypotenuse from bar tip to base corner.
    pub fn wedge_hypotenuse(&self) -> f64 {
        (self.bar_height * self.bar_height + (self.bar_width / 2.0) * (self.bar_width / 2.0))
            .sqrt()
    }

    /// Opening angle of the wedge, `atan(2h / w)`.
    pub fn wedge_angle(&self) -> f64 {
        (2.0 * self.bar_height / self.bar_width).atan()
    }

    /// Base height of a scintillator plane above the detector bottom.
    ///
    /// Planes are numbered 0..4 from the top; the plane separation lies
    /// between planes 1 and 2.
    pub fn plane_base_z(&self, plane: usize, separation: f64) -> f64 {
        let h = self.bar_height;
        let t = self.trigger_width;
        match plane {
            0 => t + separation + 3.5 * h,
            1 => t + separation + 2.5 * h,
            2 => t + 1.5 * h,
            _ => t + 0.5 * h,
        }
    }

    /// Horizontal offset of bar slot zero from the plane center.
    pub fn bar_row_offset(&self) -> f64 {
        (self.num_bars as f64 / 4.0 - 0.25) * self.bar_width
    }

    /// Height of the detector top (upper trigger surface) for a given plane
    /// separation.
    pub fn detector_top(&self, separation: f64) -> f64 {
        2.0 * self.trigger_width + 4.0 * self.bar_height + separation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wedge_constants() {
        let geom = DetectorGeometry::default();
        assert_relative_eq!(geom.wedge_hypotenuse(), (1.7f64 * 1.7 + 1.6 * 1.6).sqrt());
        assert_relative_eq!(geom.wedge_angle(), (3.4f64 / 3.2).atan());
    }

    #[test]
    fn test_plane_heights_descend() {
        let geom = DetectorGeometry::default();
        let z: Vec<f64> = (0..4).map(|p| geom.plane_base_z(p, 25.0)).collect();
        assert!(z[0] > z[1] && z[1] > z[2] && z[2] > z[3]);
        // Separation only lifts the two upper planes.
        assert_relative_eq!(z[1] - z[2], 25.0 + 1.7);
    }

    #[test]
    fn test_detector_top() {
        let geom = DetectorGeometry::default();
        assert_relative_eq!(geom.detector_top(25.0), 2.0 + 4.0 * 1.7 + 25.0);
    }
}
