//! Run configuration.
//!
//! One immutable configuration structure is built per run and passed
//! explicitly to every pipeline stage; there are no global constants.

use crate::geometry::DetectorGeometry;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Extents and resolutions of the imaging planes and the survey volume.
///
/// All lengths are in centimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImagingConfig {
    /// Depth of the scanned surface above the detector.
    pub top_depth: f64,
    /// Physical extent of one 2D image layer (x, y).
    pub layer_extent: [f64; 2],
    /// Depth offset from the detector top to the first volume layer.
    pub object_z: f64,
    /// Physical extent of the 3D survey volume (x, y, z). Wider than the
    /// per-layer extent; the two scales are distinct on purpose.
    pub volume_extent: [f64; 3],
    /// Grid resolution (x, y, depth layers).
    pub resolution: [usize; 3],
    /// Depth layer used for 2D accumulation and clustering.
    pub cluster_layer: usize,
}

impl Default for ImagingConfig {
    fn default() -> Self {
        Self {
            top_depth: 2000.0,
            layer_extent: [2000.0, 2000.0],
            object_z: 0.0,
            volume_extent: [3000.0, 3000.0, 2000.0],
            resolution: [143, 143, 30],
            cluster_layer: 29,
        }
    }
}

impl ImagingConfig {
    /// Creates the default survey imaging configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the surface depth and matching volume z-extent.
    #[must_use]
    pub fn with_top_depth(mut self, depth: f64) -> Self {
        self.top_depth = depth;
        self.volume_extent[2] = depth - self.object_z;
        self
    }

    /// Sets the grid resolution; the cluster layer follows the deepest layer.
    #[must_use]
    pub fn with_resolution(mut self, resolution: [usize; 3]) -> Self {
        self.resolution = resolution;
        self.cluster_layer = resolution[2].saturating_sub(1);
        self
    }

    /// Depth of an image layer above the detector top.
    pub fn layer_depth(&self, layer: usize) -> f64 {
        layer as f64 * self.top_depth / self.resolution[2] as f64
    }

    /// Depth of a volume layer above the detector top.
    pub fn volume_layer_depth(&self, layer: usize) -> f64 {
        self.object_z + layer as f64 * self.volume_extent[2] / self.resolution[2] as f64
    }
}

/// Seed-search gating mode.
///
/// Downstream noise rejection discards small regions either way, so the two
/// modes usually agree on which objects survive; `Ungated` spends more work
/// growing regions that are then rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SeedGating {
    /// Every division cell yields a seed, unless the whole grid is zero, in
    /// which case there are no seeds at all.
    #[default]
    Ungated,
    /// Gate each cell on `cell_max > threshold`.
    FractionOfMax,
}

/// Hard safety caps on one region-growth call.
///
/// These bound the clustering wavefront on degenerate grids (for example a
/// uniformly nonzero grid) and guarantee termination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GrowthLimits {
    /// Maximum pixels admitted into one wavefront layer.
    pub max_frontier: usize,
    /// Maximum source pixels scanned in one wavefront layer.
    pub max_scanned: usize,
}

impl Default for GrowthLimits {
    fn default() -> Self {
        Self {
            max_frontier: 1000,
            max_scanned: 1000,
        }
    }
}

/// Clustering thresholds and growth bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ClusterConfig {
    /// Division-cell counts (x, y) for local-maximum seed search.
    pub divisions: [usize; 2],
    /// Seed cutoff as a fraction of the grid maximum.
    pub local_cutoff: f64,
    /// Growth threshold as a fraction of the grid maximum.
    pub percent_cutoff: f64,
    /// Overlap fraction for cross-view confidence scoring.
    pub overlap_cutoff: f64,
    /// Seed cutoff fraction for per-layer isolation of 3D composites.
    pub local_cutoff_3d: f64,
    /// Growth threshold fraction for per-layer isolation of 3D composites.
    pub percent_cutoff_3d: f64,
    /// Minimum nonzero claimed pixels for a region to count.
    pub min_region_pixels: usize,
    /// Seed gating mode.
    pub gating: SeedGating,
    /// Safety caps for region growth.
    pub limits: GrowthLimits,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            divisions: [16, 16],
            local_cutoff: 0.3,
            percent_cutoff: 0.05,
            overlap_cutoff: 0.4,
            local_cutoff_3d: 0.6,
            percent_cutoff_3d: 0.35,
            min_region_pixels: 5,
            gating: SeedGating::default(),
            limits: GrowthLimits::default(),
        }
    }
}

impl ClusterConfig {
    /// Creates the default clustering configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the division-cell counts.
    #[must_use]
    pub fn with_divisions(mut self, divisions: [usize; 2]) -> Self {
        self.divisions = divisions;
        self
    }

    /// Sets the growth-threshold fraction.
    #[must_use]
    pub fn with_percent_cutoff(mut self, cutoff: f64) -> Self {
        self.percent_cutoff = cutoff;
        self
    }

    /// Sets the seed gating mode.
    #[must_use]
    pub fn with_gating(mut self, gating: SeedGating) -> Self {
        self.gating = gating;
        self
    }
}

/// What to do when an event fails geometry reconstruction during an
/// accumulation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum InvalidEventPolicy {
    /// Discard the whole grid and report the offending event.
    #[default]
    Abort,
    /// Drop the offending event and keep accumulating.
    Skip,
}

/// Complete configuration for one reconstruction run.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ReconstructionConfig {
    /// Detector geometry constants.
    pub geometry: DetectorGeometry,
    /// Imaging extents and resolutions.
    pub imaging: ImagingConfig,
    /// Clustering thresholds.
    pub clustering: ClusterConfig,
    /// Invalid-event handling during accumulation.
    pub invalid_event_policy: InvalidEventPolicy,
}

impl ReconstructionConfig {
    /// Creates the default run configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the invalid-event policy.
    #[must_use]
    pub fn with_invalid_event_policy(mut self, policy: InvalidEventPolicy) -> Self {
        self.invalid_event_policy = policy;
        self
    }
}
