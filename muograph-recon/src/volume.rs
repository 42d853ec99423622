//! Volume re-projection of selected trajectories.
//!
//! Fits the 3D line through each trajectory's upper-trigger and surface
//! crossings and counts its passage through every depth layer of the survey
//! volume. The volume uses the full survey extent, which is wider than the
//! per-layer extent used during accumulation.

use log::debug;
use muograph_core::{
    CountVolume, DetectorGeometry, DetectorSession, ImagingConfig, ReconstructionConfig,
    TrajectoryPoints,
};

/// A re-projected object volume and its projection statistics.
#[derive(Debug, Clone)]
pub struct VolumeProjection {
    /// Trajectory counts over the survey volume.
    pub volume: CountVolume,
    /// Trajectories dropped for degenerate geometry (zero separation along
    /// any axis between the trigger and surface crossings).
    pub degenerate_events: usize,
}

/// Projects selected trajectories into the survey volume.
#[derive(Debug, Clone, Copy)]
pub struct VolumeProjector<'a> {
    geometry: &'a DetectorGeometry,
    imaging: &'a ImagingConfig,
}

impl<'a> VolumeProjector<'a> {
    /// Creates a projector against one run configuration.
    pub fn new(config: &'a ReconstructionConfig) -> Self {
        Self {
            geometry: &config.geometry,
            imaging: &config.imaging,
        }
    }

    /// Counts every trajectory's crossing in each depth layer of the volume.
    pub fn project(
        &self,
        trajectories: &[TrajectoryPoints],
        session: &DetectorSession,
    ) -> VolumeProjection {
        let [nx, ny, nz] = self.imaging.resolution;
        let mut volume = CountVolume::zeros([nx, ny, nz], self.imaging.volume_extent);
        let detector_top = self.geometry.detector_top(session.plane_separation());
        let mut degenerate = 0_usize;

        for trajectory in trajectories {
            let upper = trajectory.surface;
            let lower = trajectory.upper_trigger;
            let dz = upper.z - lower.z;
            let dx = upper.x - lower.x;
            let dy = upper.y - lower.y;
            if dz == 0.0 || dx == 0.0 || dy == 0.0 {
                degenerate += 1;
                continue;
            }

            let slope_x = dz / dx;
            let intercept_x = upper.z - slope_x * upper.x;
            let slope_y = dz / dy;
            let intercept_y = upper.z - slope_y * upper.y;

            for layer in 0..nz {
                let z = detector_top + self.imaging.volume_layer_depth(layer);
                let x = (z - intercept_x) / slope_x;
                let y = (z - intercept_y) / slope_y;
                if let Some((i, j)) = volume.bin(x, y) {
                    volume.increment((i, j, layer));
                }
            }
        }

        if degenerate > 0 {
            debug!("volume projection dropped {degenerate} degenerate trajectories");
        }
        VolumeProjection {
            volume,
            degenerate_events: degenerate,
        }
    }
}
