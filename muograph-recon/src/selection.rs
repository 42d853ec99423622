//! Trajectory selection against a claimed-pixel set.
//!
//! Re-walks a session's events with the exact binning used during map
//! accumulation and keeps the trajectories whose image-plane crossing lands
//! inside the clustered region.

use std::collections::HashSet;

use muograph_core::{
    bin_axis, DetectorGeometry, DetectorSession, ImagingConfig, ReconstructionConfig,
    TrajectoryPoints,
};

use crate::trajectory::TrajectoryReconstructor;

/// Selects the events behind a viewpoint's clustered image.
#[derive(Debug, Clone, Copy)]
pub struct TrajectorySelector<'a> {
    geometry: &'a DetectorGeometry,
    imaging: &'a ImagingConfig,
}

impl<'a> TrajectorySelector<'a> {
    /// Creates a selector against one run configuration.
    pub fn new(config: &'a ReconstructionConfig) -> Self {
        Self {
            geometry: &config.geometry,
            imaging: &config.imaging,
        }
    }

    /// Returns, in event order, the trajectory triples of all valid events
    /// whose image pixel is in `claimed`. Invalid-geometry events are
    /// skipped individually.
    pub fn select(
        &self,
        session: &DetectorSession,
        claimed: &HashSet<(usize, usize)>,
    ) -> Vec<TrajectoryPoints> {
        let reconstructor = TrajectoryReconstructor::new(self.geometry, self.imaging.top_depth);
        let image_depth = self.geometry.detector_top(session.plane_separation())
            + self.imaging.layer_depth(self.imaging.cluster_layer);
        let [nx, ny, _] = self.imaging.resolution;
        let [ex, ey] = self.imaging.layer_extent;

        let mut selected = Vec::new();
        for event in session.valid_events() {
            let Ok(points) = reconstructor.hitting_points(event, session, image_depth) else {
                continue;
            };
            let Some(i) = bin_axis(points.image.x, ex, nx) else {
                continue;
            };
            let Some(j) = bin_axis(points.image.y, ey, ny) else {
                continue;
            };
            if claimed.contains(&(i, j)) {
                selected.push(points);
            }
        }
        selected
    }
}
