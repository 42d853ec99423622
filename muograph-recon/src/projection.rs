//! Projection accumulation.
//!
//! Bins every valid event's image-plane crossing into a count grid: one
//! fixed cluster layer for 2D maps, or all configured depth layers for a
//! full 3D volume.

use log::debug;
use muograph_core::{
    AccumulationError, CountMap, CountVolume, DetectorGeometry, DetectorSession, ImagingConfig,
    InvalidEventPolicy, ReconstructionConfig,
};

use crate::trajectory::TrajectoryReconstructor;

/// Accumulates hitting-point histograms for one session at a time.
///
/// The produced grids are frozen once returned; no later stage writes into
/// them.
#[derive(Debug, Clone, Copy)]
pub struct ProjectionAccumulator<'a> {
    geometry: &'a DetectorGeometry,
    imaging: &'a ImagingConfig,
    policy: InvalidEventPolicy,
}

impl<'a> ProjectionAccumulator<'a> {
    /// Creates an accumulator against one run configuration.
    pub fn new(config: &'a ReconstructionConfig) -> Self {
        Self {
            geometry: &config.geometry,
            imaging: &config.imaging,
            policy: config.invalid_event_policy,
        }
    }

    /// Accumulates the 2D count map at the configured cluster layer.
    ///
    /// Under [`InvalidEventPolicy::Abort`] the first invalid-geometry event
    /// discards the whole map; under [`InvalidEventPolicy::Skip`] invalid
    /// events are dropped individually.
    pub fn accumulate_map(
        &self,
        session: &DetectorSession,
    ) -> Result<CountMap, AccumulationError> {
        let reconstructor = TrajectoryReconstructor::new(self.geometry, self.imaging.top_depth);
        let image_depth = self.geometry.detector_top(session.plane_separation())
            + self.imaging.layer_depth(self.imaging.cluster_layer);

        let [nx, ny, _] = self.imaging.resolution;
        let mut map = CountMap::zeros([nx, ny], self.imaging.layer_extent);
        let mut skipped = 0_usize;

        for (index, event) in session.valid_events().iter().enumerate() {
            match reconstructor.hitting_points(event, session, image_depth) {
                Ok(points) => {
                    if let Some(cell) = map.bin(points.image.x, points.image.y) {
                        map.increment(cell);
                    }
                }
                Err(source) => match self.policy {
                    InvalidEventPolicy::Abort => {
                        return Err(AccumulationError::InvalidEvent {
                            event: index,
                            source,
                        });
                    }
                    InvalidEventPolicy::Skip => skipped += 1,
                },
            }
        }
        if skipped > 0 {
            debug!("map accumulation skipped {skipped} invalid events");
        }
        Ok(map)
    }

    /// Accumulates the full 3D count volume over all depth layers.
    ///
    /// Layers span the surface depth at the 2D layer extent; the wider
    /// volume extent belongs to trajectory re-projection, not to this pass.
    pub fn accumulate_volume(
        &self,
        session: &DetectorSession,
    ) -> Result<CountVolume, AccumulationError> {
        let reconstructor = TrajectoryReconstructor::new(self.geometry, self.imaging.top_depth);
        let detector_top = self.geometry.detector_top(session.plane_separation());

        let [nx, ny, nz] = self.imaging.resolution;
        let extent = [
            self.imaging.layer_extent[0],
            self.imaging.layer_extent[1],
            self.imaging.top_depth,
        ];
        let mut volume = CountVolume::zeros([nx, ny, nz], extent);
        let mut skipped = 0_usize;

        for (index, event) in session.valid_events().iter().enumerate() {
            for layer in 0..nz {
                let image_depth = detector_top + self.imaging.layer_depth(layer);
                match reconstructor.hitting_points(event, session, image_depth) {
                    Ok(points) => {
                        if let Some((i, j)) = volume.bin(points.image.x, points.image.y) {
                            volume.increment((i, j, layer));
                        }
                    }
                    Err(source) => match self.policy {
                        InvalidEventPolicy::Abort => {
                            return Err(AccumulationError::InvalidEvent {
                                event: index,
                                source,
                            });
                        }
                        InvalidEventPolicy::Skip => {
                            skipped += 1;
                            break;
                        }
                    },
                }
            }
        }
        if skipped > 0 {
            debug!("volume accumulation skipped {skipped} invalid events");
        }
        Ok(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use muograph_core::{BarHit, EventRecord};

    fn event(bars: [u16; 4]) -> EventRecord {
        bars.iter().map(|&b| BarHit::new(b, 2.0)).collect()
    }

    fn session_with(events: Vec<EventRecord>) -> DetectorSession {
        let mut padded = events;
        // Trailing truncated record, excluded from every walk.
        padded.push(EventRecord::default());
        DetectorSession::new(padded, [0.0, 0.0], 25.0)
    }

    #[test]
    fn test_accumulates_valid_events() {
        let config = ReconstructionConfig::default();
        let accumulator = ProjectionAccumulator::new(&config);
        let session = session_with(vec![event([107, 207, 303, 403]); 5]);
        let map = accumulator.accumulate_map(&session).unwrap();
        assert_eq!(map.data().sum(), 5);
        assert_eq!(map.max(), 5);
    }

    #[test]
    fn test_abort_policy_discards_grid() {
        let config = ReconstructionConfig::default();
        let accumulator = ProjectionAccumulator::new(&config);
        let session = session_with(vec![
            event([107, 207, 303, 403]),
            EventRecord::new(vec![BarHit::new(107, 2.0)]),
        ]);
        let err = accumulator.accumulate_map(&session).unwrap_err();
        assert!(matches!(err, AccumulationError::InvalidEvent { event: 1, .. }));
    }

    #[test]
    fn test_skip_policy_keeps_grid() {
        let config =
            ReconstructionConfig::new().with_invalid_event_policy(InvalidEventPolicy::Skip);
        let accumulator = ProjectionAccumulator::new(&config);
        let session = session_with(vec![
            event([107, 207, 303, 403]),
            EventRecord::new(vec![BarHit::new(107, 2.0)]),
            event([107, 207, 303, 403]),
        ]);
        let map = accumulator.accumulate_map(&session).unwrap();
        assert_eq!(map.data().sum(), 2);
    }

    #[test]
    fn test_trailing_record_never_walked() {
        // The truncated trailing record is empty; under the abort policy a
        // walked empty event would discard the grid.
        let config = ReconstructionConfig::default();
        let accumulator = ProjectionAccumulator::new(&config);
        let session = session_with(vec![event([107, 207, 303, 403])]);
        assert!(accumulator.accumulate_map(&session).is_ok());
    }

    #[test]
    fn test_volume_counts_every_layer() {
        let config = ReconstructionConfig::default();
        let accumulator = ProjectionAccumulator::new(&config);
        let session = session_with(vec![event([107, 207, 303, 403])]);
        let volume = accumulator.accumulate_volume(&session).unwrap();
        // One event, binned at most once per depth layer.
        assert!(volume.data().sum() <= 30);
        assert!(volume.data().sum() > 0);
    }
}
