//! Per-event trajectory geometry.
//!
//! Converts one event's scintillator-bar readouts into the 3D points where
//! the muon crossed the image plane, the upper trigger, and the surface.
//! The wedge-shaped bars give sub-bar horizontal resolution: when two or
//! more bars respond, the path-length ratio between the strongest bar and
//! its larger neighbor locates the crossing along the wedge hypotenuse.

use muograph_core::{
    Axis, BarHit, DetectorGeometry, DetectorSession, EventRecord, GeometryError, Point3,
    TrajectoryPoints,
};

/// Muon crossing within one plane, relative to the first responding bar:
/// horizontal offset across the bar and height within the plane.
#[derive(Debug, Clone, Copy, PartialEq)]
struct LocalOffset {
    across: f64,
    up: f64,
}

/// Crossing position in the detector frame for one plane.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
struct PlanePosition {
    horizontal: f64,
    height: f64,
}

/// Height as a linear function of one horizontal coordinate, fitted through
/// the two trigger-plane crossings of that axis.
struct AxisFit {
    slope: f64,
    intercept: f64,
}

impl AxisFit {
    fn through(up: PlanePosition, down: PlanePosition, axis: Axis) -> Result<Self, GeometryError> {
        let run = up.horizontal - down.horizontal;
        if run == 0.0 {
            return Err(GeometryError::ZeroDisplacement { axis });
        }
        let slope = (up.height - down.height) / run;
        Ok(Self {
            slope,
            intercept: up.height - slope * up.horizontal,
        })
    }

    fn horizontal_at(&self, z: f64) -> f64 {
        (z - self.intercept) / self.slope
    }
}

/// Reconstructs event trajectories against a fixed detector geometry and
/// surface depth.
#[derive(Debug, Clone, Copy)]
pub struct TrajectoryReconstructor<'a> {
    geometry: &'a DetectorGeometry,
    surface_depth: f64,
}

impl<'a> TrajectoryReconstructor<'a> {
    /// Creates a reconstructor for the given geometry and surface depth.
    pub fn new(geometry: &'a DetectorGeometry, surface_depth: f64) -> Self {
        Self {
            geometry,
            surface_depth,
        }
    }

    /// Sorts an event's readouts into the four planes, preserving readout
    /// order within each plane.
    fn plane_hits(event: &EventRecord) -> Result<[Vec<BarHit>; 4], GeometryError> {
        let mut planes: [Vec<BarHit>; 4] = Default::default();
        for &hit in &event.hits {
            let plane = hit
                .plane()
                .ok_or(GeometryError::UnknownBar { bar: hit.bar })?;
            planes[plane].push(hit);
        }
        Ok(planes)
    }

    /// Local crossing offset within one plane. `hits` must be non-empty.
    fn local_offset(&self, hits: &[BarHit]) -> LocalOffset {
        let w = self.geometry.bar_width;
        let h = self.geometry.bar_height;
        let first_bar_even = hits[0].bar % 2 == 0;

        if hits.len() == 1 {
            // One bar: take the wedge tip, which faces down for even bars
            // and up for odd bars.
            return LocalOffset {
                across: 0.0,
                up: if first_bar_even { 0.0 } else { h },
            };
        }

        // Strongest bar (first occurrence on ties) and its larger neighbor;
        // bars at the readout boundary use the single available neighbor.
        let mut strongest = 0;
        for (i, hit) in hits.iter().enumerate() {
            if hit.path_length > hits[strongest].path_length {
                strongest = i;
            }
        }
        let (r0, r1) = if strongest == 0 {
            (hits[0].path_length, hits[1].path_length)
        } else if strongest == hits.len() - 1 {
            (
                hits[strongest].path_length,
                hits[strongest - 1].path_length,
            )
        } else {
            (
                hits[strongest].path_length,
                hits[strongest + 1]
                    .path_length
                    .max(hits[strongest - 1].path_length),
            )
        };

        let hypotenuse = self.geometry.wedge_hypotenuse();
        let alpha = self.geometry.wedge_angle();
        if first_bar_even {
            let reach = hypotenuse * r0 / (r0 + r1);
            LocalOffset {
                across: w / 2.0 - reach * alpha.cos(),
                up: h / 2.0 - reach * alpha.sin(),
            }
        } else {
            let reach = hypotenuse * r1 / (r0 + r1);
            LocalOffset {
                across: -w / 2.0 + reach * alpha.cos(),
                up: h / 2.0 - reach * alpha.sin(),
            }
        }
    }

    /// Detector-frame crossing position for one plane.
    fn plane_position(&self, plane: usize, hits: &[BarHit], separation: f64) -> PlanePosition {
        let local = self.local_offset(hits);
        let slot = i32::from(hits[0].bar) - 100 * (plane as i32 + 1);
        let steps = if slot % 2 == 0 { slot } else { slot + 1 };
        PlanePosition {
            horizontal: local.across - self.geometry.bar_row_offset()
                + self.geometry.bar_width / 2.0 * f64::from(steps),
            height: local.up + self.geometry.plane_base_z(plane, separation),
        }
    }

    /// The three crossings of one event's trajectory, offset to the
    /// session's viewpoint.
    ///
    /// Fails when any plane has no readout, a bar index maps outside the
    /// planes, or either horizontal axis shows zero displacement between the
    /// trigger planes; the whole event is invalid in every case.
    pub fn hitting_points(
        &self,
        event: &EventRecord,
        session: &DetectorSession,
        image_depth: f64,
    ) -> Result<TrajectoryPoints, GeometryError> {
        let separation = session.plane_separation();
        let planes = Self::plane_hits(event)?;

        let mut positions = [PlanePosition::default(); 4];
        for (plane, hits) in planes.iter().enumerate() {
            if hits.is_empty() {
                return Err(GeometryError::EmptyPlane { plane });
            }
            positions[plane] = self.plane_position(plane, hits, separation);
        }

        let x_fit = AxisFit::through(positions[0], positions[2], Axis::X)?;
        let y_fit = AxisFit::through(positions[1], positions[3], Axis::Y)?;

        let [offset_x, offset_y] = session.position();
        let upper_depth = self.geometry.detector_top(separation);
        let at = |z: f64| {
            Point3::new(
                x_fit.horizontal_at(z) + offset_x,
                y_fit.horizontal_at(z) + offset_y,
                z,
            )
        };
        Ok(TrajectoryPoints::new(
            at(image_depth),
            at(upper_depth),
            at(self.surface_depth),
        ))
    }
}
