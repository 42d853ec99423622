//! Survey reconstruction pipeline.
//!
//! Per viewpoint: accumulate signal and background maps, subtract, cluster,
//! re-select trajectories, project the object volume. Viewpoints share no
//! mutable state and run in parallel; cross-view grouping runs after the
//! join.

use log::{debug, info};
use muograph_algorithms::{
    cluster_grid, group_members, overlap_edges, scale_groups, scale_layers, ClusterParams,
    ClusterSet, ObjectGroup,
};
use muograph_core::{
    CountMap, CountVolume, DetectorSession, Error, ReconstructionConfig, Result, ScaledVolume,
    TrajectoryPoints,
};
use rayon::prelude::*;

use crate::projection::ProjectionAccumulator;
use crate::selection::TrajectorySelector;
use crate::volume::{VolumeProjection, VolumeProjector};

/// One detector position with its signal and background runs.
///
/// The difference is always signal minus background; which physical run
/// plays which role is the caller's choice.
#[derive(Debug, Clone)]
pub struct Viewpoint {
    /// Run whose excess over background carries the object signal.
    pub signal: DetectorSession,
    /// Reference run.
    pub background: DetectorSession,
}

impl Viewpoint {
    /// Pairs a signal session with its background session.
    pub fn new(signal: DetectorSession, background: DetectorSession) -> Self {
        Self { signal, background }
    }
}

/// Everything reconstructed from one viewpoint.
#[derive(Debug, Clone)]
pub struct ViewpointReconstruction {
    /// Zero-clipped signal-minus-background count map at the cluster layer.
    pub difference: CountMap,
    /// Clustered regions of the difference map.
    pub clusters: ClusterSet<u32>,
    /// Trajectories of the signal events inside the clustered regions.
    pub trajectories: Vec<TrajectoryPoints>,
    /// Object volume re-projected from the selected trajectories.
    pub projection: VolumeProjection,
}

/// The cross-view result for a whole survey.
#[derive(Debug, Clone)]
pub struct SurveyReconstruction {
    /// Per-viewpoint reconstructions, in input order.
    pub viewpoints: Vec<ViewpointReconstruction>,
    /// Ordered overlap edges between viewpoint volumes.
    pub edges: Vec<(usize, usize)>,
    /// Merged object groups with composites and confidence targets.
    pub groups: Vec<ObjectGroup>,
}

/// Reconstructs one viewpoint end to end.
pub fn reconstruct_viewpoint(
    viewpoint: &Viewpoint,
    config: &ReconstructionConfig,
) -> Result<ViewpointReconstruction> {
    let accumulator = ProjectionAccumulator::new(config);
    let signal = accumulator.accumulate_map(&viewpoint.signal)?;
    let background = accumulator.accumulate_map(&viewpoint.background)?;
    let difference = signal.difference(&background)?;

    let params = ClusterParams::for_map(f64::from(difference.max()), &config.clustering);
    let clusters = cluster_grid(difference.data().view(), &params);
    debug!(
        "clustered {} regions over {} pixels",
        clusters.regions.len(),
        clusters.claimed_pixels()
    );

    let trajectories = TrajectorySelector::new(config).select(&viewpoint.signal, &clusters.claimed);
    let projection = VolumeProjector::new(config).project(&trajectories, &viewpoint.signal);

    Ok(ViewpointReconstruction {
        difference,
        clusters,
        trajectories,
        projection,
    })
}

/// Reconstructs all viewpoints in parallel, then groups their volumes.
pub fn reconstruct_survey(
    viewpoints: &[Viewpoint],
    config: &ReconstructionConfig,
) -> Result<SurveyReconstruction> {
    for (index, viewpoint) in viewpoints.iter().enumerate() {
        if viewpoint.signal.position() != viewpoint.background.position()
            || viewpoint.signal.plane_separation() != viewpoint.background.plane_separation()
        {
            return Err(Error::ViewpointMismatch { viewpoint: index });
        }
    }

    info!("reconstructing {} viewpoints", viewpoints.len());
    let reconstructions: Vec<ViewpointReconstruction> = viewpoints
        .par_iter()
        .map(|viewpoint| reconstruct_viewpoint(viewpoint, config))
        .collect::<Result<_>>()?;

    let volumes: Vec<CountVolume> = reconstructions
        .iter()
        .map(|r| r.projection.volume.clone())
        .collect();
    let raw_maxima: Vec<f64> = volumes.iter().map(|v| f64::from(v.max())).collect();

    let scaled: Vec<ScaledVolume> = scale_layers(&volumes);
    let edges = overlap_edges(&scaled);
    let members = group_members(volumes.len(), &edges);
    info!("{} overlap edges, {} object groups", edges.len(), members.len());

    let groups = scale_groups(
        &scaled,
        &raw_maxima,
        &members,
        config.clustering.overlap_cutoff,
    );

    Ok(SurveyReconstruction {
        viewpoints: reconstructions,
        edges,
        groups,
    })
}
