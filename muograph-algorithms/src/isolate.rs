//! Object isolation from group composites.
//!
//! Re-clusters every depth layer of a group composite against thresholds
//! anchored to the composite's global maximum, keeping only values inside
//! claimed regions. The result is the survey's isolated-object volume.

use muograph_core::{ClusterConfig, ScaledVolume};

use crate::cluster::{cluster_grid, ClusterParams};
use crate::grouping::ObjectGroup;

/// Per-group masked composites and their sum.
#[derive(Debug, Clone)]
pub struct IsolatedObjects {
    /// One masked composite per group.
    pub per_group: Vec<ScaledVolume>,
    /// Sum of the masked composites over all groups.
    pub combined: ScaledVolume,
}

/// Masks every group composite down to its clustered regions, layer by
/// layer, and sums the results. Returns `None` when there are no groups.
pub fn isolate_objects(groups: &[ObjectGroup], config: &ClusterConfig) -> Option<IsolatedObjects> {
    let first = groups.first()?;
    let shape = first.composite.shape();
    let extent = first.composite.extent();

    let mut combined = ScaledVolume::zeros(shape, extent);
    let per_group: Vec<ScaledVolume> = groups
        .iter()
        .map(|group| {
            let params = ClusterParams::for_composite_layer(group.composite.max(), config);
            let mut masked = ScaledVolume::zeros(shape, extent);
            for layer in 0..shape[2] {
                let image = group.composite.layer(layer);
                let set = cluster_grid(image, &params);
                for &(r, c) in &set.claimed {
                    masked.data_mut()[[r, c, layer]] += image[(r, c)];
                }
            }
            combined
                .data_mut()
                .zip_mut_with(masked.data(), |acc, &v| *acc += v);
            masked
        })
        .collect();

    Some(IsolatedObjects {
        per_group,
        combined,
    })
}
