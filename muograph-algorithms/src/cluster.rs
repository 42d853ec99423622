//! Seeded clustering of one count grid.
//!
//! Runs the seed search, grows a bounded region from every seed not already
//! inside a claimed region (first claim wins), rejects regions below the
//! noise floor, and merges the survivors by per-pixel maximum.

use std::collections::HashSet;

use muograph_core::{CellValue, ClusterConfig, GrowthLimits, SeedGating};
use ndarray::{Array2, ArrayView2};

use crate::region::{grow_region, ClusterRegion};
use crate::seeds::seed_search;

/// Resolved thresholds for one clustering call.
///
/// Fractional cutoffs in [`ClusterConfig`] are anchored to a grid maximum;
/// 2D maps anchor to their own maximum, composite layers anchor to the
/// composite's 3D maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClusterParams {
    /// Division-cell counts for seed search.
    pub divisions: [usize; 2],
    /// Seed gating mode.
    pub gating: SeedGating,
    /// Absolute seed cutoff (used by `FractionOfMax` gating).
    pub seed_threshold: f64,
    /// Absolute growth threshold.
    pub growth_threshold: f64,
    /// Minimum nonzero claimed pixels for a region to be kept.
    pub min_region_pixels: usize,
    /// Hard growth caps.
    pub limits: GrowthLimits,
}

impl ClusterParams {
    /// Parameters for clustering a 2D difference map with maximum `grid_max`.
    pub fn for_map(grid_max: f64, config: &ClusterConfig) -> Self {
        Self {
            divisions: config.divisions,
            gating: config.gating,
            seed_threshold: grid_max * config.local_cutoff,
            growth_threshold: grid_max * config.percent_cutoff,
            min_region_pixels: config.min_region_pixels,
            limits: config.limits,
        }
    }

    /// Parameters for isolating one layer of a group composite whose 3D
    /// maximum is `composite_max`.
    pub fn for_composite_layer(composite_max: f64, config: &ClusterConfig) -> Self {
        Self {
            divisions: config.divisions,
            gating: config.gating,
            seed_threshold: composite_max * config.local_cutoff_3d,
            growth_threshold: composite_max * config.percent_cutoff_3d,
            min_region_pixels: config.min_region_pixels,
            limits: config.limits,
        }
    }
}

/// All accepted cluster regions of one grid, with the shared claimed-pixel
/// set and the merged image.
#[derive(Debug, Clone)]
pub struct ClusterSet<T> {
    /// Accepted regions, in seed order.
    pub regions: Vec<ClusterRegion<T>>,
    /// Union of the accepted regions' pixels.
    pub claimed: HashSet<(usize, usize)>,
    /// Original values at claimed pixels, merged by per-pixel maximum.
    pub merged: Array2<T>,
}

impl<T: CellValue> ClusterSet<T> {
    /// Returns true if no region survived.
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of claimed pixels across all accepted regions.
    pub fn claimed_pixels(&self) -> usize {
        self.claimed.len()
    }
}

/// Clusters `grid`: seed search, first-claim-wins bounded growth, noise
/// rejection, per-pixel-maximum merge.
pub fn cluster_grid<T: CellValue>(grid: ArrayView2<'_, T>, params: &ClusterParams) -> ClusterSet<T> {
    let seeds = seed_search(grid, params.divisions, params.gating, params.seed_threshold);

    let mut claimed: HashSet<(usize, usize)> = HashSet::new();
    let mut regions = Vec::new();
    let mut merged = Array2::from_elem(grid.dim(), T::ZERO);

    for seed in seeds {
        if claimed.contains(&seed.index) {
            continue;
        }
        let region = grow_region(grid, seed.index, params.growth_threshold, &params.limits);
        if region.nonzero_pixels() > params.min_region_pixels {
            for (&pixel, &value) in region.pixels.iter().zip(&region.values) {
                claimed.insert(pixel);
                merged[pixel] = merged[pixel].max_value(value);
            }
            regions.push(region);
        }
    }

    ClusterSet {
        regions,
        claimed,
        merged,
    }
}
