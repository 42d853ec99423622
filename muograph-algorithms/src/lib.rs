//! muograph-algorithms: Grid clustering and cross-view grouping.
//!
//! This crate provides the algorithmic stages of the reconstruction
//! pipeline that operate on frozen count grids:
//! - **Seed search** - per-division-cell local maxima
//! - **Region growth** - bounded synchronous-wavefront flood growth
//! - **Clustering** - first-claim-wins merge of grown regions
//! - **Grouping** - union-find overlap groups, scaling, confidence targets
//!
#![warn(missing_docs)]

mod cluster;
mod grouping;
mod isolate;
mod region;
mod seeds;

pub use cluster::{cluster_grid, ClusterParams, ClusterSet};
pub use grouping::{
    group_members, overlap_edges, scale_groups, scale_layers, scale_volume_layers, vote_mask,
    ObjectGroup, UnionFind,
};
pub use isolate::{isolate_objects, IsolatedObjects};
pub use region::{grow_region, ClusterRegion, HaltReason};
pub use seeds::{seed_search, Seed};

// Re-export the core clustering configuration types.
pub use muograph_core::{ClusterConfig, GrowthLimits, SeedGating};
