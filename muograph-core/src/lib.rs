//! muograph-core: Core types for muon tomography reconstruction.
//!
//! This crate provides the foundational data model for the reconstruction
//! pipeline: detector events and sessions, geometry constants, run
//! configuration, trajectory points, and count grids.
//!

pub mod config;
pub mod error;
pub mod event;
pub mod geometry;
pub mod grid;
pub mod point;

pub use config::{
    ClusterConfig, GrowthLimits, ImagingConfig, InvalidEventPolicy, ReconstructionConfig,
    SeedGating,
};
pub use error::{AccumulationError, Axis, Error, GeometryError, GridError, Result};
pub use event::{BarHit, DetectorSession, EventRecord};
pub use geometry::DetectorGeometry;
pub use grid::{bin_axis, CellValue, CountMap, CountVolume, ScaledVolume};
pub use point::{Point3, TrajectoryPoints};
