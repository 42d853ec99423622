//! muograph-recon: The muon tomography reconstruction pipeline.
//!
//! Turns raw per-viewpoint detector sessions into located objects:
//! - **Trajectory reconstruction** - bar readouts to 3D crossing points
//! - **Projection accumulation** - trajectory histograms per image layer
//! - **Trajectory selection** - events behind a clustered region
//! - **Volume projection** - selected trajectories over the survey volume
//! - **Survey pipeline** - parallel per-viewpoint runs plus cross-view
//!   grouping
//!
#![warn(missing_docs)]

mod pipeline;
mod projection;
mod selection;
mod trajectory;
mod volume;

pub use pipeline::{
    reconstruct_survey, reconstruct_viewpoint, SurveyReconstruction, Viewpoint,
    ViewpointReconstruction,
};
pub use projection::ProjectionAccumulator;
pub use selection::TrajectorySelector;
pub use trajectory::TrajectoryReconstructor;
pub use volume::{VolumeProjection, VolumeProjector};

// Re-export the configuration surface so pipeline callers need one import.
pub use muograph_core::{
    DetectorGeometry, DetectorSession, ImagingConfig, InvalidEventPolicy, ReconstructionConfig,
};
