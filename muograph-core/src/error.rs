//! Error types for muograph-core.

use thiserror::Error;

/// Result type alias for muograph operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Horizontal axis label, used in geometry error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// East-west axis.
    X,
    /// North-south axis.
    Y,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
        }
    }
}

/// Per-event geometry reconstruction errors.
///
/// Any of these invalidates the whole event: downstream stages either skip
/// the event or abort the accumulation pass, depending on policy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A scintillator plane recorded no hits for this event.
    #[error("no readout in detector plane {plane}")]
    EmptyPlane { plane: usize },

    /// A bar index maps outside the four detector planes.
    #[error("bar index {bar} is outside the detector planes")]
    UnknownBar { bar: u16 },

    /// Both trigger-plane positions coincide on one horizontal axis, so the
    /// trajectory slope is undefined there.
    #[error("zero {axis}-displacement between trigger planes")]
    ZeroDisplacement { axis: Axis },
}

/// Count-grid errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// Elementwise operation on grids of different shapes.
    #[error("grid shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch { left: Vec<usize>, right: Vec<usize> },
}

/// Accumulation-pass errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AccumulationError {
    /// An event failed geometry reconstruction while the abort policy was in
    /// effect; the grid under accumulation is discarded.
    #[error("event {event} invalidated the accumulation pass")]
    InvalidEvent {
        event: usize,
        #[source]
        source: GeometryError,
    },
}

/// Top-level error for muograph operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Geometry reconstruction error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Grid error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Accumulation error.
    #[error(transparent)]
    Accumulation(#[from] AccumulationError),

    /// Signal and background sessions of one viewpoint disagree on position
    /// or plane separation.
    #[error("viewpoint {viewpoint}: signal and background sessions disagree on geometry")]
    ViewpointMismatch { viewpoint: usize },
}
