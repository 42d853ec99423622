//! Count grids over physical extents.
//!
//! A count grid is a dense histogram of trajectory crossings. Grids are
//! zero-initialized, written by exactly one accumulation pass, and read-only
//! afterwards; clustering and grouping never write back into them.

use ndarray::{Array2, Array3, ArrayView2, ArrayViewMut2, Axis, Zip};

use crate::error::GridError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Scalar cell type for grids the clustering algorithms can run over.
///
/// Accumulated maps hold `u32` counts; scaled composites hold `f64`.
pub trait CellValue: Copy + PartialOrd {
    /// The additive zero of this cell type.
    const ZERO: Self;

    /// The cell value as `f64`, for threshold comparison.
    fn as_f64(self) -> f64;

    /// Returns true for an exactly-zero cell.
    fn is_zero(self) -> bool;

    /// The larger of two cell values.
    fn max_value(self, other: Self) -> Self;
}

impl CellValue for u32 {
    const ZERO: Self = 0;

    #[inline]
    fn as_f64(self) -> f64 {
        f64::from(self)
    }

    #[inline]
    fn is_zero(self) -> bool {
        self == 0
    }

    #[inline]
    fn max_value(self, other: Self) -> Self {
        self.max(other)
    }
}

impl CellValue for f64 {
    const ZERO: Self = 0.0;

    #[inline]
    fn as_f64(self) -> f64 {
        self
    }

    #[inline]
    fn is_zero(self) -> bool {
        self == 0.0
    }

    #[inline]
    fn max_value(self, other: Self) -> Self {
        self.max(other)
    }
}

/// Maps a physical coordinate to a grid index along one axis.
///
/// The extent is centered on the origin. Returns `None` when the coordinate
/// rounds to index zero or falls outside the grid: index zero doubles as the
/// out-of-range bin and is never counted.
pub fn bin_axis(coord: f64, extent: f64, cells: usize) -> Option<usize> {
    let index = ((coord + extent / 2.0) * (cells as f64 - 1.0) / extent).round();
    if index > 0.0 && index < cells as f64 {
        Some(index as usize)
    } else {
        None
    }
}

/// A 2D count grid over one image layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CountMap {
    data: Array2<u32>,
    extent: [f64; 2],
}

impl CountMap {
    /// Creates a zeroed map with the given shape and physical extent.
    pub fn zeros(shape: [usize; 2], extent: [f64; 2]) -> Self {
        Self {
            data: Array2::zeros((shape[0], shape[1])),
            extent,
        }
    }

    /// Grid shape (x cells, y cells).
    pub fn shape(&self) -> [usize; 2] {
        let s = self.data.shape();
        [s[0], s[1]]
    }

    /// Physical extent (x, y).
    pub fn extent(&self) -> [f64; 2] {
        self.extent
    }

    /// The underlying count array.
    pub fn data(&self) -> &Array2<u32> {
        &self.data
    }

    /// Bins a physical (x, y) position, excluding index zero and
    /// out-of-range positions.
    pub fn bin(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let shape = self.shape();
        let i = bin_axis(x, self.extent[0], shape[0])?;
        let j = bin_axis(y, self.extent[1], shape[1])?;
        Some((i, j))
    }

    /// Increments one cell.
    #[inline]
    pub fn increment(&mut self, index: (usize, usize)) {
        self.data[[index.0, index.1]] += 1;
    }

    /// Largest count in the map.
    pub fn max(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// Elementwise `self - background`, clipped at zero.
    ///
    /// The order is always signal minus background: only a positive excess
    /// over background indicates a real object.
    pub fn difference(&self, background: &CountMap) -> Result<CountMap, GridError> {
        if self.data.shape() != background.data.shape() {
            return Err(GridError::ShapeMismatch {
                left: self.data.shape().to_vec(),
                right: background.data.shape().to_vec(),
            });
        }
        let data = Zip::from(&self.data)
            .and(&background.data)
            .map_collect(|&s, &b| s.saturating_sub(b));
        Ok(CountMap {
            data,
            extent: self.extent,
        })
    }
}

/// A 3D count grid over the survey volume.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CountVolume {
    data: Array3<u32>,
    extent: [f64; 3],
}

impl CountVolume {
    /// Creates a zeroed volume with the given shape and physical extent.
    pub fn zeros(shape: [usize; 3], extent: [f64; 3]) -> Self {
        Self {
            data: Array3::zeros((shape[0], shape[1], shape[2])),
            extent,
        }
    }

    /// Assembles a volume from an already-accumulated count array.
    pub fn from_parts(data: Array3<u32>, extent: [f64; 3]) -> Self {
        Self { data, extent }
    }

    /// Grid shape (x cells, y cells, depth layers).
    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    /// Physical extent (x, y, z).
    pub fn extent(&self) -> [f64; 3] {
        self.extent
    }

    /// The underlying count array.
    pub fn data(&self) -> &Array3<u32> {
        &self.data
    }

    /// Bins a horizontal (x, y) position; the depth layer is chosen by the
    /// caller. Index zero is excluded as out of range.
    pub fn bin(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        let shape = self.shape();
        let i = bin_axis(x, self.extent[0], shape[0])?;
        let j = bin_axis(y, self.extent[1], shape[1])?;
        Some((i, j))
    }

    /// Increments one cell.
    #[inline]
    pub fn increment(&mut self, index: (usize, usize, usize)) {
        self.data[[index.0, index.1, index.2]] += 1;
    }

    /// Largest count in the volume.
    pub fn max(&self) -> u32 {
        self.data.iter().copied().max().unwrap_or(0)
    }

    /// One depth layer as a 2D view.
    pub fn layer(&self, layer: usize) -> ArrayView2<'_, u32> {
        self.data.index_axis(Axis(2), layer)
    }

    /// Elementwise `self - background`, clipped at zero.
    pub fn difference(&self, background: &CountVolume) -> Result<CountVolume, GridError> {
        if self.data.shape() != background.data.shape() {
            return Err(GridError::ShapeMismatch {
                left: self.data.shape().to_vec(),
                right: background.data.shape().to_vec(),
            });
        }
        let data = Zip::from(&self.data)
            .and(&background.data)
            .map_collect(|&s, &b| s.saturating_sub(b));
        Ok(CountVolume {
            data,
            extent: self.extent,
        })
    }
}

/// A volume after layer or group scaling; scaling leaves the integer domain.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScaledVolume {
    data: Array3<f64>,
    extent: [f64; 3],
}

impl ScaledVolume {
    /// Converts raw counts into a scalable volume.
    pub fn from_counts(counts: &CountVolume) -> Self {
        Self {
            data: counts.data().mapv(f64::from),
            extent: counts.extent(),
        }
    }

    /// Creates a zeroed volume with the given shape and physical extent.
    pub fn zeros(shape: [usize; 3], extent: [f64; 3]) -> Self {
        Self {
            data: Array3::zeros((shape[0], shape[1], shape[2])),
            extent,
        }
    }

    /// Grid shape (x cells, y cells, depth layers).
    pub fn shape(&self) -> [usize; 3] {
        let s = self.data.shape();
        [s[0], s[1], s[2]]
    }

    /// Physical extent (x, y, z).
    pub fn extent(&self) -> [f64; 3] {
        self.extent
    }

    /// The underlying array.
    pub fn data(&self) -> &Array3<f64> {
        &self.data
    }

    /// Mutable access for scaling passes.
    pub fn data_mut(&mut self) -> &mut Array3<f64> {
        &mut self.data
    }

    /// One depth layer as a 2D view.
    pub fn layer(&self, layer: usize) -> ArrayView2<'_, f64> {
        self.data.index_axis(Axis(2), layer)
    }

    /// One depth layer as a mutable 2D view.
    pub fn layer_mut(&mut self, layer: usize) -> ArrayViewMut2<'_, f64> {
        self.data.index_axis_mut(Axis(2), layer)
    }

    /// Number of depth layers.
    pub fn layers(&self) -> usize {
        self.data.shape()[2]
    }

    /// Largest value in the volume.
    pub fn max(&self) -> f64 {
        self.data.iter().fold(0.0, |m, &v| m.max(v))
    }
}
