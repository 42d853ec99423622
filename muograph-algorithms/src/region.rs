//! Bounded region growth.
//!
//! Grows a connected cluster from a seed in synchronous wavefront layers
//! (4-connectivity) with an explicit claimed-pixel set, so the hard safety
//! caps in [`GrowthLimits`] bound every call even on degenerate grids.

use muograph_core::{CellValue, GrowthLimits};
use ndarray::{Array2, ArrayView2};

/// Why one region-growth call stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HaltReason {
    /// The next wavefront layer was empty.
    Exhausted,
    /// Every scanned source pixel had at least two zero-valued neighbors.
    ZeroBounded,
    /// The next layer exceeded the frontier cap.
    FrontierCap,
    /// More source pixels were scanned in one layer than the scan cap.
    ScanCap,
}

/// A connected pixel region grown from one seed.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterRegion<T> {
    /// Seed coordinate the region was grown from.
    pub seed: (usize, usize),
    /// Growth threshold the region was grown under.
    pub threshold: f64,
    /// Claimed pixels, seed first, in wavefront order.
    pub pixels: Vec<(usize, usize)>,
    /// Original grid values at the claimed pixels, aligned with `pixels`.
    pub values: Vec<T>,
    /// Why growth stopped.
    pub halt: HaltReason,
}

impl<T: CellValue> ClusterRegion<T> {
    /// Number of claimed pixels.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true if only the seed was claimed.
    pub fn is_empty(&self) -> bool {
        self.pixels.len() <= 1
    }

    /// Number of claimed pixels with a nonzero original value.
    pub fn nonzero_pixels(&self) -> usize {
        self.values.iter().filter(|v| !v.is_zero()).count()
    }
}

const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Grows a region from `seed` over all connected pixels with value at or
/// above `threshold`.
///
/// Growth proceeds in synchronous layers. A zero-valued neighbor increments
/// its source pixel's zero count; when every source pixel of a layer reaches
/// a zero count of two, the region is considered bounded by empty space and
/// growth halts. The caps in `limits` are hard upper bounds.
pub fn grow_region<T: CellValue>(
    grid: ArrayView2<'_, T>,
    seed: (usize, usize),
    threshold: f64,
    limits: &GrowthLimits,
) -> ClusterRegion<T> {
    let (rows, cols) = grid.dim();
    let mut claimed = Array2::<bool>::from_elem((rows, cols), false);
    claimed[seed] = true;

    let mut pixels = vec![seed];
    let mut frontier = vec![seed];

    let halt = loop {
        let mut next: Vec<(usize, usize)> = Vec::new();
        let mut bounded_sources = 0;
        let mut cap = None;

        for (scanned, &(r, c)) in frontier.iter().enumerate() {
            let mut zeros = 0;
            for (dr, dc) in NEIGHBORS {
                let nr = r as isize + dr;
                let nc = c as isize + dc;
                if nr < 0 || nc < 0 || nr as usize >= rows || nc as usize >= cols {
                    continue;
                }
                let neighbor = (nr as usize, nc as usize);
                let value = grid[neighbor];
                if value.as_f64() < threshold {
                    if value.is_zero() {
                        zeros += 1;
                    }
                } else if !claimed[neighbor] {
                    claimed[neighbor] = true;
                    next.push(neighbor);
                }
            }
            if zeros >= 2 {
                bounded_sources += 1;
            }
            if next.len() > limits.max_frontier {
                cap = Some(HaltReason::FrontierCap);
                break;
            }
            if scanned > limits.max_scanned {
                cap = Some(HaltReason::ScanCap);
                break;
            }
        }

        // A partially grown layer is still claimed.
        pixels.extend_from_slice(&next);

        if let Some(reason) = cap {
            break reason;
        }
        if next.is_empty() {
            break HaltReason::Exhausted;
        }
        if bounded_sources >= frontier.len() {
            break HaltReason::ZeroBounded;
        }
        frontier = next;
    };

    let values = pixels.iter().map(|&p| grid[p]).collect();
    ClusterRegion {
        seed,
        threshold,
        pixels,
        values,
        halt,
    }
}
