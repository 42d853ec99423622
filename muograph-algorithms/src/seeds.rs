//! Local-maximum seed search.
//!
//! The grid is partitioned into non-overlapping rectangular division cells;
//! each cell contributes the first (row-major) coordinate attaining its
//! maximum as a candidate seed for region growth.

use muograph_core::{CellValue, SeedGating};
use ndarray::ArrayView2;

/// A candidate cluster seed: a division cell's maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Seed {
    /// Grid coordinate of the maximum (first row-major occurrence).
    pub index: (usize, usize),
    /// Value at the seed.
    pub value: f64,
}

/// Division-cell boundaries along one axis: `divisions` points from 0 to `n`
/// with truncating integer spacing, giving `divisions - 1` cells.
///
/// The truncation makes cells slightly uneven; seed positions depend on the
/// exact boundaries, so the spacing must stay truncating.
fn cell_bounds(n: usize, divisions: usize) -> Vec<usize> {
    if divisions < 2 {
        return vec![0, n];
    }
    (0..divisions).map(|i| i * n / (divisions - 1)).collect()
}

/// Finds the per-cell maxima of `grid` under the given gating mode.
///
/// With [`SeedGating::Ungated`] the per-cell threshold is not applied; an
/// all-zero grid yields no seeds. With [`SeedGating::FractionOfMax`] a cell
/// only contributes a seed when its maximum exceeds `seed_threshold`.
pub fn seed_search<T: CellValue>(
    grid: ArrayView2<'_, T>,
    divisions: [usize; 2],
    gating: SeedGating,
    seed_threshold: f64,
) -> Vec<Seed> {
    let (rows, cols) = grid.dim();
    let grid_max = grid.iter().fold(0.0_f64, |m, v| m.max(v.as_f64()));

    if gating == SeedGating::Ungated && grid_max == 0.0 {
        return Vec::new();
    }

    let row_bounds = cell_bounds(rows, divisions[0]);
    let col_bounds = cell_bounds(cols, divisions[1]);

    let mut seeds = Vec::new();
    for rw in row_bounds.windows(2) {
        for cw in col_bounds.windows(2) {
            if rw[0] == rw[1] || cw[0] == cw[1] {
                continue;
            }
            let mut best = grid[(rw[0], cw[0])].as_f64();
            let mut best_index = (rw[0], cw[0]);
            for r in rw[0]..rw[1] {
                for c in cw[0]..cw[1] {
                    let v = grid[(r, c)].as_f64();
                    if v > best {
                        best = v;
                        best_index = (r, c);
                    }
                }
            }
            let accepted = match gating {
                SeedGating::Ungated => true,
                SeedGating::FractionOfMax => best > seed_threshold,
            };
            if accepted {
                seeds.push(Seed {
                    index: best_index,
                    value: best,
                });
            }
        }
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_cell_bounds_cover_grid() {
        let bounds = cell_bounds(143, 16);
        assert_eq!(bounds.len(), 16);
        assert_eq!(bounds[0], 0);
        assert_eq!(bounds[15], 143);
        assert!(bounds.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_zero_grid_yields_no_seeds() {
        let grid = Array2::<u32>::zeros((64, 64));
        let seeds = seed_search(grid.view(), [16, 16], SeedGating::Ungated, 0.0);
        assert!(seeds.is_empty());
    }

    #[test]
    fn test_ungated_mode_seeds_every_cell() {
        let mut grid = Array2::<u32>::zeros((64, 64));
        grid[[10, 10]] = 50;
        let seeds = seed_search(grid.view(), [9, 9], SeedGating::Ungated, 1e9);
        // Eight cells per axis, no per-cell gate even with a huge threshold.
        assert_eq!(seeds.len(), 64);
        assert!(seeds.iter().any(|s| s.index == (10, 10) && s.value == 50.0));
    }

    #[test]
    fn test_fraction_gating_filters_cells() {
        let mut grid = Array2::<u32>::zeros((64, 64));
        grid[[10, 10]] = 50;
        grid[[40, 40]] = 4;
        let seeds = seed_search(grid.view(), [9, 9], SeedGating::FractionOfMax, 15.0);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].index, (10, 10));
    }

    #[test]
    fn test_first_row_major_maximum_wins() {
        let mut grid = Array2::<u32>::zeros((8, 8));
        grid[[2, 3]] = 7;
        grid[[5, 1]] = 7;
        let seeds = seed_search(grid.view(), [2, 2], SeedGating::Ungated, 0.0);
        assert_eq!(seeds.len(), 1);
        assert_eq!(seeds[0].index, (2, 3));
    }
}
