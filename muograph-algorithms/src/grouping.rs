//! Cross-view grouping.
//!
//! Decides which viewpoints' object volumes reconstruct the same physical
//! object: per-layer scaling to a common scale, pairwise overlap detection
//! merged through a union-find, and per-group composite volumes with
//! per-depth-layer confidence targets.

use muograph_core::{CountVolume, ScaledVolume};
use ndarray::Array3;
use rayon::prelude::*;

/// Union-Find over viewpoint indices, for transitive overlap merging.
///
/// The grouping result is independent of edge order.
#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl UnionFind {
    /// Creates `n` singleton sets.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            rank: vec![0; n],
        }
    }

    /// Representative of `x`'s set, with path halving.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merges the sets containing `a` and `b`.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// One merged group of overlapping viewpoints.
#[derive(Debug, Clone)]
pub struct ObjectGroup {
    /// Member viewpoint indices, ascending.
    pub members: Vec<usize>,
    /// Member volumes rescaled to the group maximum and summed, one
    /// contribution per distinct raw maximum.
    pub composite: ScaledVolume,
    /// Per-depth-layer confidence counters.
    pub target: Vec<u32>,
    /// Distinct raw maxima that contributed to the composite.
    pub maxima: Vec<f64>,
}

/// Rescales every depth layer of `volume` so its maximum equals the volume's
/// global maximum. All-zero layers are left untouched. Idempotent.
pub fn scale_volume_layers(volume: &mut ScaledVolume) {
    let global_max = volume.max();
    if global_max == 0.0 {
        return;
    }
    for layer in 0..volume.layers() {
        let layer_max = volume.layer(layer).iter().fold(0.0_f64, |m, &v| m.max(v));
        if layer_max != 0.0 {
            let factor = global_max / layer_max;
            volume.layer_mut(layer).mapv_inplace(|v| v * factor);
        }
    }
}

/// Converts raw count volumes to layer-scaled volumes, one per viewpoint.
pub fn scale_layers(volumes: &[CountVolume]) -> Vec<ScaledVolume> {
    volumes
        .iter()
        .map(|counts| {
            let mut scaled = ScaledVolume::from_counts(counts);
            scale_volume_layers(&mut scaled);
            scaled
        })
        .collect()
}

/// True when subtracting `b` from `a` (clipped at zero) changes `a`
/// anywhere, i.e. the two volumes' supports intersect.
fn volumes_overlap(a: &Array3<f64>, b: &Array3<f64>) -> bool {
    debug_assert_eq!(a.shape(), b.shape());
    a.iter().zip(b.iter()).any(|(&x, &y)| (x - y).max(0.0) != x)
}

/// Records an overlap edge for every ordered viewpoint pair whose volumes
/// intersect.
pub fn overlap_edges(volumes: &[ScaledVolume]) -> Vec<(usize, usize)> {
    let n = volumes.len();
    let pairs: Vec<(usize, usize)> = (0..n)
        .flat_map(|i| (0..n).filter(move |&j| j != i).map(move |j| (i, j)))
        .collect();
    pairs
        .into_par_iter()
        .filter(|&(i, j)| volumes_overlap(volumes[i].data(), volumes[j].data()))
        .collect()
}

/// Merges overlap edges transitively into groups of viewpoint indices.
///
/// Viewpoints that appear in no edge form no group.
pub fn group_members(count: usize, edges: &[(usize, usize)]) -> Vec<Vec<usize>> {
    let mut uf = UnionFind::new(count);
    let mut touched = vec![false; count];
    for &(i, j) in edges {
        uf.union(i, j);
        touched[i] = true;
        touched[j] = true;
    }

    let mut by_root: std::collections::BTreeMap<usize, Vec<usize>> =
        std::collections::BTreeMap::new();
    for viewpoint in 0..count {
        if touched[viewpoint] {
            by_root
                .entry(uf.find(viewpoint))
                .or_default()
                .push(viewpoint);
        }
    }

    let mut groups: Vec<Vec<usize>> = by_root.into_values().collect();
    groups.sort_by_key(|members| members[0]);
    groups
}

/// Builds composites and confidence targets for every group.
///
/// For each ordered member pair and depth layer, the overlap magnitude
/// `sum(layer_j - clip0(layer_j - layer_k))` is compared against
/// `layer_j_max * overlap_cutoff`: the layer's counter advances by 1 when
/// the overlap is strong and by 2 otherwise. Members with a duplicate raw
/// maximum are treated as duplicate reconstructions and added once.
pub fn scale_groups(
    scaled: &[ScaledVolume],
    raw_maxima: &[f64],
    groups: &[Vec<usize>],
    overlap_cutoff: f64,
) -> Vec<ObjectGroup> {
    groups
        .iter()
        .map(|members| {
            let shape = scaled[members[0]].shape();
            let extent = scaled[members[0]].extent();
            let layers = shape[2];

            let mut target = vec![0_u32; layers];
            let mut composite = ScaledVolume::zeros(shape, extent);
            let mut added: Vec<f64> = Vec::new();
            let group_max = members
                .iter()
                .map(|&j| raw_maxima[j])
                .fold(0.0_f64, f64::max);

            for &j in members {
                for &k in members {
                    if j == k {
                        continue;
                    }
                    for (layer, counter) in target.iter_mut().enumerate() {
                        let vj = scaled[j].layer(layer);
                        let vk = scaled[k].layer(layer);
                        let mut layer_max = 0.0_f64;
                        let mut magnitude = 0.0_f64;
                        for (&a, &b) in vj.iter().zip(vk.iter()) {
                            layer_max = layer_max.max(a);
                            magnitude += a - (a - b).max(0.0);
                        }
                        if magnitude.abs() > layer_max * overlap_cutoff {
                            *counter += 1;
                        } else {
                            *counter += 2;
                        }
                    }
                }

                if raw_maxima[j] != 0.0 && !added.contains(&raw_maxima[j]) {
                    let factor = group_max / raw_maxima[j];
                    composite
                        .data_mut()
                        .zip_mut_with(scaled[j].data(), |c, &v| *c += v * factor);
                    added.push(raw_maxima[j]);
                }
            }

            ObjectGroup {
                members: members.clone(),
                composite,
                target,
                maxima: added,
            }
        })
        .collect()
}

/// Cross-view support votes: cells of the summed binarized volumes, with
/// cells supported by fewer than `min_votes` viewpoints zeroed.
pub fn vote_mask(volumes: &[CountVolume], min_votes: u32) -> Option<CountVolume> {
    let first = volumes.first()?;
    let mut votes = Array3::<u32>::zeros(first.data().raw_dim());
    for volume in volumes {
        debug_assert_eq!(volume.shape(), first.shape());
        votes.zip_mut_with(volume.data(), |acc, &count| {
            if count > 0 {
                *acc += 1;
            }
        });
    }
    votes.mapv_inplace(|v| if v < min_votes { 0 } else { v });
    Some(CountVolume::from_parts(votes, first.extent()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn volume_with(cells: &[((usize, usize, usize), u32)]) -> CountVolume {
        let mut v = CountVolume::zeros([8, 8, 4], [80.0, 80.0, 40.0]);
        for &(idx, count) in cells {
            for _ in 0..count {
                v.increment(idx);
            }
        }
        v
    }

    #[test]
    fn test_union_find() {
        let mut uf = UnionFind::new(5);
        uf.union(0, 1);
        uf.union(2, 3);
        uf.union(1, 2);
        assert_eq!(uf.find(0), uf.find(3));
        assert_ne!(uf.find(0), uf.find(4));
    }

    #[test]
    fn test_scale_layers_is_idempotent() {
        let volume = volume_with(&[((1, 1, 0), 4), ((2, 2, 1), 2), ((3, 3, 2), 8)]);
        let mut scaled = ScaledVolume::from_counts(&volume);
        scale_volume_layers(&mut scaled);
        let once = scaled.clone();
        scale_volume_layers(&mut scaled);
        assert_eq!(once, scaled);
        // Every nonzero layer now peaks at the global maximum.
        for layer in [0, 1, 2] {
            let max = scaled.layer(layer).iter().fold(0.0_f64, |m, &v| m.max(v));
            assert_relative_eq!(max, 8.0);
        }
    }

    #[test]
    fn test_scale_layers_skips_zero_layers() {
        let volume = volume_with(&[((1, 1, 0), 4)]);
        let mut scaled = ScaledVolume::from_counts(&volume);
        scale_volume_layers(&mut scaled);
        assert!(scaled.layer(3).iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_disjoint_volumes_no_edges_no_groups() {
        let a = ScaledVolume::from_counts(&volume_with(&[((1, 1, 0), 3)]));
        let b = ScaledVolume::from_counts(&volume_with(&[((6, 6, 2), 3)]));
        let edges = overlap_edges(&[a, b]);
        assert!(edges.is_empty());
        assert!(group_members(2, &edges).is_empty());
    }

    #[test]
    fn test_overlapping_volumes_group() {
        let a = ScaledVolume::from_counts(&volume_with(&[((4, 4, 1), 3), ((1, 1, 0), 2)]));
        let b = ScaledVolume::from_counts(&volume_with(&[((4, 4, 1), 5)]));
        let edges = overlap_edges(&[a, b]);
        assert_eq!(edges.len(), 2); // both ordered directions
        let groups = group_members(2, &edges);
        assert_eq!(groups, vec![vec![0, 1]]);
    }

    #[test]
    fn test_transitive_merge() {
        // 0 overlaps 1, 1 overlaps 2, 0 and 2 are disjoint.
        let a = ScaledVolume::from_counts(&volume_with(&[((1, 1, 0), 2)]));
        let b = ScaledVolume::from_counts(&volume_with(&[((1, 1, 0), 2), ((6, 6, 0), 2)]));
        let c = ScaledVolume::from_counts(&volume_with(&[((6, 6, 0), 2)]));
        let edges = overlap_edges(&[a, b, c]);
        let groups = group_members(3, &edges);
        assert_eq!(groups, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn test_scale_groups_composite_and_target() {
        let va = volume_with(&[((4, 4, 1), 4)]);
        let vb = volume_with(&[((4, 4, 1), 2)]);
        let scaled = scale_layers(&[va.clone(), vb.clone()]);
        let maxima = [f64::from(va.max()), f64::from(vb.max())];
        let groups = vec![vec![0, 1]];

        let object_groups = scale_groups(&scaled, &maxima, &groups, 0.4);
        assert_eq!(object_groups.len(), 1);
        let group = &object_groups[0];

        assert_eq!(group.members, vec![0, 1]);
        assert_eq!(group.maxima.len(), 2);
        assert_eq!(group.target.len(), 4);
        // Layer 1 overlaps fully (counter 1 per ordered pair); the empty
        // layers score 2 per ordered pair.
        assert_eq!(group.target[1], 2);
        assert_eq!(group.target[0], 4);
        // Both members contribute, rescaled to the group maximum of 4.
        assert_relative_eq!(group.composite.data()[[4, 4, 1]], 8.0);
    }

    #[test]
    fn test_scale_groups_skips_duplicate_maxima() {
        let va = volume_with(&[((4, 4, 1), 3)]);
        let vb = volume_with(&[((4, 4, 1), 3)]);
        let scaled = scale_layers(&[va.clone(), vb.clone()]);
        let maxima = [3.0, 3.0];
        let object_groups = scale_groups(&scaled, &maxima, &[vec![0, 1]], 0.4);
        assert_eq!(object_groups[0].maxima, vec![3.0]);
        assert_relative_eq!(object_groups[0].composite.data()[[4, 4, 1]], 3.0);
    }

    #[test]
    fn test_vote_mask() {
        let a = volume_with(&[((1, 1, 0), 2), ((4, 4, 1), 1)]);
        let b = volume_with(&[((1, 1, 0), 5)]);
        let mask = vote_mask(&[a, b], 2).unwrap();
        assert_eq!(mask.data()[[1, 1, 0]], 2);
        assert_eq!(mask.data()[[4, 4, 1]], 0); // one vote, below the floor
        assert!(vote_mask(&[], 2).is_none());
    }
}
