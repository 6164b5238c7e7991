//! Exact 3-D KD-tree for k-nearest and radius queries.
//!
//! Results always match an exhaustive scan. Ties in distance are broken by
//! point index so query output is deterministic.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::distance_squared;

#[derive(Debug, Clone)]
struct KdNode {
    /// Index into the source point list
    point: usize,
    axis: usize,
    left: Option<usize>,
    right: Option<usize>,
}

/// Static KD-tree over a snapshot of points. Rebuild after the point set
/// changes.
#[derive(Debug, Clone, Default)]
pub struct KdTree {
    points: Vec<[f64; 3]>,
    nodes: Vec<KdNode>,
    root: Option<usize>,
}

/// Heap entry ordered by (squared distance, index)
#[derive(Debug, Clone, Copy)]
struct Candidate {
    dist2: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist2
            .total_cmp(&other.dist2)
            .then_with(|| self.index.cmp(&other.index))
    }
}

impl KdTree {
    /// Build a balanced tree by median splits, O(n log n) on average.
    pub fn build(points: &[[f64; 3]]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = build_recursive(points, &mut indices, 0, &mut nodes);
        Self {
            points: points.to_vec(),
            nodes,
            root,
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The `k` points closest to `target` as `(index, distance)`, nearest
    /// first. Returns fewer than `k` entries only if the tree is smaller.
    pub fn nearest(&self, target: [f64; 3], k: usize) -> Vec<(usize, f64)> {
        if k == 0 {
            return Vec::new();
        }
        let mut heap = BinaryHeap::with_capacity(k + 1);
        if let Some(root) = self.root {
            self.nearest_recursive(root, target, k, &mut heap);
        }
        heap.into_sorted_vec()
            .into_iter()
            .map(|c| (c.index, c.dist2.sqrt()))
            .collect()
    }

    /// All points strictly closer than `radius` to `target`, nearest first.
    pub fn within_radius(&self, target: [f64; 3], radius: f64) -> Vec<(usize, f64)> {
        if radius <= 0.0 {
            return Vec::new();
        }
        let mut found: Vec<Candidate> = Vec::new();
        if let Some(root) = self.root {
            self.radius_recursive(root, target, radius * radius, &mut found);
        }
        found.sort();
        found
            .into_iter()
            .map(|c| (c.index, c.dist2.sqrt()))
            .collect()
    }

    fn nearest_recursive(
        &self,
        node: usize,
        target: [f64; 3],
        k: usize,
        heap: &mut BinaryHeap<Candidate>,
    ) {
        let kd = &self.nodes[node];
        let point = self.points[kd.point];
        let candidate = Candidate {
            dist2: distance_squared(point, target),
            index: kd.point,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }

        let diff = target[kd.axis] - point[kd.axis];
        let (near, far) = if diff < 0.0 {
            (kd.left, kd.right)
        } else {
            (kd.right, kd.left)
        };
        if let Some(near) = near {
            self.nearest_recursive(near, target, k, heap);
        }
        if let Some(far) = far {
            // `<=` keeps equal-distance points with a lower index reachable
            let visit = heap.len() < k || heap.peek().is_some_and(|worst| diff * diff <= worst.dist2);
            if visit {
                self.nearest_recursive(far, target, k, heap);
            }
        }
    }

    fn radius_recursive(
        &self,
        node: usize,
        target: [f64; 3],
        radius2: f64,
        found: &mut Vec<Candidate>,
    ) {
        let kd = &self.nodes[node];
        let point = self.points[kd.point];
        let dist2 = distance_squared(point, target);
        if dist2 < radius2 {
            found.push(Candidate {
                dist2,
                index: kd.point,
            });
        }

        let diff = target[kd.axis] - point[kd.axis];
        let (near, far) = if diff < 0.0 {
            (kd.left, kd.right)
        } else {
            (kd.right, kd.left)
        };
        if let Some(near) = near {
            self.radius_recursive(near, target, radius2, found);
        }
        if let Some(far) = far {
            if diff * diff < radius2 {
                self.radius_recursive(far, target, radius2, found);
            }
        }
    }
}

fn build_recursive(
    points: &[[f64; 3]],
    indices: &mut [usize],
    depth: usize,
    nodes: &mut Vec<KdNode>,
) -> Option<usize> {
    if indices.is_empty() {
        return None;
    }
    let axis = depth % 3;
    let mid = indices.len() / 2;
    indices.select_nth_unstable_by(mid, |a, b| points[*a][axis].total_cmp(&points[*b][axis]));

    let slot = nodes.len();
    nodes.push(KdNode {
        point: indices[mid],
        axis,
        left: None,
        right: None,
    });

    let (lower, upper) = indices.split_at_mut(mid);
    let left = build_recursive(points, lower, depth + 1, nodes);
    let right = build_recursive(points, &mut upper[1..], depth + 1, nodes);
    nodes[slot].left = left;
    nodes[slot].right = right;
    Some(slot)
}
