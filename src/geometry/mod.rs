//! Geometric helpers: coordinate keys, planes and the nearest-neighbour index

mod gkey;
mod kdtree;
mod plane;

pub use gkey::{canonical_key, is_representable, GeometricKey};
pub use kdtree::KdTree;
pub use plane::Plane;

/// Euclidean distance between two points
pub fn distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    distance_squared(a, b).sqrt()
}

pub(crate) fn distance_squared(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let dz = b[2] - a[2];
    dx * dx + dy * dy + dz * dz
}
