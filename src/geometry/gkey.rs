//! Rounding-based canonical keys for 3-D coordinates.
//!
//! Two points share a key when every component rounds to the same value at
//! the requested number of decimals. The rule is rounding, not distance: two
//! points straddling a rounding boundary get different keys even when they
//! are closer than `10^-precision`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Quantized coordinate triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GeometricKey([i64; 3]);

impl GeometricKey {
    pub fn components(&self) -> [i64; 3] {
        self.0
    }

    /// Label-safe rendering (`0_1000_m1000`), usable inside solver set names.
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|c| {
                if *c < 0 {
                    format!("m{}", c.unsigned_abs())
                } else {
                    c.to_string()
                }
            })
            .collect::<Vec<_>>()
            .join("_")
    }
}

impl fmt::Display for GeometricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0[0], self.0[1], self.0[2])
    }
}

/// Canonical key of `point` at `precision` decimal digits.
pub fn canonical_key(point: [f64; 3], precision: usize) -> GeometricKey {
    let scale = 10f64.powi(precision as i32);
    GeometricKey([
        quantize(point[0], scale),
        quantize(point[1], scale),
        quantize(point[2], scale),
    ])
}

/// Whether every coordinate of `point` quantizes without saturating
pub fn is_representable(point: [f64; 3], precision: usize) -> bool {
    let scale = 10f64.powi(precision as i32);
    // 2^63 is exactly representable and is the first value out of range
    point.iter().all(|v| (v * scale).round().abs() < i64::MAX as f64)
}

fn quantize(value: f64, scale: f64) -> i64 {
    // `as` saturates; -0.0 rounds to 0
    (value * scale).round() as i64
}
