//! Beam end releases

use serde::{Deserialize, Serialize};

/// End of a beam element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BeamEnd {
    Start,
    End,
}

impl BeamEnd {
    /// Solver end label
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "S1",
            Self::End => "S2",
        }
    }
}

/// Released degrees of freedom at one beam end (`true` = released)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Release {
    /// Axial force
    pub n: bool,
    /// Shear along local 1
    pub v1: bool,
    /// Shear along local 2
    pub v2: bool,
    /// Moment about local 1
    pub m1: bool,
    /// Moment about local 2
    pub m2: bool,
    /// Torsion
    pub t: bool,
}

impl Release {
    /// Pinned end: release the chosen rotations
    pub fn pin(m1: bool, m2: bool, t: bool) -> Self {
        Self {
            m1,
            m2,
            t,
            ..Self::default()
        }
    }

    /// Sliding end: release the chosen shears
    pub fn slider(v1: bool, v2: bool) -> Self {
        Self {
            v1,
            v2,
            ..Self::default()
        }
    }

    /// Labels of the released components, joined by `-` (e.g. `M1-M2`)
    pub fn label(&self) -> String {
        [
            (self.n, "N"),
            (self.v1, "V1"),
            (self.v2, "V2"),
            (self.m1, "M1"),
            (self.m2, "M2"),
            (self.t, "T"),
        ]
        .iter()
        .filter(|(released, _)| *released)
        .map(|(_, label)| *label)
        .collect::<Vec<_>>()
        .join("-")
    }

    pub fn is_empty(&self) -> bool {
        self.label().is_empty()
    }
}

/// A release registered on a beam element of a part
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeamRelease {
    pub element: usize,
    pub location: BeamEnd,
    pub release: Release,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pin_label() {
        assert_eq!(Release::pin(true, true, false).label(), "M1-M2");
        assert_eq!(Release::slider(false, true).label(), "V2");
        assert!(Release::default().is_empty());
    }
}
