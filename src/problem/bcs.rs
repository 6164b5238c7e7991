//! Boundary conditions: restrained and prescribed degrees of freedom

use serde::{Deserialize, Serialize};

use crate::jobdata::{real, JobContext, JobData};
use crate::model::NodeTarget;

/// Restraint state of the six nodal degrees of freedom
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Restraint {
    /// Restrained in X translation
    pub dx: bool,
    /// Restrained in Y translation
    pub dy: bool,
    /// Restrained in Z translation
    pub dz: bool,
    /// Restrained in X rotation
    pub rx: bool,
    /// Restrained in Y rotation
    pub ry: bool,
    /// Restrained in Z rotation
    pub rz: bool,
    /// Prescribed values [DX, DY, DZ, RX, RY, RZ]; `None` holds at zero
    pub enforced: [Option<f64>; 6],
}

impl Restraint {
    /// Create a restraint with every DOF free
    pub fn new() -> Self {
        Self::default()
    }

    /// All DOFs restrained
    pub fn fixed() -> Self {
        Self::with_restraints(true, true, true, true, true, true)
    }

    /// Translations restrained, rotations free
    pub fn pinned() -> Self {
        Self::with_restraints(true, true, true, false, false, false)
    }

    /// Only X translation restrained
    pub fn roller_x() -> Self {
        Self::with_restraints(true, false, false, false, false, false)
    }

    /// Only Y translation restrained
    pub fn roller_y() -> Self {
        Self::with_restraints(false, true, false, false, false, false)
    }

    /// Only Z translation restrained
    pub fn roller_z() -> Self {
        Self::with_restraints(false, false, true, false, false, false)
    }

    pub fn with_restraints(dx: bool, dy: bool, dz: bool, rx: bool, ry: bool, rz: bool) -> Self {
        Self {
            dx,
            dy,
            dz,
            rx,
            ry,
            rz,
            enforced: [None; 6],
        }
    }

    /// Prescribe a value on DOF `dof` (0-5), restraining it
    pub fn with_enforced(mut self, dof: usize, value: f64) -> Self {
        if let Some(slot) = self.enforced.get_mut(dof) {
            *slot = Some(value);
            match dof {
                0 => self.dx = true,
                1 => self.dy = true,
                2 => self.dz = true,
                3 => self.rx = true,
                4 => self.ry = true,
                _ => self.rz = true,
            }
        }
        self
    }

    pub fn flags(&self) -> [bool; 6] {
        [self.dx, self.dy, self.dz, self.rx, self.ry, self.rz]
    }

    /// Restrained DOF indices (0-5)
    pub fn restrained_dofs(&self) -> Vec<usize> {
        (0..6).filter(|&i| self.flags()[i]).collect()
    }

    /// Check if any DOF is restrained
    pub fn is_supported(&self) -> bool {
        self.flags().iter().any(|f| *f)
    }

    fn has_enforced(&self) -> bool {
        self.enforced.iter().any(Option::is_some)
    }
}

/// A named restraint applied to nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundaryCondition {
    pub name: String,
    pub target: NodeTarget,
    pub restraint: Restraint,
}

impl BoundaryCondition {
    pub fn new(name: impl Into<String>, target: NodeTarget, restraint: Restraint) -> Self {
        Self {
            name: name.into(),
            target,
            restraint,
        }
    }

    pub fn fixed(name: impl Into<String>, target: NodeTarget) -> Self {
        Self::new(name, target, Restraint::fixed())
    }

    pub fn pinned(name: impl Into<String>, target: NodeTarget) -> Self {
        Self::new(name, target, Restraint::pinned())
    }
}

impl JobData for BoundaryCondition {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        let mut out = format!(
            "** Name: {} Type: Displacement/Rotation\n*Boundary\n",
            self.name
        );
        let r = &self.restraint;
        let shortcut = if r.has_enforced() {
            None
        } else if r.flags() == [true; 6] {
            Some("ENCASTRE")
        } else if r.flags() == [true, true, true, false, false, false] {
            Some("PINNED")
        } else {
            None
        };

        for label in self.target.labels() {
            match shortcut {
                Some(keyword) => out.push_str(&format!("{label}, {keyword}\n")),
                None => {
                    for dof in r.restrained_dofs() {
                        let d = dof + 1;
                        match r.enforced[dof] {
                            Some(value) => {
                                out.push_str(&format!("{label}, {d}, {d}, {}\n", real(value)))
                            }
                            None => out.push_str(&format!("{label}, {d}, {d}\n")),
                        }
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Model;
    use crate::problem::Problem;

    fn render(bc: &BoundaryCondition) -> String {
        let model = Model::new("m");
        let problem = Problem::new("p");
        bc.jobdata(&JobContext::new(&model, &problem))
    }

    #[test]
    fn test_fixed_support() {
        let support = Restraint::fixed();
        assert!(support.dx && support.dy && support.dz);
        assert_eq!(support.restrained_dofs().len(), 6);
        let text = render(&BoundaryCondition::fixed("base", NodeTarget::part_set("p-1", "base")));
        assert_eq!(
            text,
            "** Name: base Type: Displacement/Rotation\n*Boundary\np-1.base, ENCASTRE\n"
        );
    }

    #[test]
    fn test_pinned_nodes() {
        let text = render(&BoundaryCondition::pinned("pins", NodeTarget::nodes("p-1", [0, 3])));
        assert!(text.ends_with("p-1.1, PINNED\np-1.4, PINNED\n"));
    }

    #[test]
    fn test_enforced_displacement() {
        let restraint = Restraint::roller_z().with_enforced(1, -0.5);
        assert!(restraint.dy);
        let text = render(&BoundaryCondition::new(
            "settle",
            NodeTarget::assembly_set("supports"),
            restraint,
        ));
        assert!(text.ends_with("supports, 2, 2, -0.5\nsupports, 3, 3\n"));
    }

    #[test]
    fn test_free_restraint() {
        assert!(!Restraint::new().is_supported());
    }
}
