//! Step loads

use serde::{Deserialize, Serialize};

use crate::jobdata::{key_lines, real, reals, JobContext, JobData};
use crate::model::NodeTarget;

/// How a load combines with loads from previous steps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadOperation {
    /// Modify or add to the loads already active
    #[default]
    Modify,
    /// Remove previously active loads first
    New,
}

impl LoadOperation {
    fn keyword(&self) -> &'static str {
        match self {
            Self::Modify => "MOD",
            Self::New => "NEW",
        }
    }
}

/// Concentrated nodal forces and moments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    pub name: String,
    pub target: NodeTarget,
    /// [FX, FY, FZ, MX, MY, MZ]; `None` components are not written
    pub components: [Option<f64>; 6],
    pub op: LoadOperation,
    /// Rotate with the node
    pub follower: bool,
}

impl PointLoad {
    pub fn new(name: impl Into<String>, target: NodeTarget) -> Self {
        Self {
            name: name.into(),
            target,
            components: [None; 6],
            op: LoadOperation::default(),
            follower: false,
        }
    }

    /// Force-only load. Zero components are left unset.
    pub fn force(name: impl Into<String>, target: NodeTarget, fx: f64, fy: f64, fz: f64) -> Self {
        let mut load = Self::new(name, target);
        load.components[..3].copy_from_slice(&nonzero([fx, fy, fz]));
        load
    }

    /// Moment-only load. Zero components are left unset.
    pub fn moment(name: impl Into<String>, target: NodeTarget, mx: f64, my: f64, mz: f64) -> Self {
        let mut load = Self::new(name, target);
        load.components[3..].copy_from_slice(&nonzero([mx, my, mz]));
        load
    }

    /// Set one component explicitly; a zero here is still written.

    pub fn with_component(mut self, dof: usize, value: f64) -> Self {
        if let Some(slot) = self.components.get_mut(dof) {
            *slot = Some(value);
        }
        self
    }

    pub fn with_op(mut self, op: LoadOperation) -> Self {
        self.op = op;
        self
    }

    pub fn follower(mut self) -> Self {
        self.follower = true;
        self
    }

    fn cload_block(&self) -> String {
        let mut out = format!("** Name: {} Type: Concentrated Force\n", self.name);
        // Loose nodes are gathered into an internal set first
        let labels = match &self.target {
            NodeTarget::Nodes { instance, keys } => {
                let set = format!("_aux_{}_{}", self.name, instance);
                out.push_str(&format!("*Nset, nset={set}, internal, instance={instance}\n"));
                out.push_str(&key_lines(keys.iter().copied()));
                vec![set]
            }
            other => other.labels(),
        };
        out.push_str(&format!("*Cload, OP={}", self.op.keyword()));
        if self.follower {
            out.push_str(", follower");
        }
        out.push('\n');
        for label in &labels {
            for (dof, value) in self.components.iter().enumerate() {
                if let Some(value) = value {
                    out.push_str(&format!("{}, {}, {}\n", label, dof + 1, real(*value)));
                }
            }
        }
        out
    }
}

fn nonzero(values: [f64; 3]) -> [Option<f64>; 3] {
    values.map(|v| (v != 0.0).then_some(v))
}

/// Gravity acceleration on the whole model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GravityLoad {
    pub name: String,
    /// Acceleration magnitude
    pub g: f64,
    /// Direction (not necessarily unit)
    pub direction: [f64; 3],
}

impl GravityLoad {
    pub fn new(name: impl Into<String>, g: f64, direction: [f64; 3]) -> Self {
        Self {
            name: name.into(),
            g,
            direction,
        }
    }

    /// 9.81 along -Z
    pub fn standard(name: impl Into<String>) -> Self {
        Self::new(name, 9.81, [0.0, 0.0, -1.0])
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Load {
    Point(PointLoad),
    Gravity(GravityLoad),
}

impl Load {
    pub fn name(&self) -> &str {
        match self {
            Self::Point(l) => &l.name,
            Self::Gravity(l) => &l.name,
        }
    }

    /// Node target, if the load has one
    pub fn target(&self) -> Option<&NodeTarget> {
        match self {
            Self::Point(l) => Some(&l.target),
            Self::Gravity(_) => None,
        }
    }
}

impl From<PointLoad> for Load {
    fn from(load: PointLoad) -> Self {
        Self::Point(load)
    }
}

impl From<GravityLoad> for Load {
    fn from(load: GravityLoad) -> Self {
        Self::Gravity(load)
    }
}

impl JobData for Load {
    fn jobdata(&self, _ctx: &JobContext<'_>) -> String {
        match self {
            Self::Point(load) => load.cload_block(),
            Self::Gravity(load) => format!(
                "** Name: {} Type: Gravity\n*Dload\n, GRAV, {}, {}\n",
                load.name,
                real(load.g),
                reals(&load.direction)
            ),
        }
    }
}
