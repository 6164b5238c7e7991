//! FEA Model - structural finite element model graph and input-file writer
//!
//! This library builds finite element models in memory and renders them as
//! Abaqus/CalculiX job data:
//! - Parts holding nodes, elements, materials, sections, groups and releases
//! - Coincident-node merging through quantized geometric keys
//! - Exact nearest-neighbour and radius queries on a KD-tree
//! - Deterministic grouping of elements into solver element blocks
//! - Assemblies, boundary conditions, loads, steps and interactions
//!
//! ## Example
//! ```rust
//! use fea_model::prelude::*;
//!
//! let mut part = Part::new("plate");
//! part.add_node(Node::new(0.0, 0.0, 0.0)).unwrap();
//! part.add_node(Node::new(1.0, 0.0, 0.0)).unwrap();
//! part.add_node(Node::new(1.0, 1.0, 0.0)).unwrap();
//! part.add_node(Node::new(0.0, 1.0, 0.0)).unwrap();
//!
//! let steel = Material::elastic_isotropic("steel", 210e9, 0.3, 7850.0);
//! part.add_element(Element::shell(vec![0, 1, 2, 3], Section::shell("t10", steel, 0.01)))
//!     .unwrap();
//! part.add_group(NodesGroup::new("edge").with_keys([0, 3])).unwrap();
//!
//! let mut model = Model::new("demo");
//! model.add_part(part).unwrap();
//!
//! let mut problem = Problem::new("demo-static");
//! problem
//!     .add_bc(BoundaryCondition::fixed("clamp", NodeTarget::part_set("plate-1", "edge")))
//!     .unwrap();
//! problem
//!     .add_step(StaticStep::new("load").with_load(PointLoad::force(
//!         "push",
//!         NodeTarget::nodes("plate-1", [2]),
//!         0.0,
//!         0.0,
//!         -100.0,
//!     )))
//!     .unwrap();
//!
//! problem.validate(&model).unwrap();
//! let input = InputFile::new(&model, &problem);
//! assert!(input.jobdata().contains("*Element, type=S4\n"));
//! ```

pub mod config;
pub mod elements;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod interactions;
pub mod jobdata;
pub mod model;
pub mod part;
pub mod problem;

// Re-export common types
pub mod prelude {
    pub use crate::config::ModelConfig;
    pub use crate::elements::{
        BeamEnd, BeamProfile, BeamRelease, Element, ElementKind, ElementType, ElementsGroup,
        FacesGroup, Group, GroupKind, Material, MaterialKind, MaterialRef, Member, Node,
        NodesGroup, Orthotropic, Release, Section, SectionKind, SectionRef,
    };
    pub use crate::error::{ErrorKind, ModelError, ModelResult};
    pub use crate::geometry::{canonical_key, GeometricKey, KdTree, Plane};
    pub use crate::grouping::{group_elements, Bucket, BucketKey, ElementGrouping};
    pub use crate::interactions::{Interaction, InteractionProperty, SurfaceTarget};
    pub use crate::jobdata::{InputFile, JobContext, JobData};
    pub use crate::model::{AssemblyGroup, Instance, Model, NodeTarget};
    pub use crate::part::{Axis, Part, PartKind};
    pub use crate::problem::{
        BoundaryCondition, FieldOutput, GravityLoad, HistoryOutput, Load, LoadOperation,
        ModalStep, PointLoad, Problem, Restraint, StaticStep, Step,
    };
}
