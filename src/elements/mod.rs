//! Model entities owned by a part

mod element;
mod group;
mod material;
mod node;
mod release;
mod section;

pub use element::{Element, ElementKind, ElementType, SectionRef};
pub use group::{ElementsGroup, FacesGroup, Group, GroupKind, Member, NodesGroup};
pub use material::{Material, MaterialKind, Orthotropic};
pub use node::{FieldResults, Node};
pub use release::{BeamEnd, BeamRelease, Release};
pub use section::{BeamProfile, MaterialRef, Section, SectionKind};
