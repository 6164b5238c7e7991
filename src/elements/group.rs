//! Named node, element and face sets

use serde::{Deserialize, Serialize};

use super::{Element, Node};

/// A group member: either a key already registered in the part, or a new
/// entity registered when the group is added.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Member<T> {
    Key(usize),
    New(T),
}

impl<T> Member<T> {
    pub fn key(&self) -> Option<usize> {
        match self {
            Self::Key(key) => Some(*key),
            Self::New(_) => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodesGroup {
    pub name: String,
    pub members: Vec<Member<Node>>,
}

impl NodesGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = usize>) -> Self {
        self.members.extend(keys.into_iter().map(Member::Key));
        self
    }

    pub fn with_nodes(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        self.members.extend(nodes.into_iter().map(Member::New));
        self
    }

    /// Registered member keys
    pub fn keys(&self) -> Vec<usize> {
        self.members.iter().filter_map(Member::key).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElementsGroup {
    pub name: String,
    pub members: Vec<Member<Element>>,
}

impl ElementsGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = usize>) -> Self {
        self.members.extend(keys.into_iter().map(Member::Key));
        self
    }

    pub fn with_elements(mut self, elements: impl IntoIterator<Item = Element>) -> Self {
        self.members.extend(elements.into_iter().map(Member::New));
        self
    }

    pub fn keys(&self) -> Vec<usize> {
        self.members.iter().filter_map(Member::key).collect()
    }
}

/// Element faces, each tagged with the solver face label (`S1`, `S2`, ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacesGroup {
    pub name: String,
    pub faces: Vec<(Member<Element>, String)>,
}

impl FacesGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            faces: Vec::new(),
        }
    }

    pub fn with_face(mut self, element: usize, face: impl Into<String>) -> Self {
        self.faces.push((Member::Key(element), face.into()));
        self
    }

    pub fn with_new_face(mut self, element: Element, face: impl Into<String>) -> Self {
        self.faces.push((Member::New(element), face.into()));
        self
    }

    pub fn keys(&self) -> Vec<(usize, String)> {
        self.faces
            .iter()
            .filter_map(|(m, face)| m.key().map(|k| (k, face.clone())))
            .collect()
    }
}

/// Set discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GroupKind {
    /// `nset`
    Nodes,
    /// `elset`
    Elements,
    /// Element-face surface
    Faces,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Group {
    Nodes(NodesGroup),
    Elements(ElementsGroup),
    Faces(FacesGroup),
}

impl Group {
    pub fn name(&self) -> &str {
        match self {
            Self::Nodes(g) => &g.name,
            Self::Elements(g) => &g.name,
            Self::Faces(g) => &g.name,
        }
    }

    pub fn kind(&self) -> GroupKind {
        match self {
            Self::Nodes(_) => GroupKind::Nodes,
            Self::Elements(_) => GroupKind::Elements,
            Self::Faces(_) => GroupKind::Faces,
        }
    }

    /// Same kind and same registered members, ignoring order
    pub(crate) fn same_members(&self, other: &Group) -> bool {
        match (self, other) {
            (Self::Nodes(a), Self::Nodes(b)) => sorted(a.keys()) == sorted(b.keys()),
            (Self::Elements(a), Self::Elements(b)) => sorted(a.keys()) == sorted(b.keys()),
            (Self::Faces(a), Self::Faces(b)) => sorted(a.keys()) == sorted(b.keys()),
            _ => false,
        }
    }
}

impl From<NodesGroup> for Group {
    fn from(group: NodesGroup) -> Self {
        Self::Nodes(group)
    }
}

impl From<ElementsGroup> for Group {
    fn from(group: ElementsGroup) -> Self {
        Self::Elements(group)
    }
}

impl From<FacesGroup> for Group {
    fn from(group: FacesGroup) -> Self {
        Self::Faces(group)
    }
}

fn sorted<T: Ord>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items.dedup();
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_skip_unregistered() {
        let group = NodesGroup::new("supports")
            .with_keys([3, 1])
            .with_nodes([Node::new(0.0, 0.0, 0.0)]);
        assert_eq!(group.keys(), vec![3, 1]);
        assert_eq!(group.members.len(), 3);
    }

    #[test]
    fn test_same_members_ignores_order() {
        let a: Group = ElementsGroup::new("web").with_keys([0, 2, 1]).into();
        let b: Group = ElementsGroup::new("web").with_keys([1, 2, 0]).into();
        let c: Group = NodesGroup::new("web").with_keys([0, 1, 2]).into();
        assert!(a.same_members(&b));
        assert!(!a.same_members(&c));
        assert_eq!(c.kind(), GroupKind::Nodes);
    }
}
