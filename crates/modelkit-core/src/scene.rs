//! Scene graph: node identity, transforms and the per-load node arena
//!
//! Nodes are stored flat in [`Scene::nodes`] and refer to their children by [`NodeId`]. A
//! `NodeId` pairs the random [`SessionId`] of the load call that produced it with the node's
//! index in the source file, so ids from two independently loaded scenes never compare equal.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec3};
use uuid::Uuid;

use crate::mesh::Mesh;
use crate::skin::Skin;

/// Identifies one load call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// A fresh random session id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub session: SessionId,
    pub index: u32,
}

impl NodeId {
    pub fn new(session: SessionId, index: u32) -> Self {
        Self { session, index }
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.session, self.index)
    }
}

/// Local transform of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeTransform {
    Matrix(Mat4),
    Decomposed {
        translation: Vec3,
        rotation: Quat,
        scale: Vec3,
    },
}

impl NodeTransform {
    pub fn from_translation(translation: Vec3) -> Self {
        NodeTransform::Decomposed {
            translation,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }

    /// The transform as a single matrix.
    pub fn matrix(&self) -> Mat4 {
        match *self {
            NodeTransform::Matrix(m) => m,
            NodeTransform::Decomposed {
                translation,
                rotation,
                scale,
            } => Mat4::from_scale_rotation_translation(scale, rotation, translation),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub children: Vec<NodeId>,
    pub transform: Option<NodeTransform>,
    pub mesh: Option<Arc<Mesh>>,
    pub skin: Option<Arc<Skin>>,
}

impl Node {
    pub fn new(id: NodeId, name: Option<String>) -> Self {
        Self {
            id,
            name,
            children: Vec::new(),
            transform: None,
            mesh: None,
            skin: None,
        }
    }

    /// Local transform matrix, identity when the node has none.
    pub fn local_matrix(&self) -> Mat4 {
        self.transform
            .as_ref()
            .map_or(Mat4::IDENTITY, NodeTransform::matrix)
    }
}

/// A node forest plus the skins used anywhere in it.
#[derive(Debug, Clone)]
pub struct Scene {
    pub name: Option<String>,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
    skins: Vec<Arc<Skin>>,
    initial_transform: Option<Mat4>,
    lookup: HashMap<NodeId, usize>,
}

impl Scene {
    /// Creates a scene over `nodes`. Every id in `roots` and every child id must name a node in
    /// `nodes`; decoders guarantee this before calling.
    pub fn new(
        name: Option<String>,
        nodes: Vec<Node>,
        roots: Vec<NodeId>,
        skins: Vec<Arc<Skin>>,
    ) -> Self {
        let lookup = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.id, i))
            .collect();
        Self {
            name,
            nodes,
            roots,
            skins,
            initial_transform: None,
            lookup,
        }
    }

    /// Sets a transform applied to the whole scene. The identity matrix is stored as `None`.
    pub fn with_initial_transform(mut self, transform: Mat4) -> Self {
        self.initial_transform = (transform != Mat4::IDENTITY).then_some(transform);
        self
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn root_ids(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> + '_ {
        self.roots.iter().filter_map(move |id| self.node(*id))
    }

    pub fn skins(&self) -> &[Arc<Skin>] {
        &self.skins
    }

    pub fn initial_transform(&self) -> Option<Mat4> {
        self.initial_transform
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.lookup.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn children<'a>(&'a self, node: &'a Node) -> impl Iterator<Item = &'a Node> + 'a {
        node.children.iter().filter_map(move |id| self.node(*id))
    }

    /// First node with the given name.
    pub fn find_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name.as_deref() == Some(name))
    }

    /// All nodes reachable from the roots, parents before children, paired with their depth.
    pub fn depth_first(&self) -> Vec<(usize, &Node)> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<(usize, NodeId)> =
            self.roots.iter().rev().map(|id| (0, *id)).collect();
        while let Some((depth, id)) = stack.pop() {
            if let Some(node) = self.node(id) {
                out.push((depth, node));
                stack.extend(node.children.iter().rev().map(|c| (depth + 1, *c)));
            }
        }
        out
    }
}
