use std::sync::Arc;

use crate::accessor::Accessor;
use crate::error::{ModelError, Result};
use crate::material::Material;

/// Primitive topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveMode {
    Points,
    Lines,
    LineLoop,
    LineStrip,
    #[default]
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl PrimitiveMode {
    pub fn from_gl(mode: u32) -> Result<Self> {
        match mode {
            0 => Ok(PrimitiveMode::Points),
            1 => Ok(PrimitiveMode::Lines),
            2 => Ok(PrimitiveMode::LineLoop),
            3 => Ok(PrimitiveMode::LineStrip),
            4 => Ok(PrimitiveMode::Triangles),
            5 => Ok(PrimitiveMode::TriangleStrip),
            6 => Ok(PrimitiveMode::TriangleFan),
            _ => Err(ModelError::InvalidEnum {
                field: "primitive mode",
                value: mode as i64,
                allowed: "0..=6",
            }),
        }
    }
}

/// Vertex attribute accessors of one primitive. Indexed sets are ordered by set number.
#[derive(Debug, Clone)]
pub struct Attributes {
    pub position: Arc<Accessor>,
    pub normal: Option<Arc<Accessor>>,
    pub tangent: Option<Arc<Accessor>>,
    pub texcoords: Vec<Arc<Accessor>>,
    pub colors: Vec<Arc<Accessor>>,
    pub joints: Vec<Arc<Accessor>>,
    pub weights: Vec<Arc<Accessor>>,
}

impl Attributes {
    pub fn new(position: Arc<Accessor>) -> Self {
        Self {
            position,
            normal: None,
            tangent: None,
            texcoords: Vec::new(),
            colors: Vec::new(),
            joints: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.position.count()
    }
}

#[derive(Debug, Clone)]
pub struct Primitive {
    pub mode: PrimitiveMode,
    pub material: Arc<Material>,
    pub attributes: Attributes,
    pub indices: Option<Arc<Accessor>>,
}

impl Primitive {
    /// Number of vertices drawn: the index count, or the vertex count when unindexed.
    pub fn element_count(&self) -> usize {
        self.indices
            .as_ref()
            .map_or(self.attributes.vertex_count(), |indices| indices.count())
    }
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}
