use crate::error::{ModelError, Result};

/// Numeric type of a single accessor component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
}

impl ComponentType {
    /// Maps a glTF `componentType` code (5120..=5126) to a component type.
    pub fn from_gl(code: u32) -> Result<Self> {
        match code {
            5120 => Ok(ComponentType::Int8),
            5121 => Ok(ComponentType::Uint8),
            5122 => Ok(ComponentType::Int16),
            5123 => Ok(ComponentType::Uint16),
            5124 => Ok(ComponentType::Int32),
            5125 => Ok(ComponentType::Uint32),
            5126 => Ok(ComponentType::Float32),
            _ => Err(ModelError::InvalidEnum {
                field: "componentType",
                value: code as i64,
                allowed: "5120..=5126",
            }),
        }
    }

    /// Unsigned type with the given byte width, as used for index buffers.
    pub fn unsigned_of_width(width: usize) -> Option<Self> {
        match width {
            1 => Some(ComponentType::Uint8),
            2 => Some(ComponentType::Uint16),
            4 => Some(ComponentType::Uint32),
            _ => None,
        }
    }

    pub fn byte_length(&self) -> usize {
        match self {
            ComponentType::Int8 | ComponentType::Uint8 => 1,
            ComponentType::Int16 | ComponentType::Uint16 => 2,
            ComponentType::Int32 | ComponentType::Uint32 | ComponentType::Float32 => 4,
        }
    }

    pub fn is_integral(&self) -> bool {
        !matches!(self, ComponentType::Float32)
    }
}

/// Shape of an accessor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl AccessorType {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "SCALAR" => Ok(AccessorType::Scalar),
            "VEC2" => Ok(AccessorType::Vec2),
            "VEC3" => Ok(AccessorType::Vec3),
            "VEC4" => Ok(AccessorType::Vec4),
            "MAT2" => Ok(AccessorType::Mat2),
            "MAT3" => Ok(AccessorType::Mat3),
            "MAT4" => Ok(AccessorType::Mat4),
            other => Err(ModelError::InvalidDocument(format!(
                "unknown accessor type {:?}",
                other
            ))),
        }
    }

    pub fn component_count(&self) -> usize {
        match self {
            AccessorType::Scalar => 1,
            AccessorType::Vec2 => 2,
            AccessorType::Vec3 => 3,
            AccessorType::Vec4 | AccessorType::Mat2 => 4,
            AccessorType::Mat3 => 9,
            AccessorType::Mat4 => 16,
        }
    }
}
