//! modelkit core library
//!
//! The format-independent half of modelkit: typed byte buffers and accessors, the scene
//! intermediate representation every decoder produces, the shared error taxonomy, the
//! canonical humanoid bone table and decode options.

// =============================================================================
// Typed buffer layer
// =============================================================================

pub mod accessor;
pub mod buffer;
pub mod data_types;
pub mod decoder_buffer;

// =============================================================================
// Scene IR
// =============================================================================

pub mod animation;
pub mod humanoid;
pub mod material;
pub mod mesh;
pub mod metadata;
pub mod scene;
pub mod skin;

// =============================================================================
// Shared support
// =============================================================================

pub mod config;
pub mod error;

// =============================================================================
// Re-exports
// =============================================================================

pub use accessor::{Accessor, AccessorIter, Component, Element};
pub use animation::{Animation, AnimationChannel, AnimationSampler, Interpolation, TargetPath};
pub use buffer::{Buffer, BufferView};
pub use config::DecodeOptions;
pub use data_types::{AccessorType, ComponentType};
pub use decoder_buffer::DecoderBuffer;
pub use error::{ErrorKind, ModelError, ReferenceKind, Result};
pub use humanoid::HumanoidTag;
pub use material::{
    AlphaMode, Filter, Material, MaterialKind, Sampler, Texture, TextureInfo, TextureType, Wrap,
};
pub use mesh::{Attributes, Mesh, Primitive, PrimitiveMode};
pub use metadata::Metadata;
pub use scene::{Node, NodeId, NodeTransform, Scene, SessionId};
pub use skin::Skin;
