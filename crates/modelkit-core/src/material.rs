//! Materials, textures and samplers
//!
//! [`Material`] lifts the fields shared by every shading model into one record and keeps the
//! physically-based extras in [`MaterialKind::Pbr`].

use std::sync::Arc;

use crate::buffer::BufferView;

/// Texture filter, as a GL enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    NearestMipmapNearest,
    LinearMipmapNearest,
    NearestMipmapLinear,
    LinearMipmapLinear,
}

impl Filter {
    pub fn from_gl(code: u32) -> Option<Self> {
        match code {
            9728 => Some(Filter::Nearest),
            9729 => Some(Filter::Linear),
            9984 => Some(Filter::NearestMipmapNearest),
            9985 => Some(Filter::LinearMipmapNearest),
            9986 => Some(Filter::NearestMipmapLinear),
            9987 => Some(Filter::LinearMipmapLinear),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    ClampToEdge,
    MirroredRepeat,
    Repeat,
}

impl Wrap {
    pub fn from_gl(code: u32) -> Option<Self> {
        match code {
            33071 => Some(Wrap::ClampToEdge),
            33648 => Some(Wrap::MirroredRepeat),
            10497 => Some(Wrap::Repeat),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sampler {
    pub mag_filter: Filter,
    pub min_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

impl Default for Sampler {
    /// Linear filtering, repeat wrapping.
    fn default() -> Self {
        Self {
            mag_filter: Filter::Linear,
            min_filter: Filter::Linear,
            wrap_s: Wrap::Repeat,
            wrap_t: Wrap::Repeat,
        }
    }
}

/// Encoded image container of a texture payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureType {
    Png,
    Jpeg,
    Bmp,
    Tga,
    Dds,
    Unknown,
}

impl TextureType {
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_ascii_lowercase().as_str() {
            "image/png" => TextureType::Png,
            "image/jpeg" | "image/jpg" => TextureType::Jpeg,
            "image/bmp" => TextureType::Bmp,
            "image/x-tga" | "image/tga" => TextureType::Tga,
            "image/vnd-ms.dds" | "image/x-dds" => TextureType::Dds,
            _ => TextureType::Unknown,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" => TextureType::Png,
            "jpg" | "jpeg" => TextureType::Jpeg,
            "bmp" => TextureType::Bmp,
            "tga" => TextureType::Tga,
            "dds" => TextureType::Dds,
            _ => TextureType::Unknown,
        }
    }
}

/// Undecoded image bytes plus how to sample them.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: Option<String>,
    pub data: Arc<BufferView>,
    pub sampler: Sampler,
    pub texture_type: TextureType,
}

#[derive(Debug, Clone)]
pub struct TextureInfo {
    pub texture: Arc<Texture>,
    pub texcoord: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlphaMode {
    #[default]
    Opaque,
    Mask,
    Blend,
}

#[derive(Debug, Clone)]
pub enum MaterialKind {
    Unlit,
    Pbr {
        metallic_factor: f32,
        roughness_factor: f32,
        metallic_roughness_texture: Option<TextureInfo>,
    },
}

#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    pub base_color_factor: [f32; 4],
    pub base_color_texture: Option<TextureInfo>,
    pub alpha_mode: AlphaMode,
    pub alpha_cutoff: f32,
    pub double_sided: bool,
    pub kind: MaterialKind,
}

impl Default for Material {
    /// White, opaque, single-sided, metallic 1 and roughness 1.
    fn default() -> Self {
        Self {
            name: None,
            base_color_factor: [1.0; 4],
            base_color_texture: None,
            alpha_mode: AlphaMode::Opaque,
            alpha_cutoff: 0.5,
            double_sided: false,
            kind: MaterialKind::Pbr {
                metallic_factor: 1.0,
                roughness_factor: 1.0,
                metallic_roughness_texture: None,
            },
        }
    }
}

impl Material {
    pub fn is_unlit(&self) -> bool {
        matches!(self.kind, MaterialKind::Unlit)
    }
}
