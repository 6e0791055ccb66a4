//! Error handling for modelkit decoders
//!
//! Every decoder failure is a [`ModelError`]. Variants carry the offending value and, where it
//! makes sense, the range that would have been accepted, so a failed load can be diagnosed
//! without re-running it. [`ModelError::kind`] folds the variants into a small set of
//! [`ErrorKind`] categories for callers that only need to decide how to report a failure.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Broad failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The bytes do not carry the signature of the decoder that was asked to read them
    SignatureMismatch,
    /// No registered decoder recognised the input
    UnrecognizedFormat,
    /// Bad version, header field, enum tag or width
    Structural,
    /// A read would leave its backing buffer or view
    Bounds,
    /// An index points at an entry that does not exist
    DanglingReference,
    /// A required vertex attribute is absent or an indexed set has gaps
    MissingAttribute,
    /// Skin joints and inverse-bind matrices disagree
    SkinValidation,
    /// The node or bone hierarchy contains a cycle
    CyclicGraph,
    /// The input uses a feature the decoders intentionally do not implement
    UnsupportedReference,
    /// An input or companion file is oversized or unreadable
    Resource,
}

impl ErrorKind {
    /// Returns the name of this category as a string
    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::SignatureMismatch => "SIGNATURE_MISMATCH",
            ErrorKind::UnrecognizedFormat => "UNRECOGNIZED_FORMAT",
            ErrorKind::Structural => "STRUCTURAL",
            ErrorKind::Bounds => "BOUNDS",
            ErrorKind::DanglingReference => "DANGLING_REFERENCE",
            ErrorKind::MissingAttribute => "MISSING_ATTRIBUTE",
            ErrorKind::SkinValidation => "SKIN_VALIDATION",
            ErrorKind::CyclicGraph => "CYCLIC_GRAPH",
            ErrorKind::UnsupportedReference => "UNSUPPORTED_REFERENCE",
            ErrorKind::Resource => "RESOURCE",
        }
    }

    /// True for failures caused by the input's format rather than the environment.
    pub fn is_format_error(self) -> bool {
        !matches!(self, ErrorKind::Resource | ErrorKind::UnrecognizedFormat)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The kind of entry an index refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Buffer,
    BufferView,
    Accessor,
    Sampler,
    Image,
    Texture,
    Material,
    Mesh,
    Skin,
    Node,
    Scene,
    AnimationSampler,
    Vertex,
    Bone,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Buffer => "buffer",
            ReferenceKind::BufferView => "buffer view",
            ReferenceKind::Accessor => "accessor",
            ReferenceKind::Sampler => "sampler",
            ReferenceKind::Image => "image",
            ReferenceKind::Texture => "texture",
            ReferenceKind::Material => "material",
            ReferenceKind::Mesh => "mesh",
            ReferenceKind::Skin => "skin",
            ReferenceKind::Node => "node",
            ReferenceKind::Scene => "scene",
            ReferenceKind::AnimationSampler => "animation sampler",
            ReferenceKind::Vertex => "vertex",
            ReferenceKind::Bone => "bone",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("{format} signature not found")]
    SignatureMismatch { format: &'static str },

    #[error("no decoder recognises {}", describe_input(.path))]
    UnrecognizedFormat { path: Option<PathBuf> },

    #[error("unsupported {format} version {version} (minimum {minimum})")]
    UnsupportedVersion {
        format: &'static str,
        version: f32,
        minimum: f32,
    },

    #[error("invalid header field {field}: {value} (allowed: {allowed})")]
    InvalidHeader {
        field: &'static str,
        value: i64,
        allowed: &'static str,
    },

    #[error("invalid {field} value {value} (allowed: {allowed})")]
    InvalidEnum {
        field: &'static str,
        value: i64,
        allowed: &'static str,
    },

    #[error("invalid document: {0}")]
    InvalidDocument(String),

    #[error("malformed structure: {0}")]
    Structural(String),

    #[error("{what}: read of {length} bytes at offset {offset} exceeds {available} available bytes")]
    Bounds {
        what: String,
        offset: usize,
        length: usize,
        available: usize,
    },

    #[error("{kind} index {index} out of range ({len} defined)")]
    DanglingReference {
        kind: ReferenceKind,
        index: i64,
        len: usize,
    },

    #[error("accessor holds {actual} components per element, reader expects {expected}")]
    AccessorTypeMismatch { expected: usize, actual: usize },

    #[error("missing attribute: {0}")]
    MissingAttribute(String),

    #[error("invalid skin: {0}")]
    SkinValidation(String),

    #[error("cycle detected at {kind} {index}")]
    CyclicGraph { kind: ReferenceKind, index: usize },

    #[error("unsupported reference: {0}")]
    UnsupportedReference(String),

    #[error("file {} is {size} bytes, limit is {limit}", .path.display())]
    FileTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("texture {} is {size} bytes, limit is {limit}", .path.display())]
    TextureTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("cannot read {}: {source}", .path.display())]
    ResourceUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ModelError>;

fn describe_input(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "the input".to_string(),
    }
}

impl ModelError {
    /// Returns the category this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::SignatureMismatch { .. } => ErrorKind::SignatureMismatch,
            ModelError::UnrecognizedFormat { .. } => ErrorKind::UnrecognizedFormat,
            ModelError::UnsupportedVersion { .. }
            | ModelError::InvalidHeader { .. }
            | ModelError::InvalidEnum { .. }
            | ModelError::InvalidDocument(_)
            | ModelError::Structural(_)
            | ModelError::AccessorTypeMismatch { .. } => ErrorKind::Structural,
            ModelError::Bounds { .. } => ErrorKind::Bounds,
            ModelError::DanglingReference { .. } => ErrorKind::DanglingReference,
            ModelError::MissingAttribute(_) => ErrorKind::MissingAttribute,
            ModelError::SkinValidation(_) => ErrorKind::SkinValidation,
            ModelError::CyclicGraph { .. } => ErrorKind::CyclicGraph,
            ModelError::UnsupportedReference(_) => ErrorKind::UnsupportedReference,
            ModelError::FileTooLarge { .. }
            | ModelError::TextureTooLarge { .. }
            | ModelError::ResourceUnreadable { .. }
            | ModelError::Io(_) => ErrorKind::Resource,
        }
    }

    /// Creates a dangling-reference error for a signed or unsigned index.
    pub fn dangling(kind: ReferenceKind, index: impl Into<i64>, len: usize) -> Self {
        ModelError::DanglingReference {
            kind,
            index: index.into(),
            len,
        }
    }

    /// Creates a bounds error.
    pub fn bounds(what: impl Into<String>, offset: usize, length: usize, available: usize) -> Self {
        ModelError::Bounds {
            what: what.into(),
            offset,
            length,
            available,
        }
    }
}

/// Looks up `index` in `items`, failing with a dangling-reference error when it is out of range.
pub fn lookup<T>(items: &[T], kind: ReferenceKind, index: usize) -> Result<&T> {
    items
        .get(index)
        .ok_or_else(|| ModelError::dangling(kind, index as i64, items.len()))
}
