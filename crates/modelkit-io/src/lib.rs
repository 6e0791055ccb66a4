//! modelkit decoders for 3D model and animation files.
//!
//! Every decoder turns one file into the scene representation of [`modelkit_core`]: a node
//! forest with meshes, materials and skins, plus keyframe animations.
//!
//! # Supported Formats
//!
//! | Format       | Extensions          | Scene | Animation |
//! |--------------|---------------------|-------|-----------|
//! | glTF 2.0     | `.gltf` `.glb` `.vrm` | ✓   | ✓         |
//! | PMX 2.0/2.1  | `.pmx`              | ✓     | -         |
//! | VMD          | `.vmd`              | -     | ✓         |
//!
//! # Unified Trait API
//!
//! All decoders implement [`ModelDecoder`]:
//!
//! ```ignore
//! use modelkit_io::{ModelDecoder, PmxDecoder, VmdDecoder};
//!
//! let model = PmxDecoder::new().load(Path::new("miku/miku.pmx"), Path::new("miku"))?;
//! let motion = VmdDecoder::new().load(Path::new("dance.vmd"), Path::new("."))?;
//! ```
//!
//! # Detecting the format
//!
//! [`DecoderRegistry`] sniffs file contents and dispatches to the first decoder whose probe
//! matches:
//!
//! ```ignore
//! use modelkit_io::DecoderRegistry;
//!
//! let registry = DecoderRegistry::default();
//! let result = registry.load_path(Path::new("avatar.glb"))?;
//! if let Some(scene) = &result.scene {
//!     println!("{} nodes", scene.nodes().len());
//! }
//! ```
//!
//! Limits and unit conventions come from [`DecodeOptions`](modelkit_core::DecodeOptions):
//!
//! ```ignore
//! let options = DecodeOptions::new().with_max_texture_bytes(64 * 1024 * 1024);
//! let registry = DecoderRegistry::with_options(options);
//! ```

// Decoders
pub mod gltf_json;
pub mod gltf_reader;
pub mod pmx_reader;
pub mod vmd_reader;

// Dispatch and shared plumbing
pub mod probe;
pub mod resource;
pub mod text;
pub mod traits;

// Re-export main types for convenience
pub use gltf_reader::GltfDecoder;
pub use pmx_reader::PmxDecoder;
pub use probe::DecoderRegistry;
pub use traits::{Ability, LoadResult, ModelDecoder};
pub use vmd_reader::VmdDecoder;
