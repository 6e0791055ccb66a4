//! Common interface of the format decoders.
//!
//! Every decoder implements [`ModelDecoder`]. A decoder is a plain value holding its
//! [`DecodeOptions`]; all per-load state lives on the stack of one `load` call, so a decoder
//! can be reused and shared between threads.
//!
//! # Usage
//!
//! ```ignore
//! use modelkit_io::{ModelDecoder, PmxDecoder};
//!
//! let decoder = PmxDecoder::new();
//! let result = decoder.load(Path::new("model/miku.pmx"), Path::new("model"))?;
//! let scene = result.scene.expect("pmx always yields a scene");
//! ```
//!
//! Generic code can work with any decoder:
//!
//! ```ignore
//! fn sniff<D: ModelDecoder>(decoder: &D, bytes: &[u8]) -> bool {
//!     bytes.len() >= decoder.probe_length() && decoder.probe(bytes)
//! }
//! ```

use std::path::Path;

use modelkit_core::{Animation, DecodeOptions, Metadata, Result, Scene};

use crate::resource;

/// What kind of data a decoder can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Model,
    Animation,
}

/// Everything one `load` call produced.
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    pub metadata: Option<Metadata>,
    pub scene: Option<Scene>,
    pub animations: Vec<Animation>,
}

/// A decoder for one file format family.
pub trait ModelDecoder: Send + Sync {
    /// Short format name used in logs.
    fn name(&self) -> &'static str;

    /// Lowercase file suffixes this decoder claims, without the dot.
    fn extensions(&self) -> &'static [&'static str];

    fn abilities(&self) -> &'static [Ability];

    /// Bytes [`probe`](Self::probe) needs to decide.
    fn probe_length(&self) -> usize;

    /// Signature check over a file prefix. Never fails; returns `false` on short input.
    fn probe(&self, bytes: &[u8]) -> bool;

    fn options(&self) -> &DecodeOptions;

    /// Decodes a complete file held in memory. Relative resource references are resolved
    /// against `base_path`.
    fn load_bytes(&self, bytes: &[u8], base_path: &Path) -> Result<LoadResult>;

    /// Reads `path` (bounded by the configured model size limit) and decodes it.
    fn load(&self, path: &Path, base_path: &Path) -> Result<LoadResult> {
        let buffer = resource::read_model_file(path, self.options().max_model_bytes())?;
        self.load_bytes(buffer.data(), base_path)
    }

    fn claims_extension(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|e| e.eq_ignore_ascii_case(extension))
    }

    fn can(&self, ability: Ability) -> bool {
        self.abilities().contains(&ability)
    }
}
