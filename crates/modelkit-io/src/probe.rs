//! Format detection and dispatch.
//!
//! [`DecoderRegistry`] holds decoders in registration order. Detection reads the longest
//! probe length any decoder needs and picks the first decoder whose probe accepts the prefix.

use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use modelkit_core::{DecodeOptions, ModelError, Result};
use tracing::debug;

use crate::gltf_reader::GltfDecoder;
use crate::pmx_reader::PmxDecoder;
use crate::resource;
use crate::traits::{LoadResult, ModelDecoder};
use crate::vmd_reader::VmdDecoder;

/// Ordered set of decoders.
pub struct DecoderRegistry {
    decoders: Vec<Box<dyn ModelDecoder>>,
}

impl DecoderRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            decoders: Vec::new(),
        }
    }

    /// Creates a registry with the built-in decoders (glTF, PMX, VMD), all sharing `options`.
    pub fn with_options(options: DecodeOptions) -> Self {
        Self::new()
            .with_decoder(GltfDecoder::with_options(options.clone()))
            .with_decoder(PmxDecoder::with_options(options.clone()))
            .with_decoder(VmdDecoder::with_options(options))
    }

    pub fn register(&mut self, decoder: impl ModelDecoder + 'static) {
        self.decoders.push(Box::new(decoder));
    }

    pub fn with_decoder(mut self, decoder: impl ModelDecoder + 'static) -> Self {
        self.register(decoder);
        self
    }

    pub fn decoders(&self) -> impl Iterator<Item = &dyn ModelDecoder> + '_ {
        self.decoders.iter().map(|d| d.as_ref())
    }

    /// Longest prefix any registered decoder needs.
    pub fn probe_length(&self) -> usize {
        self.decoders
            .iter()
            .map(|d| d.probe_length())
            .max()
            .unwrap_or(0)
    }

    /// First decoder whose probe accepts `prefix`.
    pub fn probe_bytes(&self, prefix: &[u8]) -> Option<&dyn ModelDecoder> {
        self.decoders().find(|d| d.probe(prefix))
    }

    /// First decoder claiming `extension` (case-insensitive, without the dot).
    pub fn find_by_extension(&self, extension: &str) -> Option<&dyn ModelDecoder> {
        self.decoders().find(|d| d.claims_extension(extension))
    }

    /// Sniffs a stream. The stream position is restored before returning, including when no
    /// decoder matches.
    pub fn detect<R: Read + Seek>(&self, reader: &mut R) -> Result<Option<&dyn ModelDecoder>> {
        let start = reader.stream_position()?;
        let mut prefix = Vec::with_capacity(self.probe_length());
        reader
            .by_ref()
            .take(self.probe_length() as u64)
            .read_to_end(&mut prefix)?;
        reader.seek(SeekFrom::Start(start))?;
        Ok(self.probe_bytes(&prefix))
    }

    /// Reads `path`, picks a decoder by content and decodes it. Relative references resolve
    /// against the directory containing `path`.
    pub fn load_path(&self, path: &Path) -> Result<LoadResult> {
        let limit = self
            .decoders
            .iter()
            .map(|d| d.options().max_model_bytes())
            .max()
            .unwrap_or(DecodeOptions::default().max_model_bytes());
        let buffer = resource::read_model_file(path, limit)?;
        let decoder = self
            .probe_bytes(buffer.data())
            .ok_or_else(|| ModelError::UnrecognizedFormat {
                path: Some(path.to_path_buf()),
            })?;
        let size = buffer.len() as u64;
        let decoder_limit = decoder.options().max_model_bytes();
        if size > decoder_limit {
            return Err(ModelError::FileTooLarge {
                path: path.to_path_buf(),
                size,
                limit: decoder_limit,
            });
        }
        debug!(path = %path.display(), decoder = decoder.name(), "dispatching");
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        decoder.load_bytes(buffer.data(), base)
    }

    /// Picks a decoder by content and decodes `bytes`.
    pub fn load_bytes(&self, bytes: &[u8], base_path: &Path) -> Result<LoadResult> {
        let decoder = self
            .probe_bytes(bytes)
            .ok_or(ModelError::UnrecognizedFormat { path: None })?;
        debug!(decoder = decoder.name(), len = bytes.len(), "dispatching");
        decoder.load_bytes(bytes, base_path)
    }
}

impl Default for DecoderRegistry {
    /// The built-in decoders with default options.
    fn default() -> Self {
        Self::with_options(DecodeOptions::default())
    }
}
