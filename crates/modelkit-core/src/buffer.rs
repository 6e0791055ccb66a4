//! Raw byte storage and sub-range descriptors
//!
//! A [`Buffer`] owns a contiguous byte region, either in memory or as a read-only file
//! mapping. A [`BufferView`] names a byte range and stride within one buffer; buffers are
//! shared between views through `Arc`, so a buffer lives as long as its last view.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use memmap2::Mmap;
use tracing::trace;

use crate::error::{ModelError, Result};

/// Backing storage of a [`Buffer`].
pub enum BufferData {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for BufferData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            BufferData::Owned(data) => data,
            BufferData::Mapped(map) => map,
        }
    }
}

impl fmt::Debug for BufferData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferData::Owned(data) => write!(f, "Owned({} bytes)", data.len()),
            BufferData::Mapped(map) => write!(f, "Mapped({} bytes)", map.len()),
        }
    }
}

/// Immutable, optionally named byte region.
#[derive(Debug)]
pub struct Buffer {
    name: Option<String>,
    data: BufferData,
}

impl Buffer {
    pub fn new(name: Option<String>, data: Vec<u8>) -> Self {
        Self {
            name,
            data: BufferData::Owned(data),
        }
    }

    /// Loads `path` into a buffer of exactly `expected_len` bytes.
    ///
    /// The file is mapped read-only when the platform allows it; otherwise it is read in a
    /// single pass that must consume exactly `expected_len` bytes.
    pub fn from_file(name: Option<String>, path: &Path, expected_len: u64) -> io::Result<Self> {
        let mut file = File::open(path)?;

        if expected_len > 0 {
            // SAFETY: the map is read-only and never outlives the buffer that owns it.
            // Concurrent truncation of the file by another process is outside our control,
            // as with any mapped input.
            match unsafe { Mmap::map(&file) } {
                Ok(map) if map.len() as u64 == expected_len => {
                    trace!(path = %path.display(), len = map.len(), "mapped file");
                    return Ok(Self {
                        name,
                        data: BufferData::Mapped(map),
                    });
                }
                Ok(map) => {
                    return Err(io::Error::new(
                        io::ErrorKind::UnexpectedEof,
                        format!("mapped {} bytes, expected {}", map.len(), expected_len),
                    ));
                }
                Err(err) => {
                    trace!(path = %path.display(), error = %err, "mapping failed, reading instead");
                }
            }
        }

        let len = usize::try_from(expected_len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "file too large for memory"))?;
        let mut data = vec![0u8; len];
        file.read_exact(&mut data)?;
        let mut probe = [0u8; 1];
        if file.read(&mut probe)? != 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("file grew past the expected {} bytes", expected_len),
            ));
        }
        Ok(Self::new(name, data))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self.data, BufferData::Mapped(_))
    }
}

/// A byte range and stride inside a [`Buffer`].
#[derive(Debug, Clone)]
pub struct BufferView {
    buffer: Arc<Buffer>,
    byte_offset: usize,
    byte_length: usize,
    byte_stride: usize,
}

impl BufferView {
    /// Creates a view, checking `byte_offset + byte_length <= buffer.len()`.
    ///
    /// A `byte_stride` of 0 means elements are tightly packed.
    pub fn new(
        buffer: Arc<Buffer>,
        byte_offset: usize,
        byte_length: usize,
        byte_stride: usize,
    ) -> Result<Self> {
        let end = byte_offset
            .checked_add(byte_length)
            .ok_or_else(|| ModelError::bounds("buffer view", byte_offset, byte_length, buffer.len()))?;
        if end > buffer.len() {
            return Err(ModelError::bounds(
                "buffer view",
                byte_offset,
                byte_length,
                buffer.len(),
            ));
        }
        Ok(Self {
            buffer,
            byte_offset,
            byte_length,
            byte_stride,
        })
    }

    /// View covering the whole buffer.
    pub fn whole(buffer: Arc<Buffer>) -> Self {
        let byte_length = buffer.len();
        Self {
            buffer,
            byte_offset: 0,
            byte_length,
            byte_stride: 0,
        }
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    /// The bytes covered by this view.
    pub fn bytes(&self) -> &[u8] {
        &self.buffer.data()[self.byte_offset..self.byte_offset + self.byte_length]
    }
}
