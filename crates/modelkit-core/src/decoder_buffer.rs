use byteorder::{ByteOrder, LittleEndian};
use glam::{Quat, Vec2, Vec3, Vec4};

use crate::error::{ModelError, Result};

/// Little-endian read cursor over a byte slice.
///
/// Every read checks the remaining length first and fails with [`ModelError::Bounds`]
/// naming the buffer's label, so a truncated file reports where it ran out.
///
/// # Example
///
/// ```ignore
/// use modelkit_core::DecoderBuffer;
///
/// let data = [0x50, 0x4D, 0x58, 0x20, 0x00, 0x00, 0x00, 0x40];
/// let mut buffer = DecoderBuffer::new(&data, "pmx header");
///
/// assert_eq!(buffer.decode_slice(4).unwrap(), b"PMX ");
/// assert_eq!(buffer.decode_f32().unwrap(), 2.0);
/// assert_eq!(buffer.remaining_size(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct DecoderBuffer<'a> {
    data: &'a [u8],
    pos: usize,
    label: &'static str,
}

impl<'a> DecoderBuffer<'a> {
    /// Creates a cursor at the start of `data`. `label` names the input in bounds errors.
    pub fn new(data: &'a [u8], label: &'static str) -> Self {
        Self { data, pos: 0, label }
    }

    /// Returns the current read position in bytes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Sets the read position.
    pub fn set_position(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(ModelError::bounds(self.label, pos, 0, self.data.len()));
        }
        self.pos = pos;
        Ok(())
    }

    /// Returns the number of bytes remaining in the buffer.
    pub fn remaining_size(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns a slice of the remaining data without advancing.
    pub fn remaining_data(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Decodes and returns a slice of the specified size.
    pub fn decode_slice(&mut self, size: usize) -> Result<&'a [u8]> {
        match self.pos.checked_add(size) {
            Some(end) if end <= self.data.len() => {
                let slice = &self.data[self.pos..end];
                self.pos = end;
                Ok(slice)
            }
            _ => Err(ModelError::bounds(self.label, self.pos, size, self.data.len())),
        }
    }

    /// Advances the position by `n` bytes without reading.
    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.decode_slice(n).map(|_| ())
    }

    /// Decodes bytes into the provided buffer.
    pub fn decode_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        let slice = self.decode_slice(out.len())?;
        out.copy_from_slice(slice);
        Ok(())
    }

    pub fn decode_u8(&mut self) -> Result<u8> {
        Ok(self.decode_slice(1)?[0])
    }

    pub fn decode_i8(&mut self) -> Result<i8> {
        Ok(self.decode_u8()? as i8)
    }

    pub fn decode_u16(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(self.decode_slice(2)?))
    }

    pub fn decode_i16(&mut self) -> Result<i16> {
        Ok(LittleEndian::read_i16(self.decode_slice(2)?))
    }

    pub fn decode_u32(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.decode_slice(4)?))
    }

    pub fn decode_i32(&mut self) -> Result<i32> {
        Ok(LittleEndian::read_i32(self.decode_slice(4)?))
    }

    pub fn decode_f32(&mut self) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.decode_slice(4)?))
    }

    pub fn decode_vec2(&mut self) -> Result<Vec2> {
        let mut v = [0f32; 2];
        LittleEndian::read_f32_into(self.decode_slice(8)?, &mut v);
        Ok(Vec2::from_array(v))
    }

    pub fn decode_vec3(&mut self) -> Result<Vec3> {
        let mut v = [0f32; 3];
        LittleEndian::read_f32_into(self.decode_slice(12)?, &mut v);
        Ok(Vec3::from_array(v))
    }

    pub fn decode_vec4(&mut self) -> Result<Vec4> {
        let mut v = [0f32; 4];
        LittleEndian::read_f32_into(self.decode_slice(16)?, &mut v);
        Ok(Vec4::from_array(v))
    }

    /// Decodes a quaternion stored as x, y, z, w.
    pub fn decode_quat(&mut self) -> Result<Quat> {
        Ok(Quat::from_vec4(self.decode_vec4()?))
    }

    /// Decodes an unsigned integer of 1, 2 or 4 bytes.
    pub fn decode_sized_u32(&mut self, width: usize) -> Result<u32> {
        match width {
            1 => Ok(self.decode_u8()? as u32),
            2 => Ok(self.decode_u16()? as u32),
            4 => self.decode_u32(),
            _ => Err(ModelError::InvalidHeader {
                field: "index width",
                value: width as i64,
                allowed: "1, 2, 4",
            }),
        }
    }

    /// Decodes a sign-extended integer of 1, 2 or 4 bytes.
    pub fn decode_sized_i32(&mut self, width: usize) -> Result<i32> {
        match width {
            1 => Ok(self.decode_i8()? as i32),
            2 => Ok(self.decode_i16()? as i32),
            4 => self.decode_i32(),
            _ => Err(ModelError::InvalidHeader {
                field: "index width",
                value: width as i64,
                allowed: "1, 2, 4",
            }),
        }
    }

    /// Decodes an `i32` byte length followed by that many bytes.
    pub fn decode_length_prefixed(&mut self) -> Result<&'a [u8]> {
        let len = self.decode_i32()?;
        if len < 0 {
            return Err(ModelError::Structural(format!(
                "{}: negative length {} at offset {}",
                self.label,
                len,
                self.pos - 4
            )));
        }
        self.decode_slice(len as usize)
    }

    /// Decodes an `i32` element count, rejecting negative values.
    pub fn decode_count(&mut self, what: &str) -> Result<usize> {
        let count = self.decode_i32()?;
        usize::try_from(count)
            .map_err(|_| ModelError::Structural(format!("negative {} count {}", what, count)))
    }
}
