use encoding_rs::{Encoding, SHIFT_JIS, UTF_16LE, UTF_8};
use modelkit_core::{DecoderBuffer, ModelError, Result};
use tracing::warn;

/// Text encoding declared in a PMX header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEncoding {
    Utf16Le,
    Utf8,
}

impl TextEncoding {
    pub fn from_pmx(code: u8) -> Result<Self> {
        match code {
            0 => Ok(TextEncoding::Utf16Le),
            1 => Ok(TextEncoding::Utf8),
            _ => Err(ModelError::InvalidHeader {
                field: "text encoding",
                value: code as i64,
                allowed: "0 (UTF-16LE), 1 (UTF-8)",
            }),
        }
    }

    fn encoding(self) -> &'static Encoding {
        match self {
            TextEncoding::Utf16Le => UTF_16LE,
            TextEncoding::Utf8 => UTF_8,
        }
    }

    /// Reads an `i32` byte length followed by text in this encoding.
    pub fn read(self, buffer: &mut DecoderBuffer<'_>) -> Result<String> {
        let bytes = buffer.decode_length_prefixed()?;
        Ok(decode_lossy(self.encoding(), bytes))
    }
}

/// Decodes a fixed-width Shift-JIS field, stopping at the first NUL.
pub fn decode_shift_jis_field(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    decode_lossy(SHIFT_JIS, &field[..end])
}

fn decode_lossy(encoding: &'static Encoding, bytes: &[u8]) -> String {
    let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
    if had_errors {
        warn!(encoding = encoding.name(), len = bytes.len(), "malformed text replaced");
    }
    text.into_owned()
}
