//! Structured-field framing.
//!
//! Every field is `0x5A | length:u16 | id:[u8; 3] | flags:u8 | seq:u16 |
//! payload`, big-endian, where `length` counts everything after the `0x5A`
//! introducer.

use quire_render_core::RenderError;
use std::io::Write;

pub const INTRODUCER: u8 = 0x5A;
const HEADER_LEN: usize = 8;
/// Largest payload that fits the 16-bit length.
pub const MAX_PAYLOAD: usize = u16::MAX as usize - HEADER_LEN;

pub type FieldId = [u8; 3];

pub const BEGIN_DOCUMENT: FieldId = [0xD3, 0xA8, 0xA8];
pub const END_DOCUMENT: FieldId = [0xD3, 0xA9, 0xA8];
pub const BEGIN_PAGE: FieldId = [0xD3, 0xA8, 0xAF];
pub const END_PAGE: FieldId = [0xD3, 0xA9, 0xAF];
pub const PAGE_DESCRIPTOR: FieldId = [0xD3, 0xA6, 0xAF];
pub const PRESENTATION_TEXT: FieldId = [0xD3, 0xEE, 0x9B];
pub const BEGIN_IMAGE: FieldId = [0xD3, 0xA8, 0xFB];
pub const END_IMAGE: FieldId = [0xD3, 0xA9, 0xFB];
pub const IMAGE_DATA_DESCRIPTOR: FieldId = [0xD3, 0xA6, 0xFB];
pub const IMAGE_PICTURE_DATA: FieldId = [0xD3, 0xEE, 0xFB];
pub const OBJECT_AREA_DESCRIPTOR: FieldId = [0xD3, 0xA6, 0x6B];
pub const OBJECT_AREA_POSITION: FieldId = [0xD3, 0xAC, 0x6B];
pub const NO_OPERATION: FieldId = [0xD3, 0xEE, 0xEE];

/// Writes fields with a running sequence number.
#[derive(Debug)]
pub struct FieldWriter<W> {
    inner: W,
    seq: u16,
}

impl<W: Write> FieldWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, seq: 0 }
    }

    pub fn write_field(&mut self, id: FieldId, payload: &[u8]) -> Result<(), RenderError> {
        if payload.len() > MAX_PAYLOAD {
            return Err(RenderError::Other(format!(
                "structured field payload of {} bytes exceeds {}",
                payload.len(),
                MAX_PAYLOAD
            )));
        }
        self.seq = self.seq.wrapping_add(1);
        let len = (HEADER_LEN + payload.len()) as u16;
        let mut header = [0u8; 1 + HEADER_LEN];
        header[0] = INTRODUCER;
        header[1..3].copy_from_slice(&len.to_be_bytes());
        header[3..6].copy_from_slice(&id);
        header[6] = 0;
        header[7..9].copy_from_slice(&self.seq.to_be_bytes());
        self.inner.write_all(&header)?;
        self.inner.write_all(payload)?;
        Ok(())
    }

    /// Writes `data` as consecutive fields of at most `chunk` bytes each.
    pub fn write_chunked(
        &mut self,
        id: FieldId,
        data: &[u8],
        chunk: usize,
    ) -> Result<(), RenderError> {
        for part in data.chunks(chunk.clamp(1, MAX_PAYLOAD)) {
            self.write_field(id, part)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), RenderError> {
        self.inner.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

/// A parsed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub id: FieldId,
    pub flags: u8,
    pub seq: u16,
    pub payload: Vec<u8>,
}

/// Splits a byte stream back into fields.
pub fn read_fields(mut bytes: &[u8]) -> Result<Vec<Field>, RenderError> {
    let mut fields = Vec::new();
    while !bytes.is_empty() {
        if bytes[0] != INTRODUCER || bytes.len() < 1 + HEADER_LEN {
            return Err(RenderError::Other(format!(
                "malformed structured field after {} fields",
                fields.len()
            )));
        }
        let len = u16::from_be_bytes([bytes[1], bytes[2]]) as usize;
        if len < HEADER_LEN || bytes.len() < 1 + len {
            return Err(RenderError::Other(format!(
                "truncated structured field after {} fields",
                fields.len()
            )));
        }
        fields.push(Field {
            id: [bytes[3], bytes[4], bytes[5]],
            flags: bytes[6],
            seq: u16::from_be_bytes([bytes[7], bytes[8]]),
            payload: bytes[1 + HEADER_LEN..1 + len].to_vec(),
        });
        bytes = &bytes[1 + len..];
    }
    Ok(fields)
}

/// Points to 1/1440 inch units.
pub(crate) fn lunits(points: f32) -> u16 {
    (points * 20.0).round().clamp(0.0, u16::MAX as f32) as u16
}
