//! Protobuf wire format reading and writing.
//!
//! Only the subset of the wire format used by Meshtastic messages is
//! supported:
//!
//! | Wire type | Name             | Used for                                    |
//! |-----------|------------------|---------------------------------------------|
//! | 0         | varint           | int32, uint32, sint32, bool, enum           |
//! | 1         | 64-bit           | skipped (no declared field uses it)         |
//! | 2         | length-delimited | string, bytes, nested messages, packed      |
//! | 5         | 32-bit           | fixed32, sfixed32, float                    |
//!
//! Group wire types (3, 4) and the unassigned types (6, 7) are rejected as
//! structural errors.

use crate::{Message, ProtoError, ProtoResult};

/// Varint wire type.
pub const WIRE_TYPE_VARINT: u8 = 0;
/// 64-bit little-endian wire type.
pub const WIRE_TYPE_64BIT: u8 = 1;
/// Length-delimited wire type.
pub const WIRE_TYPE_LENGTH_DELIMITED: u8 = 2;
/// 32-bit little-endian wire type.
pub const WIRE_TYPE_32BIT: u8 = 5;

/// Largest field number protobuf allows.
pub const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// A varint never takes more than ten bytes.
const MAX_VARINT_LEN: usize = 10;

// ============================================================================
// Field Values
// ============================================================================

/// A single field value as it appeared on the wire.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WireValue<'a> {
    /// Wire type 0.
    Varint(u64),
    /// Wire type 1.
    Fixed64(u64),
    /// Wire type 2.
    LengthDelimited(&'a [u8]),
    /// Wire type 5.
    Fixed32(u32),
}

impl<'a> WireValue<'a> {
    /// The wire type this value was encoded with.
    pub fn wire_type(&self) -> u8 {
        match self {
            WireValue::Varint(_) => WIRE_TYPE_VARINT,
            WireValue::Fixed64(_) => WIRE_TYPE_64BIT,
            WireValue::LengthDelimited(_) => WIRE_TYPE_LENGTH_DELIMITED,
            WireValue::Fixed32(_) => WIRE_TYPE_32BIT,
        }
    }

    /// Raw varint value, `None` for any other wire type.
    pub fn as_varint(&self) -> Option<u64> {
        match self {
            WireValue::Varint(v) => Some(*v),
            _ => None,
        }
    }

    /// `uint32` (upper bits truncated, as protobuf does).
    pub fn as_uint32(&self) -> Option<u32> {
        self.as_varint().map(|v| v as u32)
    }

    /// `int32` and enum values. Negative values arrive sign-extended to 64 bits.
    pub fn as_int32(&self) -> Option<i32> {
        self.as_varint().map(|v| v as i32)
    }

    /// Zigzag-encoded `sint32`.
    pub fn as_sint32(&self) -> Option<i32> {
        self.as_varint().map(|v| {
            let v = v as u32;
            ((v >> 1) as i32) ^ -((v & 1) as i32)
        })
    }

    /// `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        self.as_varint().map(|v| v != 0)
    }

    /// `fixed32`.
    pub fn as_fixed32(&self) -> Option<u32> {
        match self {
            WireValue::Fixed32(v) => Some(*v),
            _ => None,
        }
    }

    /// `sfixed32`.
    pub fn as_sfixed32(&self) -> Option<i32> {
        self.as_fixed32().map(|v| v as i32)
    }

    /// `float`.
    pub fn as_float(&self) -> Option<f32> {
        self.as_fixed32().map(f32::from_bits)
    }

    /// `bytes`, `string` or nested message payload.
    pub fn as_bytes(&self) -> Option<&'a [u8]> {
        match self {
            WireValue::LengthDelimited(b) => Some(b),
            _ => None,
        }
    }
}

/// Decode a `string` payload, naming the field on failure.
pub fn utf8(bytes: &[u8], field: &str) -> ProtoResult<String> {
    String::from_utf8(bytes.to_vec()).map_err(|_| ProtoError::InvalidUtf8(field.to_string()))
}

/// Append a repeated `uint32` occurrence, accepting packed and unpacked forms.
///
/// Values with any other wire type are ignored like any mismatched field.
pub fn push_repeated_uint32(value: WireValue<'_>, out: &mut Vec<u32>) -> ProtoResult<()> {
    match value {
        WireValue::Varint(v) => out.push(v as u32),
        WireValue::LengthDelimited(packed) => {
            let mut reader = WireReader::new(packed);
            while reader.has_more() {
                out.push(reader.read_varint()? as u32);
            }
        }
        _ => {}
    }
    Ok(())
}

// ============================================================================
// Reader
// ============================================================================

/// Sequential reader over the fields of one message.
#[derive(Debug, Clone)]
pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    /// Create a reader over a message body.
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    /// Current byte offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Whether unread bytes remain.
    pub fn has_more(&self) -> bool {
        self.pos < self.data.len()
    }

    /// Read a base-128 varint.
    pub fn read_varint(&mut self) -> ProtoResult<u64> {
        let start = self.pos;
        let mut result: u64 = 0;

        for i in 0..MAX_VARINT_LEN {
            let byte = *self
                .data
                .get(self.pos)
                .ok_or_else(|| ProtoError::truncated(self.pos, "varint"))?;
            self.pos += 1;

            result |= u64::from(byte & 0x7F) << (7 * i);

            if byte & 0x80 == 0 {
                return Ok(result);
            }
        }

        Err(ProtoError::VarintOverflow { offset: start })
    }

    fn take(&mut self, len: usize, what: &str) -> ProtoResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                ProtoError::truncated(
                    self.pos,
                    format!(
                        "{} needs {} bytes, {} available",
                        what,
                        len,
                        self.data.len() - self.pos
                    ),
                )
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    /// Read the next field, or `None` at the end of the message.
    pub fn next_field(&mut self) -> ProtoResult<Option<(u32, WireValue<'a>)>> {
        if !self.has_more() {
            return Ok(None);
        }

        let offset = self.pos;
        let tag = self.read_varint()?;
        let field = tag >> 3;
        let wire_type = (tag & 0x07) as u8;

        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(ProtoError::InvalidFieldNumber { offset, field });
        }

        let value = match wire_type {
            WIRE_TYPE_VARINT => WireValue::Varint(self.read_varint()?),
            WIRE_TYPE_64BIT => {
                let mut buf = [0u8; 8];
                buf.copy_from_slice(self.take(8, "64-bit field")?);
                WireValue::Fixed64(u64::from_le_bytes(buf))
            }
            WIRE_TYPE_LENGTH_DELIMITED => {
                let len_offset = self.pos;
                let len = self.read_varint()?;
                let len = usize::try_from(len).map_err(|_| {
                    ProtoError::truncated(len_offset, format!("length {} exceeds buffer", len))
                })?;
                WireValue::LengthDelimited(self.take(len, "length-delimited field")?)
            }
            WIRE_TYPE_32BIT => {
                let mut buf = [0u8; 4];
                buf.copy_from_slice(self.take(4, "32-bit field")?);
                WireValue::Fixed32(u32::from_le_bytes(buf))
            }
            _ => return Err(ProtoError::InvalidWireType { offset, wire_type }),
        };

        Ok(Some((field as u32, value)))
    }
}

// ============================================================================
// Writer
// ============================================================================

/// Builder for one message body.
///
/// Every field method takes an `Option`: `None` writes nothing, `Some` writes
/// the field even when it holds the type's default value.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    /// Create an empty writer.
    pub fn new() -> Self {
        WireWriter { buf: Vec::new() }
    }

    /// Consume the writer and return the encoded bytes.
    pub fn finish(self) -> Vec<u8> {
        self.buf
    }

    /// Write a raw base-128 varint.
    pub fn write_varint(&mut self, value: u64) {
        let mut v = value;
        loop {
            let byte = (v & 0x7F) as u8;
            v >>= 7;
            if v == 0 {
                self.buf.push(byte);
                return;
            }
            self.buf.push(byte | 0x80);
        }
    }

    /// Write a field tag.
    pub fn write_tag(&mut self, field: u32, wire_type: u8) {
        self.write_varint((u64::from(field) << 3) | u64::from(wire_type));
    }

    /// `uint32` field.
    pub fn uint32(&mut self, field: u32, value: Option<u32>) {
        if let Some(v) = value {
            self.write_tag(field, WIRE_TYPE_VARINT);
            self.write_varint(u64::from(v));
        }
    }

    /// `int32` field; negative values are sign-extended to ten bytes.
    pub fn int32(&mut self, field: u32, value: Option<i32>) {
        if let Some(v) = value {
            self.write_tag(field, WIRE_TYPE_VARINT);
            self.write_varint(i64::from(v) as u64);
        }
    }

    /// Enum field (encoded like `int32`).
    pub fn enumeration(&mut self, field: u32, value: Option<i32>) {
        self.int32(field, value);
    }

    /// Zigzag `sint32` field.
    pub fn sint32(&mut self, field: u32, value: Option<i32>) {
        if let Some(v) = value {
            self.write_tag(field, WIRE_TYPE_VARINT);
            self.write_varint(u64::from(((v << 1) ^ (v >> 31)) as u32));
        }
    }

    /// `bool` field.
    pub fn boolean(&mut self, field: u32, value: Option<bool>) {
        if let Some(v) = value {
            self.write_tag(field, WIRE_TYPE_VARINT);
            self.buf.push(u8::from(v));
        }
    }

    /// `fixed32` field.
    pub fn fixed32(&mut self, field: u32, value: Option<u32>) {
        if let Some(v) = value {
            self.write_tag(field, WIRE_TYPE_32BIT);
            self.buf.extend_from_slice(&v.to_le_bytes());
        }
    }

    /// `sfixed32` field.
    pub fn sfixed32(&mut self, field: u32, value: Option<i32>) {
        self.fixed32(field, value.map(|v| v as u32));
    }

    /// `float` field.
    pub fn float(&mut self, field: u32, value: Option<f32>) {
        self.fixed32(field, value.map(f32::to_bits));
    }

    /// `bytes` field.
    pub fn bytes(&mut self, field: u32, value: Option<&[u8]>) {
        if let Some(data) = value {
            self.write_tag(field, WIRE_TYPE_LENGTH_DELIMITED);
            self.write_varint(data.len() as u64);
            self.buf.extend_from_slice(data);
        }
    }

    /// `string` field.
    pub fn string(&mut self, field: u32, value: Option<&str>) {
        self.bytes(field, value.map(str::as_bytes));
    }

    /// Nested message field.
    pub fn message<M: Message>(&mut self, field: u32, value: Option<&M>) {
        if let Some(msg) = value {
            let body = msg.encode();
            self.bytes(field, Some(&body));
        }
    }

    /// Repeated nested message field, one occurrence per element.
    pub fn repeated_message<M: Message>(&mut self, field: u32, values: &[M]) {
        for msg in values {
            self.message(field, Some(msg));
        }
    }

    /// Packed repeated `uint32` field; nothing is written for an empty list.
    pub fn packed_uint32(&mut self, field: u32, values: &[u32]) {
        if values.is_empty() {
            return;
        }
        let mut packed = WireWriter::new();
        for &v in values {
            packed.write_varint(u64::from(v));
        }
        self.bytes(field, Some(&packed.finish()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varint_encoding() {
        let mut w = WireWriter::new();
        w.write_varint(300);
        assert_eq!(w.finish(), vec![0xAC, 0x02]);
    }

    #[test]
    fn test_varint_decoding() {
        let mut r = WireReader::new(&[0xAC, 0x02]);
        assert_eq!(r.read_varint().unwrap(), 300);
        assert!(!r.has_more());
    }

    #[test]
    fn test_negative_int32_is_ten_bytes() {
        let mut w = WireWriter::new();
        w.int32(1, Some(-1));
        let bytes = w.finish();
        assert_eq!(bytes.len(), 11);

        let mut r = WireReader::new(&bytes);
        let (field, value) = r.next_field().unwrap().unwrap();
        assert_eq!(field, 1);
        assert_eq!(value.as_int32(), Some(-1));
    }

    #[test]
    fn test_sint32_zigzag() {
        let mut w = WireWriter::new();
        w.sint32(9, Some(-3));
        let bytes = w.finish();
        assert_eq!(bytes, vec![0x48, 0x05]);

        let mut r = WireReader::new(&bytes);
        let (_, value) = r.next_field().unwrap().unwrap();
        assert_eq!(value.as_sint32(), Some(-3));
    }

    #[test]
    fn test_explicit_default_is_written() {
        let mut w = WireWriter::new();
        w.int32(1, Some(0));
        w.boolean(2, None);
        assert_eq!(w.finish(), vec![0x08, 0x00]);
    }

    #[test]
    fn test_fixed_and_float_fields() {
        let mut w = WireWriter::new();
        w.fixed32(1, Some(0xDEADBEEF));
        w.float(2, Some(1.5));
        let bytes = w.finish();

        let mut r = WireReader::new(&bytes);
        let (_, a) = r.next_field().unwrap().unwrap();
        let (_, b) = r.next_field().unwrap().unwrap();
        assert_eq!(a.as_fixed32(), Some(0xDEADBEEF));
        assert_eq!(b.as_float(), Some(1.5));
        assert_eq!(b.as_varint(), None);
        assert!(r.next_field().unwrap().is_none());
    }

    #[test]
    fn test_field_number_zero_rejected() {
        let mut r = WireReader::new(&[0x00, 0x01]);
        assert!(matches!(
            r.next_field(),
            Err(ProtoError::InvalidFieldNumber { offset: 0, field: 0 })
        ));
    }

    #[test]
    fn test_group_wire_type_rejected() {
        let mut r = WireReader::new(&[0x0B]);
        assert!(matches!(
            r.next_field(),
            Err(ProtoError::InvalidWireType { wire_type: 3, .. })
        ));
    }

    #[test]
    fn test_truncated_length_delimited() {
        let mut r = WireReader::new(&[0x0A, 0x05, 0x01, 0x02]);
        assert!(matches!(r.next_field(), Err(ProtoError::Truncated { offset: 2, .. })));
    }

    #[test]
    fn test_truncated_varint() {
        let mut r = WireReader::new(&[0x08, 0x80]);
        assert!(matches!(r.next_field(), Err(ProtoError::Truncated { .. })));
    }

    #[test]
    fn test_varint_overflow() {
        let data = [0xFF; 11];
        let mut r = WireReader::new(&data);
        assert_eq!(
            r.read_varint(),
            Err(ProtoError::VarintOverflow { offset: 0 })
        );
    }

    #[test]
    fn test_packed_and_unpacked_repeated() {
        let mut w = WireWriter::new();
        w.packed_uint32(103, &[1, 300]);
        w.uint32(103, Some(7));
        let bytes = w.finish();

        let mut out = Vec::new();
        let mut r = WireReader::new(&bytes);
        while let Some((field, value)) = r.next_field().unwrap() {
            assert_eq!(field, 103);
            push_repeated_uint32(value, &mut out).unwrap();
        }
        assert_eq!(out, vec![1, 300, 7]);
    }

    #[test]
    fn test_utf8_error_names_field() {
        let err = utf8(&[0xFF, 0xFE], "User.long_name").unwrap_err();
        assert!(err.to_string().contains("User.long_name"));
    }
}
