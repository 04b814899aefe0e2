//! The [`Message`] trait shared by every schema in this crate.

use crate::wire::{WireReader, WireValue, WireWriter};
use crate::{Fields, ProtoResult};

/// A protobuf message with explicit field presence.
///
/// Implementors only describe how one field is merged, how fields are
/// written and how the message renders as a field mapping; framing is
/// provided here.
pub trait Message: Default + PartialEq + Sized {
    /// Short protobuf type name, used in diagnostics.
    const NAME: &'static str;

    /// Merge one field occurrence into `self`.
    ///
    /// Unknown field numbers and known fields arriving with an unexpected
    /// wire type are ignored.
    fn merge_field(&mut self, field: u32, value: WireValue<'_>) -> ProtoResult<()>;

    /// Write every present field.
    fn encode_fields(&self, writer: &mut WireWriter);

    /// Render present fields as a name → value mapping.
    fn to_fields(&self) -> Fields;

    /// Merge a serialized message into `self`, protobuf style.
    fn merge(&mut self, data: &[u8]) -> ProtoResult<()> {
        let mut reader = WireReader::new(data);
        while let Some((field, value)) = reader.next_field()? {
            self.merge_field(field, value)?;
        }
        Ok(())
    }

    /// Parse a serialized message.
    fn decode(data: &[u8]) -> ProtoResult<Self> {
        let mut msg = Self::default();
        msg.merge(data)?;
        Ok(msg)
    }

    /// Serialize the message.
    fn encode(&self) -> Vec<u8> {
        let mut writer = WireWriter::new();
        self.encode_fields(&mut writer);
        writer.finish()
    }

    /// Whether no field is present.
    fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Merge a nested message occurrence into an optional slot.
///
/// Values that are not length-delimited are ignored.
pub(crate) fn merge_nested<M: Message>(
    slot: &mut Option<M>,
    value: WireValue<'_>,
) -> ProtoResult<()> {
    if let Some(bytes) = value.as_bytes() {
        slot.get_or_insert_with(M::default).merge(bytes)?;
    }
    Ok(())
}

/// Overwrite `slot` only when the wire value had the expected type.
pub(crate) fn set_if<T>(slot: &mut Option<T>, parsed: Option<T>) {
    if parsed.is_some() {
        *slot = parsed;
    }
}
