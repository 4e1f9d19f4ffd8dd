//! The message decoder: reads tags, dispatches scalar/packed decoding,
//! installs values, and recurses into sub-messages.

use log::{trace, warn};

use crate::error::DecodeError;
use crate::merge::merge_submessage;
use crate::schema::{FieldDescriptor, FieldType, MessageDef, Occurrence, Schema};
use crate::value::{logical_type_name, Message, Value};
use crate::varint::{decode_varint, decode_zigzag};
use crate::wire::{decode_tag, skip_field};

/// Decodes a complete serialized message (no external length framing)
/// against the schema entry `(msg, msg_name)`.
///
/// Wire-format errors (truncation, unsupported wire types, invalid UTF-8,
/// unknown enumerators) are surfaced to the caller; unknown field numbers
/// are silently skipped.
pub fn decode_msg(bytes: &[u8], msg_name: &str, schema: &Schema) -> Result<Message, DecodeError> {
    let def = schema.message(msg_name)?;
    decode_message(bytes, def, schema)
}

/// Decodes `bytes` as an instance of `def`. Used both for the top-level
/// call and, recursively, for sub-message fields — each invocation finalizes
/// its own result, so there is no separate top-level-only finalization pass.
pub(crate) fn decode_message(
    bytes: &[u8],
    def: &MessageDef,
    schema: &Schema,
) -> Result<Message, DecodeError> {
    let mut msg = Message::empty(def, schema);
    let mut offset = 0usize;

    while offset < bytes.len() {
        let tag = decode_tag(bytes, offset)?;
        offset = tag.offset;

        match def.field_by_fnum(tag.fnum) {
            None => {
                warn!(
                    "skipping unknown field {} (wire type {}) in message `{}`",
                    tag.fnum, tag.wire_code, def.name
                );
                offset = skip_field(bytes, tag.fnum, tag.wire_code, offset)?;
            }
            Some(field) => {
                if tag.wire_type.is_none() {
                    return Err(DecodeError::UnsupportedWireType {
                        fnum: tag.fnum,
                        wire_type: tag.wire_code,
                        offset,
                    });
                }
                trace!(
                    "decoding field `{}` ({}) of message `{}`",
                    field.name,
                    logical_type_name(&field.field_type),
                    def.name
                );
                offset = install_field(&mut msg, field, bytes, offset, tag.wire_code, schema)?;
            }
        }
    }

    Ok(msg)
}

fn install_field(
    msg: &mut Message,
    field: &FieldDescriptor,
    bytes: &[u8],
    offset: usize,
    wire_code: u8,
    schema: &Schema,
) -> Result<usize, DecodeError> {
    if field.occurrence == Occurrence::Repeated && field.packed && wire_code == 2 {
        let (values, next) = decode_packed(bytes, offset, &field.field_type, schema)?;
        msg.extend_repeated(field.slot, values);
        return Ok(next);
    }

    let (value, next) = decode_scalar(bytes, offset, &field.field_type, schema)?;

    match field.occurrence {
        Occurrence::Repeated => msg.push_repeated(field.slot, value),
        Occurrence::Required | Occurrence::Optional => match &field.field_type {
            FieldType::Msg(name) => {
                let merged = merge_submessage(name, msg.get(field.slot), &value, schema)?;
                msg.set(field.slot, merged);
            }
            _ => msg.set(field.slot, value),
        },
    }
    Ok(next)
}

/// Decodes one primitive/enum/string/bytes/sub-message value of
/// `field_type` starting at `offset`. Does not look at the wire type that
/// accompanied the tag: the framing is entirely determined by the
/// descriptor's declared logical type, which is what lets the decoder
/// tolerate wire-type mismatches rather than rejecting them.
fn decode_scalar(
    bytes: &[u8],
    offset: usize,
    field_type: &FieldType,
    schema: &Schema,
) -> Result<(Value, usize), DecodeError> {
    match field_type {
        FieldType::SInt32 | FieldType::SInt64 => {
            let (raw, next) = decode_varint(bytes, offset)?;
            Ok((Value::Int64(decode_zigzag(raw)), next))
        }
        FieldType::Int32 | FieldType::Int64 => {
            let (raw, next) = decode_varint(bytes, offset)?;
            Ok((Value::Int64(raw as i64), next))
        }
        FieldType::UInt32 | FieldType::UInt64 => {
            let (raw, next) = decode_varint(bytes, offset)?;
            Ok((Value::UInt64(raw), next))
        }
        FieldType::Bool => {
            let (raw, next) = decode_varint(bytes, offset)?;
            Ok((Value::Bool(raw != 0), next))
        }
        FieldType::Enum(name) => {
            let (raw, next) = decode_varint(bytes, offset)?;
            let enum_def = schema.enum_def(name)?;
            let symbol = enum_def.symbol_for(raw as i64)?;
            Ok((Value::Enum(symbol.to_string()), next))
        }
        FieldType::Fixed32 => {
            let raw = read_fixed::<4>(bytes, offset)?;
            Ok((Value::UInt64(u32::from_le_bytes(raw) as u64), offset + 4))
        }
        FieldType::SFixed32 => {
            let raw = read_fixed::<4>(bytes, offset)?;
            Ok((Value::Int64(i32::from_le_bytes(raw) as i64), offset + 4))
        }
        FieldType::Float => {
            let raw = read_fixed::<4>(bytes, offset)?;
            Ok((Value::F32(f32::from_le_bytes(raw)), offset + 4))
        }
        FieldType::Fixed64 => {
            let raw = read_fixed::<8>(bytes, offset)?;
            Ok((Value::UInt64(u64::from_le_bytes(raw)), offset + 8))
        }
        FieldType::SFixed64 => {
            let raw = read_fixed::<8>(bytes, offset)?;
            Ok((Value::Int64(i64::from_le_bytes(raw)), offset + 8))
        }
        FieldType::Double => {
            let raw = read_fixed::<8>(bytes, offset)?;
            Ok((Value::F64(f64::from_le_bytes(raw)), offset + 8))
        }
        FieldType::String => {
            let (start, end) = read_length_delimited(bytes, offset)?;
            let s = std::str::from_utf8(&bytes[start..end])
                .map_err(|_| DecodeError::InvalidUtf8 { offset: start })?;
            Ok((Value::Str(s.to_string()), end))
        }
        FieldType::Bytes => {
            let (start, end) = read_length_delimited(bytes, offset)?;
            Ok((Value::Bytes(bytes[start..end].to_vec()), end))
        }
        FieldType::Msg(name) => {
            let (start, end) = read_length_delimited(bytes, offset)?;
            let sub_def = schema.message(name)?;
            let sub_msg = decode_message(&bytes[start..end], sub_def, schema)?;
            Ok((Value::Msg(sub_msg), end))
        }
    }
}

/// Interprets a single length-delimited frame as a concatenation of
/// primitive values of `field_type`. The frame must end exactly on a value
/// boundary.
fn decode_packed(
    bytes: &[u8],
    offset: usize,
    field_type: &FieldType,
    schema: &Schema,
) -> Result<(Vec<Value>, usize), DecodeError> {
    let (start, end) = read_length_delimited(bytes, offset)?;
    let bounded = &bytes[..end];

    let mut values = Vec::new();
    let mut pos = start;
    while pos < end {
        let (value, next) = decode_scalar(bounded, pos, field_type, schema)?;
        values.push(value);
        pos = next;
    }
    if pos != end {
        return Err(DecodeError::Truncated { offset: pos });
    }
    Ok((values, end))
}

fn read_length_delimited(bytes: &[u8], offset: usize) -> Result<(usize, usize), DecodeError> {
    let (len, start) = decode_varint(bytes, offset)?;
    let end = start + len as usize;
    if end > bytes.len() {
        return Err(DecodeError::Truncated { offset: start });
    }
    Ok((start, end))
}

fn read_fixed<const N: usize>(bytes: &[u8], offset: usize) -> Result<[u8; N], DecodeError> {
    let end = offset + N;
    if end > bytes.len() {
        return Err(DecodeError::Truncated { offset });
    }
    let mut buf = [0u8; N];
    buf.copy_from_slice(&bytes[offset..end]);
    Ok(buf)
}
