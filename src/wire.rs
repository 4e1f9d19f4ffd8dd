//! Tag parsing, wire-type dispatch, and the unknown-field skip logic.

use crate::error::DecodeError;
use crate::varint::decode_varint;

/// The four wire-type framings this decoder understands. Groups (3, 4) are
/// parsed far enough to be rejected with [`DecodeError::UnsupportedWireType`]
/// but never actually framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint,
    Bits64,
    LengthDelimited,
    Bits32,
}

impl WireType {
    fn from_code(code: u8) -> Option<WireType> {
        match code {
            0 => Some(WireType::Varint),
            1 => Some(WireType::Bits64),
            2 => Some(WireType::LengthDelimited),
            5 => Some(WireType::Bits32),
            _ => None,
        }
    }
}

/// A decoded field tag: field number and wire type, plus the offset of the
/// first byte past the tag.
pub(crate) struct Tag {
    pub fnum: u32,
    pub wire_code: u8,
    pub wire_type: Option<WireType>,
    pub offset: usize,
}

/// Reads a tag varint at `offset` and splits it into field number and wire
/// type. The wire type may be `None` for unsupported codes (3, 4, 6, 7); the
/// caller decides whether that's an error based on whether the field is
/// known — an unknown field with an unsupported wire type is skipped like
/// any other unknown field instead.
pub(crate) fn decode_tag(bytes: &[u8], offset: usize) -> Result<Tag, DecodeError> {
    let (tag, offset) = decode_varint(bytes, offset)?;
    let fnum = (tag >> 3) as u32;
    let wire_code = (tag & 0x7) as u8;
    Ok(Tag {
        fnum,
        wire_code,
        wire_type: WireType::from_code(wire_code),
        offset,
    })
}

/// Skips an unknown field's value, advancing past exactly as many bytes as
/// its wire type says it occupies: the full `length` bytes for a
/// length-delimited frame, not just its header.
pub(crate) fn skip_field(
    bytes: &[u8],
    fnum: u32,
    wire_code: u8,
    offset: usize,
) -> Result<usize, DecodeError> {
    match WireType::from_code(wire_code) {
        Some(WireType::Varint) => decode_varint(bytes, offset).map(|(_, next)| next),
        Some(WireType::Bits64) => require_len(bytes, offset, 8),
        Some(WireType::LengthDelimited) => {
            let (length, start) = decode_varint(bytes, offset)?;
            require_len(bytes, start, length as usize)
        }
        Some(WireType::Bits32) => require_len(bytes, offset, 4),
        None => Err(DecodeError::UnsupportedWireType {
            fnum,
            wire_type: wire_code,
            offset,
        }),
    }
}

fn require_len(bytes: &[u8], offset: usize, len: usize) -> Result<usize, DecodeError> {
    let end = offset + len;
    if end > bytes.len() {
        Err(DecodeError::Truncated { offset })
    } else {
        Ok(end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_tag_varint_field() {
        // field 1, wire type 0 (varint): tag byte is (1 << 3) | 0 = 0x08
        let bytes = [0x08, 0x96, 0x01];
        let tag = decode_tag(&bytes, 0).unwrap();
        assert_eq!(tag.fnum, 1);
        assert_eq!(tag.wire_type, Some(WireType::Varint));
        assert_eq!(tag.offset, 1);
    }

    #[test]
    fn test_decode_tag_length_delimited_field() {
        // field 2, wire type 2: tag byte is (2 << 3) | 2 = 0x12
        let bytes = [0x12, 0x07];
        let tag = decode_tag(&bytes, 0).unwrap();
        assert_eq!(tag.fnum, 2);
        assert_eq!(tag.wire_type, Some(WireType::LengthDelimited));
    }

    #[test]
    fn test_decode_tag_group_is_unsupported_code() {
        // wire type 3 (SGROUP): tag byte (1 << 3) | 3 = 0x0B
        let bytes = [0x0B];
        let tag = decode_tag(&bytes, 0).unwrap();
        assert_eq!(tag.wire_type, None);
    }

    #[test]
    fn test_skip_field_varint() {
        let bytes = [0x96, 0x01, 0xFF];
        let next = skip_field(&bytes, 1, 0, 0).unwrap();
        assert_eq!(next, 2);
    }

    #[test]
    fn test_skip_field_length_delimited_skips_full_payload() {
        let bytes = [0x03, b'a', b'b', b'c', 0xFF];
        let next = skip_field(&bytes, 1, 2, 0).unwrap();
        assert_eq!(next, 4);
    }

    #[test]
    fn test_skip_field_bits64() {
        let bytes = [0u8; 9];
        let next = skip_field(&bytes, 1, 1, 0).unwrap();
        assert_eq!(next, 8);
    }

    #[test]
    fn test_skip_field_bits32() {
        let bytes = [0u8; 5];
        let next = skip_field(&bytes, 1, 5, 0).unwrap();
        assert_eq!(next, 4);
    }

    #[test]
    fn test_skip_field_group_is_unsupported() {
        let bytes = [0u8; 4];
        let err = skip_field(&bytes, 7, 3, 0).unwrap_err();
        assert_eq!(
            err,
            DecodeError::UnsupportedWireType {
                fnum: 7,
                wire_type: 3,
                offset: 0
            }
        );
    }

    #[test]
    fn test_skip_field_truncated_length_delimited() {
        let bytes = [0x05, b'a', b'b'];
        let err = skip_field(&bytes, 1, 2, 0).unwrap_err();
        assert_eq!(err, DecodeError::Truncated { offset: 1 });
    }
}
