use thiserror::Error;

/// Everything that can go wrong while decoding or merging a dynamic message.
///
/// Unknown field numbers are deliberately *not* represented here: per proto2
/// forward-compatibility rules they are skipped, not rejected (see
/// [`crate::decode::decode_msg`]).
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DecodeError {
    /// The input ended while more bytes were expected (a continued varint, or
    /// a fixed/length-delimited frame running past the end of the buffer).
    #[error("truncated input at offset {offset}")]
    Truncated { offset: usize },

    /// Wire type 3 or 4 (group start/end) on a known field. Groups are not
    /// supported.
    #[error("unsupported wire type {wire_type} for field {fnum} at offset {offset}")]
    UnsupportedWireType {
        fnum: u32,
        wire_type: u8,
        offset: usize,
    },

    /// An enum field's integer value has no matching symbolic entry in the
    /// schema's enum table.
    #[error("enumerator {value} has no entry in enum `{enum_name}`")]
    UnknownEnumerator { enum_name: String, value: i64 },

    /// A `string` field's payload was not valid UTF-8.
    #[error("invalid UTF-8 in string field at offset {offset}")]
    InvalidUtf8 { offset: usize },

    /// `merge_msgs` was called with two messages carrying different type
    /// tags.
    #[error("cannot merge message `{prev}` with message `{new}`")]
    TypeMismatch { prev: String, new: String },

    /// A schema lookup failed. This is a programmer error (a missing or
    /// misspelled `msg`/`enum` name in the caller-supplied schema table), not
    /// a wire-format error, but it is still surfaced as an ordinary `Err`
    /// rather than a panic.
    #[error("no such key in schema: {0:?}")]
    NoSuchKey(crate::schema::SchemaKey),
}

pub type Result<T> = std::result::Result<T, DecodeError>;
