//! # dynproto
//!
//! A dynamic, schema-driven decoder for the Protocol Buffers (proto2) wire
//! format, plus its companion message-merge operation.
//!
//! "Dynamic" means the schema isn't compiled into the decoder: a
//! [`Schema`] is built at runtime (or loaded from wherever your `.proto`
//! front end lives — that part isn't this crate's job) and handed to
//! [`decode_msg`] alongside the raw wire bytes. The decoder interprets the
//! bytes against the schema and produces a positional [`Message`] value.
//!
//! ## What this crate does *not* do
//!
//! - Parse `.proto` files into [`Schema`]s — build a `Schema` yourself, or
//!   adapt one from whatever descriptor format you already have.
//! - Encode messages back to bytes (only decoding is implemented here;
//!   `varint::encode_varint` exists purely to let the test suite round-trip,
//!   not as a message encoder).
//! - Validate schema consistency, or reject wire-type/declared-type
//!   mismatches beyond what the algorithm naturally tolerates. Unknown
//!   fields are skipped, not rejected.
//! - Populate default values for absent optional fields — absent means
//!   [`Value::Unset`].
//!
//! ## Usage
//!
//! ```
//! use dynproto::schema::{FieldDescriptor, FieldType, MessageDef, Occurrence, Schema};
//! use dynproto::{decode_msg, Value};
//!
//! let schema = Schema::new().with_message(MessageDef::new(
//!     "m1",
//!     vec![FieldDescriptor::new("a", 1, 1, FieldType::Int32, Occurrence::Required)],
//! ));
//!
//! let encoded = [0x08, 0x96, 0x01]; // field 1 = 150
//! let message = decode_msg(&encoded, "m1", &schema).unwrap();
//! assert_eq!(message.get(1), &Value::Int64(150));
//! ```

pub mod decode;
pub mod error;
pub mod merge;
pub mod schema;
pub mod value;
pub(crate) mod varint;
pub(crate) mod wire;

pub use decode::decode_msg;
pub use error::DecodeError;
pub use merge::merge_msgs;
pub use schema::Schema;
pub use value::{Message, Value};
