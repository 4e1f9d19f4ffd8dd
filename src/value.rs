//! The in-memory shapes decoding produces: a tagged [`Value`] union and the
//! positional [`Message`] record it lives in.

use std::collections::HashSet;

use crate::schema::{FieldType, MessageDef, Occurrence, Schema};

/// A single decoded field value, as an explicit tagged union rather than
/// dynamic typing.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int64(i64),
    UInt64(u64),
    Bool(bool),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Enum(String),
    Msg(Message),
    Seq(Vec<Value>),
    Unset,
}

impl Value {
    pub fn is_unset(&self) -> bool {
        matches!(self, Value::Unset)
    }

    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_msg(&self) -> Option<&Message> {
        match self {
            Value::Msg(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::UInt64(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_enum(&self) -> Option<&str> {
        match self {
            Value::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Value::F32(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::F64(f) => Some(*f),
            _ => None,
        }
    }
}

/// A positional message value: a type tag (the message name) plus one value
/// per field descriptor, addressed by slot.
///
/// Field slots are 1-based; slot 0 is conceptually the message's own type
/// tag, which this struct keeps in its own `name` field rather than
/// literally occupying `slots[0]` with a [`Value::Str`] — that would force
/// an unrelated variant to double as a type marker. Positional addressing of
/// the actual field values is preserved exactly: `get(slot)` for `slot >= 1`
/// indexes directly into descriptor order.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    name: String,
    slots: Vec<Value>,
}

impl Message {
    /// Builds a fresh message value for `def`: repeated fields start empty,
    /// singular sub-message fields are recursively built as their own empty
    /// message, and everything else starts `Unset`.
    ///
    /// A singular sub-message field is only left as `Unset` (to be
    /// constructed lazily on first install, decode or merge) when building
    /// its empty sub-message would recurse back into a message type already
    /// under construction on the current path — i.e. a self-referential
    /// schema. That's the one case where eager construction would never
    /// terminate; every other schema gets the freshly constructed empty
    /// sub-message this type's fields are nominally initialized to.
    pub fn empty(def: &MessageDef, schema: &Schema) -> Message {
        let mut visiting = HashSet::new();
        Message::empty_guarded(def, schema, &mut visiting)
    }

    fn empty_guarded(def: &MessageDef, schema: &Schema, visiting: &mut HashSet<String>) -> Message {
        let mut slots = Vec::with_capacity(def.max_slot());
        slots.resize(def.max_slot(), Value::Unset);

        visiting.insert(def.name.clone());
        for field in def.fields() {
            match field.occurrence {
                Occurrence::Repeated => slots[field.slot - 1] = Value::Seq(Vec::new()),
                Occurrence::Required | Occurrence::Optional => {
                    if let FieldType::Msg(name) = &field.field_type {
                        if !visiting.contains(name) {
                            if let Ok(sub_def) = schema.message(name) {
                                let sub_msg = Message::empty_guarded(sub_def, schema, visiting);
                                slots[field.slot - 1] = Value::Msg(sub_msg);
                            }
                        }
                    }
                }
            }
        }
        visiting.remove(&def.name);

        Message {
            name: def.name.clone(),
            slots,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads the value at a 1-based field slot. Panics if `slot` is 0 or
    /// exceeds the message's field count — an out-of-range slot means the
    /// caller is using a descriptor from a different message definition,
    /// which is a programmer error rather than something to recover from.
    pub fn get(&self, slot: usize) -> &Value {
        &self.slots[slot - 1]
    }

    pub(crate) fn get_mut(&mut self, slot: usize) -> &mut Value {
        &mut self.slots[slot - 1]
    }

    pub(crate) fn set(&mut self, slot: usize, value: Value) {
        self.slots[slot - 1] = value;
    }

    /// Appends to a repeated field's sequence in place. A `Vec` gives O(1)
    /// amortized `push` directly, so there is no prepend-then-reverse
    /// finalization pass to run.
    pub(crate) fn push_repeated(&mut self, slot: usize, value: Value) {
        match self.get_mut(slot) {
            Value::Seq(seq) => seq.push(value),
            other => *other = Value::Seq(vec![value]),
        }
    }

    pub(crate) fn extend_repeated(&mut self, slot: usize, values: Vec<Value>) {
        match self.get_mut(slot) {
            Value::Seq(seq) => seq.extend(values),
            other => *other = Value::Seq(values),
        }
    }
}

pub(crate) fn logical_type_name(field_type: &FieldType) -> &'static str {
    match field_type {
        FieldType::SInt32 => "sint32",
        FieldType::SInt64 => "sint64",
        FieldType::Int32 => "int32",
        FieldType::Int64 => "int64",
        FieldType::UInt32 => "uint32",
        FieldType::UInt64 => "uint64",
        FieldType::Bool => "bool",
        FieldType::Fixed64 => "fixed64",
        FieldType::SFixed64 => "sfixed64",
        FieldType::Double => "double",
        FieldType::Fixed32 => "fixed32",
        FieldType::SFixed32 => "sfixed32",
        FieldType::Float => "float",
        FieldType::String => "string",
        FieldType::Bytes => "bytes",
        FieldType::Enum(_) => "enum",
        FieldType::Msg(_) => "msg",
    }
}
