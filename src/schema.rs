//! The message-definition table the decoder interprets wire bytes against.
//!
//! Nothing in this module touches bytes; it is pure data plus a keyed
//! lookup. Loading a `.proto` file into a [`Schema`] is explicitly out of
//! scope — callers build one by hand or via whatever `.proto` front end
//! they already have.

use std::collections::HashMap;

use crate::error::DecodeError;

/// The wire-level logical type of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    SInt32,
    SInt64,
    Int32,
    Int64,
    UInt32,
    UInt64,
    Bool,
    Fixed64,
    SFixed64,
    Double,
    Fixed32,
    SFixed32,
    Float,
    String,
    Bytes,
    Enum(String),
    Msg(String),
}

/// Cardinality of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Occurrence {
    Required,
    Optional,
    Repeated,
}

/// An immutable field descriptor: where a field's value lives (`slot`), how
/// it's framed on the wire (`fnum`, `field_type`), and how it's installed
/// (`occurrence`, `packed`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub fnum: u32,
    pub slot: usize,
    pub field_type: FieldType,
    pub occurrence: Occurrence,
    pub packed: bool,
}

impl FieldDescriptor {
    pub fn new(
        name: impl Into<String>,
        fnum: u32,
        slot: usize,
        field_type: FieldType,
        occurrence: Occurrence,
    ) -> Self {
        FieldDescriptor {
            name: name.into(),
            fnum,
            slot,
            field_type,
            occurrence,
            packed: false,
        }
    }

    /// Marks a repeated primitive field as using packed wire encoding. Only
    /// meaningful when `occurrence` is `Repeated`.
    pub fn packed(mut self) -> Self {
        self.packed = true;
        self
    }
}

/// A finite ordered list of field descriptors for one message type.
///
/// `slot` 0 is reserved for the message's type tag; field slots start at 1
/// and are assumed contiguous by [`crate::value::Message::empty`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDef {
    pub name: String,
    fields: Vec<FieldDescriptor>,
}

impl MessageDef {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDescriptor>) -> Self {
        MessageDef {
            name: name.into(),
            fields,
        }
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Highest slot index used by any field, i.e. the size of the message
    /// value's slot array minus one.
    pub fn max_slot(&self) -> usize {
        self.fields.iter().map(|f| f.slot).max().unwrap_or(0)
    }

    pub(crate) fn field_by_fnum(&self, fnum: u32) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.fnum == fnum)
    }
}

/// A bijective mapping between symbolic enumerators and their integer codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDef {
    name: String,
    by_value: HashMap<i64, String>,
}

impl EnumDef {
    pub fn new(name: impl Into<String>, variants: Vec<(impl Into<String>, i64)>) -> Self {
        let by_value = variants.into_iter().map(|(n, v)| (v, n.into())).collect();
        EnumDef {
            name: name.into(),
            by_value,
        }
    }

    pub(crate) fn symbol_for(&self, value: i64) -> Result<&str, DecodeError> {
        self.by_value
            .get(&value)
            .map(String::as_str)
            .ok_or_else(|| DecodeError::UnknownEnumerator {
                enum_name: self.name.clone(),
                value,
            })
    }
}

/// Composite key into the schema table: `(msg, name)` or `(enum, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SchemaKey {
    Msg(String),
    Enum(String),
}

enum SchemaEntry {
    Message(MessageDef),
    Enum(EnumDef),
}

/// The fully resolved schema table: every `msg`/`enum` name referenced by a
/// field descriptor must have a corresponding entry. Read-only after
/// construction and safe to share across threads.
pub struct Schema {
    entries: HashMap<SchemaKey, SchemaEntry>,
}

impl Schema {
    pub fn new() -> Self {
        Schema {
            entries: HashMap::new(),
        }
    }

    pub fn with_message(mut self, def: MessageDef) -> Self {
        self.entries
            .insert(SchemaKey::Msg(def.name.clone()), SchemaEntry::Message(def));
        self
    }

    pub fn with_enum(mut self, def: EnumDef) -> Self {
        self.entries
            .insert(SchemaKey::Enum(def.name.clone()), SchemaEntry::Enum(def));
        self
    }

    /// Looks up a message definition by name. A missing key is a programmer
    /// error surfaced as [`DecodeError::NoSuchKey`].
    pub fn message(&self, name: &str) -> Result<&MessageDef, DecodeError> {
        match self.entries.get(&SchemaKey::Msg(name.to_string())) {
            Some(SchemaEntry::Message(def)) => Ok(def),
            _ => Err(DecodeError::NoSuchKey(SchemaKey::Msg(name.to_string()))),
        }
    }

    pub(crate) fn enum_def(&self, name: &str) -> Result<&EnumDef, DecodeError> {
        match self.entries.get(&SchemaKey::Enum(name.to_string())) {
            Some(SchemaEntry::Enum(def)) => Ok(def),
            _ => Err(DecodeError::NoSuchKey(SchemaKey::Enum(name.to_string()))),
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Schema::new()
    }
}
