//! The merge engine: combines two messages of the same type field-by-field
//! per proto2 semantics. Used both as the public
//! [`merge_msgs`] entry point and internally by the decoder's installer
//! when a singular sub-message field appears twice in one stream.

use log::trace;

use crate::error::DecodeError;
use crate::schema::{FieldDescriptor, FieldType, MessageDef, Occurrence, Schema};
use crate::value::{Message, Value};

/// Merges `prev` and `new`, two already-decoded messages of the same type,
/// producing a fresh result. Fails with [`DecodeError::TypeMismatch`] if
/// they carry different type tags.
pub fn merge_msgs(prev: &Message, new: &Message, schema: &Schema) -> Result<Message, DecodeError> {
    if prev.name() != new.name() {
        return Err(DecodeError::TypeMismatch {
            prev: prev.name().to_string(),
            new: new.name().to_string(),
        });
    }
    let def = schema.message(prev.name())?;
    merge_message(def, prev, new, schema)
}

pub(crate) fn merge_message(
    def: &MessageDef,
    prev: &Message,
    new: &Message,
    schema: &Schema,
) -> Result<Message, DecodeError> {
    trace!("merging message `{}`", def.name);
    let mut result = Message::empty(def, schema);
    for field in def.fields() {
        let merged = merge_field(field, prev.get(field.slot), new.get(field.slot), schema)?;
        result.set(field.slot, merged);
    }
    Ok(result)
}

fn merge_field(
    field: &FieldDescriptor,
    prev: &Value,
    new: &Value,
    schema: &Schema,
) -> Result<Value, DecodeError> {
    match field.occurrence {
        // repeated (packed or not): result = prev ++ new.
        Occurrence::Repeated => {
            let mut merged = prev.as_seq().unwrap_or(&[]).to_vec();
            merged.extend_from_slice(new.as_seq().unwrap_or(&[]));
            Ok(Value::Seq(merged))
        }
        Occurrence::Required | Occurrence::Optional => match &field.field_type {
            FieldType::Msg(name) => merge_submessage(name, prev, new, schema),
            // singular primitive/string/bytes/enum: new wins unless unset.
            _ => {
                if new.is_unset() {
                    Ok(prev.clone())
                } else {
                    Ok(new.clone())
                }
            }
        },
    }
}

pub(crate) fn merge_submessage(
    name: &str,
    prev: &Value,
    new: &Value,
    schema: &Schema,
) -> Result<Value, DecodeError> {
    match (prev, new) {
        (Value::Unset, Value::Unset) => Ok(Value::Unset),
        (Value::Unset, v @ Value::Msg(_)) => Ok(v.clone()),
        (v @ Value::Msg(_), Value::Unset) => Ok(v.clone()),
        (Value::Msg(p), Value::Msg(n)) => {
            let sub_def = schema.message(name)?;
            Ok(Value::Msg(merge_message(sub_def, p, n, schema)?))
        }
        _ => unreachable!("singular msg(M') slot holds only Unset or Msg"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EnumDef, FieldDescriptor};

    fn m4_def() -> MessageDef {
        MessageDef::new(
            "m4",
            vec![
                FieldDescriptor::new("x", 1, 1, FieldType::Int64, Occurrence::Optional),
                FieldDescriptor::new("y", 2, 2, FieldType::Int64, Occurrence::Repeated),
            ],
        )
    }

    fn m3_def() -> MessageDef {
        MessageDef::new(
            "m3",
            vec![
                FieldDescriptor::new("a", 1, 1, FieldType::Int64, Occurrence::Optional),
                FieldDescriptor::new("b", 2, 2, FieldType::Int64, Occurrence::Optional),
                FieldDescriptor::new("c", 3, 3, FieldType::Int64, Occurrence::Optional),
                FieldDescriptor::new("d", 4, 4, FieldType::Int64, Occurrence::Repeated),
                FieldDescriptor::new(
                    "e",
                    5,
                    5,
                    FieldType::Msg("m4".to_string()),
                    Occurrence::Optional,
                ),
            ],
        )
    }

    fn schema() -> Schema {
        Schema::new()
            .with_message(m3_def())
            .with_message(m4_def())
            .with_enum(EnumDef::new("e", vec![("v1", 100), ("v2", 150)]))
    }

    #[test]
    fn test_merge_scalar_repeated_and_submessage_fields_together() {
        let schema = schema();
        let def = m3_def();
        let m4def = m4_def();

        let mut m4_prev = Message::empty(&m4def, &schema);
        m4_prev.set(1, Value::Int64(110));
        m4_prev.set(2, Value::Seq(vec![Value::Int64(111), Value::Int64(112)]));

        let mut m4_new = Message::empty(&m4def, &schema);
        m4_new.set(1, Value::Int64(210));
        m4_new.set(2, Value::Seq(vec![Value::Int64(211), Value::Int64(212)]));

        let mut prev = Message::empty(&def, &schema);
        prev.set(1, Value::Int64(10));
        prev.set(2, Value::Unset);
        prev.set(3, Value::Int64(13));
        prev.set(4, Value::Seq(vec![Value::Int64(11), Value::Int64(12)]));
        prev.set(5, Value::Msg(m4_prev));

        let mut new = Message::empty(&def, &schema);
        new.set(1, Value::Int64(20));
        new.set(2, Value::Int64(22));
        new.set(3, Value::Unset);
        new.set(4, Value::Seq(vec![Value::Int64(21), Value::Int64(22)]));
        new.set(5, Value::Msg(m4_new));

        let merged = merge_msgs(&prev, &new, &schema).unwrap();
        assert_eq!(merged.get(1), &Value::Int64(20));
        assert_eq!(merged.get(2), &Value::Int64(22));
        assert_eq!(merged.get(3), &Value::Int64(13));
        assert_eq!(
            merged.get(4),
            &Value::Seq(vec![
                Value::Int64(11),
                Value::Int64(12),
                Value::Int64(21),
                Value::Int64(22)
            ])
        );
        let e = merged.get(5).as_msg().unwrap();
        assert_eq!(e.get(1), &Value::Int64(210));
        assert_eq!(
            e.get(2),
            &Value::Seq(vec![
                Value::Int64(111),
                Value::Int64(112),
                Value::Int64(211),
                Value::Int64(212)
            ])
        );
    }

    #[test]
    fn test_merge_type_mismatch() {
        let schema = schema();
        let prev = Message::empty(&m3_def(), &schema);
        let new = Message::empty(&m4_def(), &schema);
        let err = merge_msgs(&prev, &new, &schema).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TypeMismatch {
                prev: "m3".to_string(),
                new: "m4".to_string(),
            }
        );
    }

    #[test]
    fn test_merge_associativity_on_repeated_fields() {
        let schema = schema();
        let def = m4_def();

        let mk = |vals: &[i64]| {
            let mut m = Message::empty(&def, &schema);
            m.set(2, Value::Seq(vals.iter().map(|v| Value::Int64(*v)).collect()));
            m
        };
        let a = mk(&[1, 2]);
        let b = mk(&[3, 4]);
        let c = mk(&[5, 6]);

        let ab_c = merge_msgs(&merge_msgs(&a, &b, &schema).unwrap(), &c, &schema).unwrap();
        let a_bc = merge_msgs(&a, &merge_msgs(&b, &c, &schema).unwrap(), &schema).unwrap();
        assert_eq!(ab_c.get(2), a_bc.get(2));
    }

    #[test]
    fn test_unset_preservation() {
        let schema = schema();
        let def = m4_def();
        let mut prev = Message::empty(&def, &schema);
        prev.set(1, Value::Int64(42));
        let new = Message::empty(&def, &schema); // x stays Unset

        let merged = merge_msgs(&prev, &new, &schema).unwrap();
        assert_eq!(merged.get(1), &Value::Int64(42));
    }
}
