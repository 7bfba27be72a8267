use std::fmt;
use std::sync::Arc;

use serde::ser::{self, Serialize, Serializer};

use crate::value::{Value, ValueKind, ValueMap, ValueRepr};

/// Raised while converting data that has no value representation.
#[derive(Debug)]
struct InvalidValue(String);

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvalidValue {}

impl ser::Error for InvalidValue {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        InvalidValue(msg.to_string())
    }
}

impl Value {
    /// Creates a value from something that can be serialized.
    ///
    /// This is the method the engine uses to convert data passed to
    /// [`render`](crate::render) into values.  Structs become records,
    /// maps become mappings and sequences, tuples and sets become
    /// sequences.  Enum variants carrying data become a single entry
    /// mapping keyed by the variant name.
    ///
    /// The conversion never panics.  If the data cannot be represented,
    /// for instance because a map uses sequences as keys or the
    /// [`Serialize`] implementation fails, an invalid value is returned
    /// which fails rendering with
    /// [`ErrorKind::BadSerialization`](crate::ErrorKind::BadSerialization).
    ///
    /// ```
    /// # use crtmpl::value::Value;
    /// let value = Value::from_serialize(&vec![1, 2, 3]);
    /// assert_eq!(value.to_string(), "[1, 2, 3]");
    /// ```
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Value {
        match value.serialize(ValueSerializer) {
            Ok(rv) => rv,
            Err(err) => ValueRepr::Invalid(Arc::from(err.0)).into(),
        }
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.0 {
            ValueRepr::None => serializer.serialize_unit(),
            ValueRepr::Bool(b) => serializer.serialize_bool(b),
            ValueRepr::U64(u) => serializer.serialize_u64(u),
            ValueRepr::I64(i) => serializer.serialize_i64(i),
            ValueRepr::F64(f) => serializer.serialize_f64(f),
            ValueRepr::U128(u) => serializer.serialize_u128(u.0),
            ValueRepr::I128(i) => serializer.serialize_i128(i.0),
            ValueRepr::String(ref s) => serializer.serialize_str(s),
            ValueRepr::Seq(ref items) => serializer.collect_seq(items.iter()),
            ValueRepr::Map(ref m) => serializer.collect_map(m.iter().map(|(k, v)| (&**k, v))),
            ValueRepr::Record(ref r) => {
                use serde::ser::SerializeStruct;
                let mut s = serializer.serialize_struct(r.name, r.fields.len())?;
                for (key, value) in r.fields.iter() {
                    s.serialize_field(key, value)?;
                }
                s.end()
            }
            ValueRepr::Invalid(ref msg) => Err(ser::Error::custom(msg)),
        }
    }
}

fn value_to_key(value: Value) -> Result<Arc<str>, InvalidValue> {
    match (value.kind(), &value.0) {
        (_, ValueRepr::String(s)) => Ok(s.clone()),
        (_, ValueRepr::Invalid(msg)) => Err(InvalidValue(msg.to_string())),
        (ValueKind::Bool | ValueKind::Number, _) => Ok(Arc::from(value.to_string())),
        (kind, _) => Err(InvalidValue(format!(
            "map keys must be strings, numbers or bools, got {}",
            kind
        ))),
    }
}

fn single_entry(key: &'static str, value: Value) -> Value {
    let mut map = ValueMap::new();
    map.insert(Arc::from(key), value);
    Value::from_map(map)
}

struct ValueSerializer;

impl Serializer for ValueSerializer {
    type Ok = Value;
    type Error = InvalidValue;

    type SerializeSeq = SerializeSeq;
    type SerializeTuple = SerializeSeq;
    type SerializeTupleStruct = SerializeSeq;
    type SerializeTupleVariant = SerializeTupleVariant;
    type SerializeMap = SerializeMap;
    type SerializeStruct = SerializeStruct;
    type SerializeStructVariant = SerializeStructVariant;

    fn serialize_bool(self, v: bool) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::Bool(v).into())
    }

    fn serialize_i8(self, v: i8) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::I64(v as i64).into())
    }

    fn serialize_i16(self, v: i16) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::I64(v as i64).into())
    }

    fn serialize_i32(self, v: i32) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::I64(v as i64).into())
    }

    fn serialize_i64(self, v: i64) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::I64(v).into())
    }

    fn serialize_i128(self, v: i128) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_u8(self, v: u8) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::U64(v as u64).into())
    }

    fn serialize_u16(self, v: u16) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::U64(v as u64).into())
    }

    fn serialize_u32(self, v: u32) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::U64(v as u64).into())
    }

    fn serialize_u64(self, v: u64) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::U64(v).into())
    }

    fn serialize_u128(self, v: u128) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_f32(self, v: f32) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::F64(v as f64).into())
    }

    fn serialize_f64(self, v: f64) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::F64(v).into())
    }

    fn serialize_char(self, v: char) -> Result<Value, InvalidValue> {
        Ok(Value::from(v))
    }

    fn serialize_str(self, value: &str) -> Result<Value, InvalidValue> {
        Ok(Value::from(value))
    }

    fn serialize_bytes(self, value: &[u8]) -> Result<Value, InvalidValue> {
        Ok(value.iter().copied().collect())
    }

    fn serialize_none(self) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::None.into())
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Result<Value, InvalidValue> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::None.into())
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::None.into())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, InvalidValue> {
        Ok(Value::from(variant))
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, InvalidValue> {
        Ok(single_entry(variant, value.serialize(self)?))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SerializeSeq, InvalidValue> {
        Ok(SerializeSeq {
            elements: Vec::with_capacity(len.unwrap_or(0)),
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SerializeSeq, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        len: usize,
    ) -> Result<SerializeSeq, InvalidValue> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeTupleVariant, InvalidValue> {
        Ok(SerializeTupleVariant {
            variant,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<SerializeMap, InvalidValue> {
        Ok(SerializeMap {
            entries: ValueMap::new(),
            key: None,
        })
    }

    fn serialize_struct(
        self,
        name: &'static str,
        len: usize,
    ) -> Result<SerializeStruct, InvalidValue> {
        Ok(SerializeStruct {
            name,
            fields: Vec::with_capacity(len),
        })
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<SerializeStructVariant, InvalidValue> {
        Ok(SerializeStructVariant {
            variant,
            fields: Vec::with_capacity(len),
        })
    }
}

struct SerializeSeq {
    elements: Vec<Value>,
}

impl ser::SerializeSeq for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), InvalidValue> {
        self.elements.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(ValueRepr::Seq(Arc::new(self.elements)).into())
    }
}

impl ser::SerializeTuple for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_element<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), InvalidValue> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, InvalidValue> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SerializeSeq {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), InvalidValue> {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, InvalidValue> {
        ser::SerializeSeq::end(self)
    }
}

struct SerializeTupleVariant {
    variant: &'static str,
    fields: Vec<Value>,
}

impl ser::SerializeTupleVariant for SerializeTupleVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), InvalidValue> {
        self.fields.push(value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(single_entry(
            self.variant,
            ValueRepr::Seq(Arc::new(self.fields)).into(),
        ))
    }
}

struct SerializeMap {
    entries: ValueMap,
    key: Option<Arc<str>>,
}

impl ser::SerializeMap for SerializeMap {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_key<T: ?Sized + Serialize>(&mut self, key: &T) -> Result<(), InvalidValue> {
        self.key = Some(value_to_key(key.serialize(ValueSerializer)?)?);
        Ok(())
    }

    fn serialize_value<T: ?Sized + Serialize>(&mut self, value: &T) -> Result<(), InvalidValue> {
        let key = self
            .key
            .take()
            .ok_or_else(|| InvalidValue("serialize_value called before serialize_key".into()))?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn serialize_entry<K: ?Sized + Serialize, V: ?Sized + Serialize>(
        &mut self,
        key: &K,
        value: &V,
    ) -> Result<(), InvalidValue> {
        let key = value_to_key(key.serialize(ValueSerializer)?)?;
        self.entries.insert(key, value.serialize(ValueSerializer)?);
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::from_map(self.entries))
    }
}

struct SerializeStruct {
    name: &'static str,
    fields: Vec<(&'static str, Value)>,
}

impl ser::SerializeStruct for SerializeStruct {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(Value::from_record(self.name, self.fields))
    }
}

struct SerializeStructVariant {
    variant: &'static str,
    fields: Vec<(&'static str, Value)>,
}

impl ser::SerializeStructVariant for SerializeStructVariant {
    type Ok = Value;
    type Error = InvalidValue;

    fn serialize_field<T: ?Sized + Serialize>(
        &mut self,
        key: &'static str,
        value: &T,
    ) -> Result<(), InvalidValue> {
        self.fields.push((key, value.serialize(ValueSerializer)?));
        Ok(())
    }

    fn end(self) -> Result<Value, InvalidValue> {
        Ok(single_entry(
            self.variant,
            Value::from_record(self.variant, self.fields),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::BTreeMap;

    use similar_asserts::assert_eq;

    use crate::value::ValueKind;

    #[derive(serde::Serialize)]
    struct Comment {
        author: &'static str,
        content: &'static str,
        score: i32,
    }

    #[derive(serde::Serialize)]
    enum Event {
        Closed,
        Moved(u32),
        Renamed { from: &'static str },
    }

    #[test]
    fn test_struct_becomes_record() {
        let value = Value::from_serialize(&Comment {
            author: "Ted",
            content: "LGTM",
            score: 2,
        });
        assert_eq!(value.kind(), ValueKind::Record);
        assert_eq!(
            format!("{:?}", value),
            r#"Comment { author: "Ted", content: "LGTM", score: 2 }"#
        );
        let fields = value.try_iter().unwrap().collect::<Vec<_>>();
        assert_eq!(
            fields,
            vec![Value::from("Ted"), Value::from("LGTM"), Value::from(2)]
        );
    }

    #[test]
    fn test_map_keys() {
        let mut map = BTreeMap::new();
        map.insert(1, "one");
        map.insert(2, "two");
        let value = Value::from_serialize(&map);
        assert_eq!(value.kind(), ValueKind::Map);
        assert_eq!(value.get_attr("2"), Some(Value::from("two")));
    }

    #[test]
    fn test_enums() {
        assert_eq!(Value::from_serialize(&Event::Closed), Value::from("Closed"));
        assert_eq!(
            Value::from_serialize(&Event::Moved(3))
                .get_attr("Moved")
                .unwrap(),
            Value::from(3)
        );
        let renamed = Value::from_serialize(&Event::Renamed { from: "a" })
            .get_attr("Renamed")
            .unwrap();
        assert_eq!(renamed.get_attr("from"), Some(Value::from("a")));
    }

    #[test]
    fn test_invalid_key() {
        let mut map = BTreeMap::new();
        map.insert(vec![1, 2], 3);
        let value = Value::from_serialize(&map);
        assert_eq!(value.kind(), ValueKind::Invalid);
        assert_eq!(
            value.to_string(),
            "<invalid value: map keys must be strings, numbers or bools, got sequence>"
        );
    }

    #[test]
    fn test_serialize_back() {
        let value = Value::from_serialize(&Comment {
            author: "Ted",
            content: "LGTM",
            score: 2,
        });
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"author":"Ted","content":"LGTM","score":2}"#
        );
    }
}
