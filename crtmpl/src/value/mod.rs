//! Provides a dynamic value type abstraction.
//!
//! Everything a template can look up or loop over is a [`Value`].  Values
//! are usually created from any [`serde::Serialize`] type with
//! [`Value::from_serialize`], which is also what [`render`](crate::render)
//! and the [`context!`](crate::context) macro use internally:
//!
//! ```
//! # use crtmpl::value::Value;
//! #[derive(serde::Serialize)]
//! struct Comment {
//!     author: &'static str,
//!     content: &'static str,
//! }
//!
//! let value = Value::from_serialize(&Comment { author: "Ted", content: "LGTM" });
//! assert_eq!(value.get_attr("author"), Some(Value::from("Ted")));
//! ```
//!
//! # Mappings and Records
//!
//! The engine distinguishes two shapes of structured data:
//!
//! * **mappings** come from maps (`BTreeMap`, `HashMap`, JSON objects, …).
//!   Their keys are strings and looping over a mapping yields one record
//!   with the fields `key` and `value` per entry.
//! * **records** come from Rust structs.  They have named fields in
//!   declaration order; looping over a record yields its field values.
//!
//! Both are traversed the same way by dotted lookup paths.
//!
//! # Basic Value Conversions
//!
//! Values can also be created directly via the [`From`] trait or by
//! collecting iterators:
//!
//! ```
//! # use crtmpl::value::Value;
//! let int_value = Value::from(42);
//! let none_value = Value::from(());
//! let seq: Value = (1..4).collect();
//! let map: Value = [("key", "value")].into_iter().collect();
//! ```
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, ErrorKind};

pub use crate::value::map::ValueMap;

mod map;
mod serialize;

/// Describes the kind of value.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[non_exhaustive]
pub enum ValueKind {
    /// The value is the none singleton ([`()`])
    None,
    /// The value is a [`bool`]
    Bool,
    /// The value is a number of a supported type.
    Number,
    /// The value is a string.
    String,
    /// The value is an array of other values.
    Seq,
    /// The value is a key/value mapping.
    Map,
    /// The value is a record with named fields.
    Record,
    /// The value could not be created.
    Invalid,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            ValueKind::None => "none",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Seq => "sequence",
            ValueKind::Map => "map",
            ValueKind::Record => "record",
            ValueKind::Invalid => "invalid value",
        })
    }
}

/// Stores 128 bit integers without raising the alignment of the value.
#[derive(Copy)]
#[repr(packed)]
pub(crate) struct Packed<T: Copy>(pub T);

impl<T: Copy> Clone for Packed<T> {
    #[inline(always)]
    fn clone(&self) -> Self {
        *self
    }
}

/// A value with named fields.
///
/// Fields keep their declaration order.
pub(crate) struct Record {
    pub(crate) name: &'static str,
    pub(crate) fields: Vec<(&'static str, Value)>,
}

impl Record {
    fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find_map(|(key, value)| (*key == name).then_some(value))
    }
}

#[derive(Clone)]
pub(crate) enum ValueRepr {
    None,
    Bool(bool),
    U64(u64),
    I64(i64),
    F64(f64),
    U128(Packed<u128>),
    I128(Packed<i128>),
    String(Arc<str>),
    Seq(Arc<Vec<Value>>),
    Map(Arc<ValueMap>),
    Record(Arc<Record>),
    Invalid(Arc<str>),
}

/// Represents a dynamically typed value in the template engine.
///
/// Values are cheap to clone: all compound data is reference counted and
/// never mutated after creation.
///
/// The [`Display`](fmt::Display) form is what templates write out.  None
/// renders as `none` and booleans as `true` and `false`.  Python based
/// renderers of the same syntax print `None`, `True` and `False` instead,
/// so templates shared with them differ for these values.
#[derive(Clone)]
pub struct Value(pub(crate) ValueRepr);

impl Default for Value {
    fn default() -> Value {
        ValueRepr::None.into()
    }
}

impl From<ValueRepr> for Value {
    #[inline(always)]
    fn from(val: ValueRepr) -> Value {
        Value(val)
    }
}

fn as_i128(value: &Value) -> Option<i128> {
    match value.0 {
        ValueRepr::U64(v) => Some(v as i128),
        ValueRepr::I64(v) => Some(v as i128),
        ValueRepr::I128(v) => Some(v.0),
        ValueRepr::U128(v) => i128::try_from(v.0).ok(),
        _ => None,
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value.0 {
        ValueRepr::F64(v) => Some(v),
        ValueRepr::U64(v) => Some(v as f64),
        ValueRepr::I64(v) => Some(v as f64),
        ValueRepr::I128(v) => Some(v.0 as f64),
        ValueRepr::U128(v) => Some(v.0 as f64),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (&self.0, &other.0) {
            (ValueRepr::None, ValueRepr::None) => true,
            (ValueRepr::Bool(a), ValueRepr::Bool(b)) => a == b,
            (ValueRepr::String(a), ValueRepr::String(b)) => a == b,
            (ValueRepr::Seq(a), ValueRepr::Seq(b)) => a == b,
            (ValueRepr::Map(a), ValueRepr::Map(b)) => a == b,
            (ValueRepr::Record(a), ValueRepr::Record(b)) => a.fields == b.fields,
            (ValueRepr::Invalid(a), ValueRepr::Invalid(b)) => a == b,
            _ => match (as_i128(self), as_i128(other)) {
                (Some(a), Some(b)) => a == b,
                _ => match (as_f64(self), as_f64(other)) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
            },
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ValueRepr::None => f.write_str("none"),
            ValueRepr::Bool(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::U64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::I64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::F64(val) => fmt::Debug::fmt(&val, f),
            ValueRepr::U128(val) => fmt::Debug::fmt(&{ val.0 }, f),
            ValueRepr::I128(val) => fmt::Debug::fmt(&{ val.0 }, f),
            ValueRepr::String(ref val) => fmt::Debug::fmt(val, f),
            ValueRepr::Seq(ref val) => f.debug_list().entries(val.iter()).finish(),
            ValueRepr::Map(ref val) => f.debug_map().entries(val.iter()).finish(),
            ValueRepr::Record(ref val) => {
                let mut s = f.debug_struct(val.name);
                for (key, value) in val.fields.iter() {
                    s.field(key, value);
                }
                s.finish()
            }
            ValueRepr::Invalid(ref val) => write!(f, "<invalid value: {}>", val),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            ValueRepr::None => f.write_str("none"),
            ValueRepr::Bool(val) => val.fmt(f),
            ValueRepr::U64(val) => val.fmt(f),
            ValueRepr::I64(val) => val.fmt(f),
            ValueRepr::F64(val) => {
                if val.is_nan() {
                    f.write_str("NaN")
                } else if val.is_infinite() {
                    write!(f, "{}inf", if val.is_sign_negative() { "-" } else { "" })
                } else {
                    let mut num = val.to_string();
                    if !num.contains('.') {
                        num.push_str(".0");
                    }
                    write!(f, "{num}")
                }
            }
            ValueRepr::U128(val) => write!(f, "{}", { val.0 }),
            ValueRepr::I128(val) => write!(f, "{}", { val.0 }),
            ValueRepr::String(ref val) => f.write_str(val),
            ValueRepr::Seq(ref val) => f.debug_list().entries(val.iter()).finish(),
            ValueRepr::Map(ref val) => f.debug_map().entries(val.iter()).finish(),
            ValueRepr::Record(ref val) => f
                .debug_map()
                .entries(val.fields.iter().map(|(k, v)| (k, v)))
                .finish(),
            ValueRepr::Invalid(ref val) => write!(f, "<invalid value: {}>", val),
        }
    }
}

impl Value {
    pub(crate) fn from_map(map: ValueMap) -> Value {
        ValueRepr::Map(Arc::new(map)).into()
    }

    pub(crate) fn from_record(name: &'static str, fields: Vec<(&'static str, Value)>) -> Value {
        ValueRepr::Record(Arc::new(Record { name, fields })).into()
    }

    /// Returns the kind of the value.
    pub fn kind(&self) -> ValueKind {
        match self.0 {
            ValueRepr::None => ValueKind::None,
            ValueRepr::Bool(_) => ValueKind::Bool,
            ValueRepr::U64(_)
            | ValueRepr::I64(_)
            | ValueRepr::F64(_)
            | ValueRepr::U128(_)
            | ValueRepr::I128(_) => ValueKind::Number,
            ValueRepr::String(_) => ValueKind::String,
            ValueRepr::Seq(_) => ValueKind::Seq,
            ValueRepr::Map(_) => ValueKind::Map,
            ValueRepr::Record(_) => ValueKind::Record,
            ValueRepr::Invalid(_) => ValueKind::Invalid,
        }
    }

    /// Returns `true` if this value is none.
    pub fn is_none(&self) -> bool {
        matches!(self.0, ValueRepr::None)
    }

    /// If the value is a string, return it.
    pub fn as_str(&self) -> Option<&str> {
        match self.0 {
            ValueRepr::String(ref s) => Some(s),
            _ => None,
        }
    }

    /// Returns the length of the contained value.
    ///
    /// Strings report their length in characters, records their number
    /// of fields.
    pub fn len(&self) -> Option<usize> {
        match self.0 {
            ValueRepr::String(ref s) => Some(s.chars().count()),
            ValueRepr::Seq(ref items) => Some(items.len()),
            ValueRepr::Map(ref m) => Some(m.len()),
            ValueRepr::Record(ref r) => Some(r.fields.len()),
            _ => None,
        }
    }

    /// Looks up a mapping key or a record field.
    ///
    /// Returns `None` if the key or field does not exist or if the value
    /// has neither keys nor fields.
    ///
    /// ```
    /// # use crtmpl::{context, value::Value};
    /// let ctx = context!(name => "Peter");
    /// assert_eq!(ctx.get_attr("name"), Some(Value::from("Peter")));
    /// assert_eq!(ctx.get_attr("missing"), None);
    /// ```
    pub fn get_attr(&self, name: &str) -> Option<Value> {
        match self.0 {
            ValueRepr::Map(ref m) => m.get(name).cloned(),
            ValueRepr::Record(ref r) => r.get(name).cloned(),
            _ => None,
        }
    }

    /// Iterates over the value the way a loop section does.
    ///
    /// * sequences yield their items,
    /// * mappings yield a record with the fields `key` and `value` per entry,
    /// * records yield their field values in declaration order,
    /// * strings yield their characters.
    ///
    /// All other values fail with [`ErrorKind::InvalidOperation`].
    pub fn try_iter(&self) -> Result<ValueIter, Error> {
        let imp = match self.0 {
            ValueRepr::Seq(ref items) => ValueIterImpl::Seq(items.clone(), 0),
            ValueRepr::Map(ref m) => ValueIterImpl::Buffered(
                m.iter()
                    .map(|(key, value)| {
                        Value::from_record(
                            "Entry",
                            vec![("key", Value::from(key.clone())), ("value", value.clone())],
                        )
                    })
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            ValueRepr::Record(ref r) => ValueIterImpl::Buffered(
                r.fields
                    .iter()
                    .map(|(_, value)| value.clone())
                    .collect::<Vec<_>>()
                    .into_iter(),
            ),
            ValueRepr::String(ref s) => ValueIterImpl::Chars(s.clone(), 0),
            ValueRepr::Invalid(ref msg) => {
                return Err(Error::new(ErrorKind::BadSerialization, msg.to_string()))
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::InvalidOperation,
                    format!("value of type {} is not iterable", self.kind()),
                ))
            }
        };
        Ok(ValueIter { imp })
    }

    /// Fails if the value could not be created from its source data.
    pub(crate) fn validate(&self) -> Result<(), Error> {
        match self.0 {
            ValueRepr::Invalid(ref msg) => Err(Error::new(
                ErrorKind::BadSerialization,
                msg.to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Iterates over a value.
///
/// Created by [`Value::try_iter`].
pub struct ValueIter {
    imp: ValueIterImpl,
}

enum ValueIterImpl {
    Seq(Arc<Vec<Value>>, usize),
    Buffered(std::vec::IntoIter<Value>),
    Chars(Arc<str>, usize),
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Self::Item> {
        match self.imp {
            ValueIterImpl::Seq(ref items, ref mut idx) => {
                let rv = items.get(*idx).cloned();
                *idx += 1;
                rv
            }
            ValueIterImpl::Buffered(ref mut iter) => iter.next(),
            ValueIterImpl::Chars(ref s, ref mut offset) => {
                let c = s[*offset..].chars().next()?;
                *offset += c.len_utf8();
                Some(Value::from(c))
            }
        }
    }
}

impl fmt::Debug for ValueIter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueIter").finish()
    }
}

macro_rules! value_from {
    ($src:ty, $dst:ident) => {
        impl From<$src> for Value {
            #[inline(always)]
            fn from(val: $src) -> Self {
                ValueRepr::$dst(val as _).into()
            }
        }
    };
}

value_from!(bool, Bool);
value_from!(u8, U64);
value_from!(u16, U64);
value_from!(u32, U64);
value_from!(u64, U64);
value_from!(usize, U64);
value_from!(i8, I64);
value_from!(i16, I64);
value_from!(i32, I64);
value_from!(i64, I64);
value_from!(isize, I64);
value_from!(f32, F64);
value_from!(f64, F64);

impl From<u128> for Value {
    #[inline(always)]
    fn from(val: u128) -> Self {
        ValueRepr::U128(Packed(val)).into()
    }
}

impl From<i128> for Value {
    #[inline(always)]
    fn from(val: i128) -> Self {
        ValueRepr::I128(Packed(val)).into()
    }
}

impl From<()> for Value {
    #[inline(always)]
    fn from(_: ()) -> Self {
        ValueRepr::None.into()
    }
}

impl From<char> for Value {
    #[inline(always)]
    fn from(val: char) -> Self {
        let mut buf = [0u8; 4];
        ValueRepr::String(Arc::from(&*val.encode_utf8(&mut buf))).into()
    }
}

impl<'a> From<&'a str> for Value {
    #[inline(always)]
    fn from(val: &'a str) -> Self {
        ValueRepr::String(Arc::from(val)).into()
    }
}

impl From<String> for Value {
    #[inline(always)]
    fn from(val: String) -> Self {
        ValueRepr::String(Arc::from(val)).into()
    }
}

impl From<Arc<str>> for Value {
    #[inline(always)]
    fn from(val: Arc<str>) -> Self {
        ValueRepr::String(val).into()
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    #[inline(always)]
    fn from(val: Option<T>) -> Self {
        match val {
            Some(val) => val.into(),
            None => ValueRepr::None.into(),
        }
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(val: Vec<T>) -> Self {
        val.into_iter().collect()
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> From<BTreeMap<K, V>> for Value {
    fn from(val: BTreeMap<K, V>) -> Self {
        val.into_iter().collect()
    }
}

// without `preserve_order` the map is a `BTreeMap` and covered above
#[cfg(feature = "preserve_order")]
impl From<ValueMap> for Value {
    fn from(val: ValueMap) -> Self {
        Value::from_map(val)
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let items: Vec<Value> = iter.into_iter().map(Into::into).collect();
        ValueRepr::Seq(Arc::new(items)).into()
    }
}

impl<K: Into<Arc<str>>, V: Into<Value>> FromIterator<(K, V)> for Value {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Value::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use similar_asserts::assert_eq;

    #[test]
    fn test_display() {
        assert_eq!(Value::from(()).to_string(), "none");
        assert_eq!(Value::from(true).to_string(), "true");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(1.0).to_string(), "1.0");
        assert_eq!(Value::from(0.5).to_string(), "0.5");
        assert_eq!(Value::from(f64::NAN).to_string(), "NaN");
        assert_eq!(Value::from(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(Value::from(u128::MAX).to_string(), u128::MAX.to_string());
        assert_eq!(Value::from("a{b}").to_string(), "a{b}");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
        assert_eq!(
            Value::from_iter([("a", Value::from("x")), ("b", Value::from(1))]).to_string(),
            r#"{"a": "x", "b": 1}"#
        );
        assert_eq!(
            Value::from_record("Entry", vec![("key", Value::from("k")), ("value", 2.into())])
                .to_string(),
            r#"{"key": "k", "value": 2}"#
        );
    }

    #[test]
    fn test_map_conversions() {
        let mut map = ValueMap::default();
        map.insert(Arc::from("width"), Value::from(80));
        let value = Value::from(map);
        assert_eq!(value.kind(), ValueKind::Map);
        assert_eq!(value.get_attr("width"), Some(Value::from(80)));

        let mut tree = BTreeMap::new();
        tree.insert("color", "red");
        let value = Value::from(tree);
        assert_eq!(value.kind(), ValueKind::Map);
        assert_eq!(
            serde_json::to_string(&value).unwrap(),
            r#"{"color":"red"}"#
        );
    }

    #[test]
    fn test_debug_record() {
        let record = Value::from_record("Comment", vec![("author", Value::from("Ted"))]);
        assert_eq!(format!("{:?}", record), r#"Comment { author: "Ted" }"#);
    }

    #[test]
    fn test_numeric_equality() {
        assert_eq!(Value::from(1u64), Value::from(1i64));
        assert_eq!(Value::from(2i128), Value::from(2.0));
        assert!(Value::from(1) != Value::from("1"));
    }

    #[test]
    fn test_get_attr() {
        let map: Value = [("a", 1)].into_iter().collect();
        assert_eq!(map.get_attr("a"), Some(Value::from(1)));
        assert_eq!(map.get_attr("b"), None);
        let record = Value::from_record("R", vec![("x", Value::from(true))]);
        assert_eq!(record.get_attr("x"), Some(Value::from(true)));
        assert_eq!(Value::from("x").get_attr("len"), None);
    }

    #[test]
    fn test_try_iter() {
        let seq: Value = vec![1, 2, 3].into();
        assert_eq!(
            seq.try_iter().unwrap().collect::<Vec<_>>(),
            vec![Value::from(1), Value::from(2), Value::from(3)]
        );

        let chars = Value::from("añb").try_iter().unwrap().collect::<Vec<_>>();
        assert_eq!(
            chars,
            vec![Value::from("a"), Value::from("ñ"), Value::from("b")]
        );

        let map: Value = [("b", 2), ("a", 1)].into_iter().collect();
        let keys = map
            .try_iter()
            .unwrap()
            .map(|entry| entry.get_attr("key").unwrap())
            .collect::<Vec<_>>();
        assert_eq!(keys.len(), 2);
        #[cfg(not(feature = "preserve_order"))]
        assert_eq!(keys, vec![Value::from("a"), Value::from("b")]);
        #[cfg(feature = "preserve_order")]
        assert_eq!(keys, vec![Value::from("b"), Value::from("a")]);

        let err = Value::from(42).try_iter().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
        assert_eq!(err.detail(), Some("value of type number is not iterable"));
    }
}
