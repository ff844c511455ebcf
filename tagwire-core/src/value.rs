//! Dynamic values.
//!
//! Values carry their own wire kind, and containers carry the wire kind of
//! their elements, so a record can be encoded without consulting its schema
//! beyond field ids and presence rules.
//!
//! Values are totally ordered so they can key a map. Doubles compare by the
//! IEEE-754 total order: `NaN` equals itself and `-0.0` sorts before `0.0`.

use crate::error::CodecError;
use crate::record::Record;
use crate::schema::FieldType;
use bytes::Bytes;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tagwire_protocol::TypeTag;

/// A decoded or to-be-encoded field value.
#[derive(Debug, Clone)]
pub enum Value {
    Bool(bool),
    Byte(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    Double(f64),
    String(String),
    Binary(Bytes),
    Struct(Record),
    List(List),
    Set(List),
    Map(Map),
}

impl Value {
    /// Wire tag of this value.
    pub fn tag(&self) -> TypeTag {
        match self {
            Value::Bool(_) => TypeTag::Bool,
            Value::Byte(_) => TypeTag::Byte,
            Value::I16(_) => TypeTag::I16,
            Value::I32(_) => TypeTag::I32,
            Value::I64(_) => TypeTag::I64,
            Value::Double(_) => TypeTag::Double,
            Value::String(_) | Value::Binary(_) => TypeTag::String,
            Value::Struct(_) => TypeTag::Struct,
            Value::List(_) => TypeTag::List,
            Value::Set(_) => TypeTag::Set,
            Value::Map(_) => TypeTag::Map,
        }
    }

    /// Short kind name for diagnostics; distinguishes string from binary.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Binary(_) => "binary",
            other => other.tag().name(),
        }
    }

    /// Returns whether this value may be stored in a field of type `ty`.
    ///
    /// Containers are checked element by element, and nested records must
    /// have the declared record name.
    pub fn conforms_to(&self, ty: &FieldType) -> bool {
        match (self, ty) {
            (Value::Bool(_), FieldType::Bool)
            | (Value::Byte(_), FieldType::Byte)
            | (Value::I16(_), FieldType::I16)
            | (Value::I32(_), FieldType::I32)
            | (Value::I64(_), FieldType::I64)
            | (Value::Double(_), FieldType::Double)
            | (Value::String(_), FieldType::String)
            | (Value::Binary(_), FieldType::Binary) => true,
            (Value::Struct(record), FieldType::Struct(name)) => record.name() == *name,
            (Value::List(list), FieldType::List(elem))
            | (Value::Set(list), FieldType::Set(elem)) => {
                list.elem() == elem.tag() && list.iter().all(|v| v.conforms_to(elem))
            }
            (Value::Map(map), FieldType::Map(key, value)) => {
                map.key_tag() == key.tag()
                    && map.value_tag() == value.tag()
                    && map
                        .iter()
                        .all(|(k, v)| k.conforms_to(key) && v.conforms_to(value))
            }
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(v) => Some(v),
            _ => None,
        }
    }

    /// Raw bytes of a binary or string value.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Binary(v) => Some(v),
            Value::String(v) => Some(v.as_bytes()),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Struct(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of a list or set.
    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(v) | Value::Set(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(v) => Some(v),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Byte(_) => 1,
            Value::I16(_) => 2,
            Value::I32(_) => 3,
            Value::I64(_) => 4,
            Value::Double(_) => 5,
            Value::String(_) => 6,
            Value::Binary(_) => 7,
            Value::Struct(_) => 8,
            Value::List(_) => 9,
            Value::Set(_) => 10,
            Value::Map(_) => 11,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Byte(a), Value::Byte(b)) => a.cmp(b),
            (Value::I16(a), Value::I16(b)) => a.cmp(b),
            (Value::I32(a), Value::I32(b)) => a.cmp(b),
            (Value::I64(a), Value::I64(b)) => a.cmp(b),
            (Value::Double(a), Value::Double(b)) => a.total_cmp(b),
            (Value::String(a), Value::String(b)) => a.cmp(b),
            (Value::Binary(a), Value::Binary(b)) => a.cmp(b),
            (Value::Struct(a), Value::Struct(b)) => a.cmp(b),
            (Value::List(a), Value::List(b)) | (Value::Set(a), Value::Set(b)) => a.cmp(b),
            (Value::Map(a), Value::Map(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::Byte(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::I16(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::I32(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::I64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Binary(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Binary(Bytes::from(v))
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Binary(Bytes::copy_from_slice(v))
    }
}

impl From<Record> for Value {
    fn from(v: Record) -> Self {
        Value::Struct(v)
    }
}

impl From<Map> for Value {
    fn from(v: Map) -> Self {
        Value::Map(v)
    }
}

/// Homogeneous ordered sequence, used for both lists and sets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct List {
    elem: TypeTag,
    items: Vec<Value>,
}

impl List {
    /// Creates an empty sequence of elements tagged `elem`.
    pub fn new(elem: TypeTag) -> Self {
        Self {
            elem,
            items: Vec::new(),
        }
    }

    /// Builds a sequence, rejecting elements of another kind.
    pub fn from_values(
        elem: TypeTag,
        values: impl IntoIterator<Item = Value>,
    ) -> Result<Self, CodecError> {
        let mut list = Self::new(elem);
        for value in values {
            list.push(value)?;
        }
        Ok(list)
    }

    pub(crate) fn from_parts(elem: TypeTag, items: Vec<Value>) -> Self {
        Self { elem, items }
    }

    /// Appends an element.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<(), CodecError> {
        let value = value.into();
        check_tag(self.elem, &value)?;
        self.items.push(value);
        Ok(())
    }

    /// Wire tag of the elements.
    pub fn elem(&self) -> TypeTag {
        self.elem
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.items.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn into_values(self) -> Vec<Value> {
        self.items
    }
}

impl<'a> IntoIterator for &'a List {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Homogeneous map with unique keys, iterated in key order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Map {
    key: TypeTag,
    value: TypeTag,
    entries: BTreeMap<Value, Value>,
}

impl Map {
    pub fn new(key: TypeTag, value: TypeTag) -> Self {
        Self {
            key,
            value,
            entries: BTreeMap::new(),
        }
    }

    /// Inserts an entry, replacing and returning any previous value for `key`.
    pub fn insert(
        &mut self,
        key: impl Into<Value>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, CodecError> {
        let key = key.into();
        let value = value.into();
        check_tag(self.key, &key)?;
        check_tag(self.value, &value)?;
        Ok(self.entries.insert(key, value))
    }

    pub(crate) fn insert_unchecked(&mut self, key: Value, value: Value) -> Option<Value> {
        self.entries.insert(key, value)
    }

    pub fn key_tag(&self) -> TypeTag {
        self.key
    }

    pub fn value_tag(&self) -> TypeTag {
        self.value
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::collections::btree_map::Iter<'_, Value, Value> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Map {
    type Item = (&'a Value, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, Value, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn check_tag(expected: TypeTag, value: &Value) -> Result<(), CodecError> {
    let actual = value.tag();
    if actual != expected {
        return Err(CodecError::ElementMismatch { expected, actual });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_tags() {
        assert_eq!(Value::from(true).tag(), TypeTag::Bool);
        assert_eq!(Value::from(7i64).tag(), TypeTag::I64);
        assert_eq!(Value::from("x").tag(), TypeTag::String);
        assert_eq!(Value::from(vec![1u8]).tag(), TypeTag::String);
        assert_eq!(Value::from(vec![1u8]).kind_name(), "binary");
        assert_eq!(Value::from(1.0).kind_name(), "double");
    }

    #[test]
    fn test_conforms_to() {
        assert!(Value::from(1i32).conforms_to(&FieldType::I32));
        assert!(!Value::from(1i32).conforms_to(&FieldType::I64));
        assert!(Value::from("s").conforms_to(&FieldType::String));
        assert!(!Value::from("s").conforms_to(&FieldType::Binary));

        let list = List::from_values(TypeTag::I32, [Value::from(1), Value::from(2)]).unwrap();
        assert!(Value::List(list.clone()).conforms_to(&FieldType::list(FieldType::I32)));
        assert!(!Value::List(list.clone()).conforms_to(&FieldType::set(FieldType::I32)));
        assert!(!Value::Set(list).conforms_to(&FieldType::set(FieldType::I64)));
    }

    #[test]
    fn test_list_is_homogeneous() {
        let mut list = List::new(TypeTag::String);
        list.push("a").unwrap();
        list.push(vec![0u8, 1]).unwrap();
        let err = list.push(3i32).unwrap_err();
        assert!(matches!(
            err,
            CodecError::ElementMismatch {
                expected: TypeTag::String,
                actual: TypeTag::I32
            }
        ));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_map_last_write_wins() {
        let mut map = Map::new(TypeTag::String, TypeTag::I64);
        assert_eq!(map.insert("a", 1i64).unwrap(), None);
        assert_eq!(map.insert("a", 2i64).unwrap(), Some(Value::I64(1)));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&Value::from("a")), Some(&Value::I64(2)));
        assert!(map.insert(1i32, 2i64).is_err());
        assert!(map.insert("b", "c").is_err());
    }

    #[test]
    fn test_map_iterates_in_key_order() {
        let mut map = Map::new(TypeTag::I32, TypeTag::Bool);
        for k in [3, 1, 2] {
            map.insert(k, k % 2 == 0).unwrap();
        }
        let keys: Vec<i32> = map.iter().map(|(k, _)| k.as_i32().unwrap()).collect();
        assert_eq!(keys, [1, 2, 3]);
    }

    #[test]
    fn test_double_total_order() {
        assert_eq!(Value::Double(f64::NAN), Value::Double(f64::NAN));
        assert_ne!(Value::Double(-0.0), Value::Double(0.0));
        assert!(Value::Double(-0.0) < Value::Double(0.0));
        assert!(Value::Double(1.0) < Value::Double(2.0));
    }

    #[test]
    fn test_cross_kind_ordering_is_stable() {
        assert!(Value::Bool(true) < Value::I32(0));
        assert!(Value::String("z".into()) < Value::Binary(Bytes::from_static(b"a")));
        assert_ne!(Value::I32(1), Value::I64(1));
    }

    #[test]
    fn test_accessors() {
        assert_eq!(Value::from("hi").as_str(), Some("hi"));
        assert_eq!(Value::from("hi").as_bytes(), Some(&b"hi"[..]));
        assert_eq!(Value::from(5i64).as_i64(), Some(5));
        assert_eq!(Value::from(5i64).as_i32(), None);
        assert!(Value::from(true).as_bool().unwrap());
        assert!(Value::from(1.5).as_double().is_some());
        assert!(Value::from(1i32).as_list().is_none());
    }
}
