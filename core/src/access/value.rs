//! Value model for nested structures.
//!
//! A [`Structure`] maps property names to [`Value`]s. Each value is one of
//! three kinds: a nested mapping, a [`Callable`], or a scalar datum backed by
//! `serde_json::Value`. Arrays are scalars here: they are stored and
//! returned whole but never traversed into.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::error::AccessError;


/// A shared, invocable value stored inside a structure.
///
/// The return value of the wrapped function is not part of the contract;
/// callers observe its effects through captured state.
#[derive(Clone)]
pub struct Callable(Arc<dyn Fn(&[Value]) + Send + Sync>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Callable(Arc::new(f))
    }

    /// Call with `args` in order. There is no implicit receiver.
    pub fn call(&self, args: &[Value]) {
        (self.0)(args)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callable(..)")
    }
}

/// Two callables are equal when they share the same function allocation.
impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.0), Arc::as_ptr(&other.0))
    }
}


/// A node inside a [`Structure`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Nested mapping; the only kind a path can descend into.
    Map(Structure),
    /// Function value, target of `invoke`.
    Callable(Callable),
    /// Any other datum: null, bool, number, string or array.
    Scalar(serde_json::Value),
}

impl Value {
    pub fn null() -> Value {
        Value::Scalar(serde_json::Value::Null)
    }

    /// Shorthand for `Value::Callable(Callable::new(f))`.
    pub fn callable<F>(f: F) -> Value
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        Value::Callable(Callable::new(f))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_callable(&self) -> bool {
        matches!(self, Value::Callable(_))
    }

    pub fn as_map(&self) -> Option<&Structure> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_map_mut(&mut self) -> Option<&mut Structure> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            Value::Callable(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_scalar(&self) -> Option<&serde_json::Value> {
        match self {
            Value::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().and_then(serde_json::Value::as_str)
    }

    /// Turn this slot into a mapping (discarding any other content) and
    /// return it.
    pub(crate) fn make_map(&mut self) -> &mut Structure {
        if !self.is_map() {
            *self = Value::Map(Structure::new());
        }
        match self {
            Value::Map(map) => map,
            _ => unreachable!("slot was just replaced with a mapping"),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Object(map) => Value::Map(Structure::from(map)),
            other => Value::Scalar(other),
        }
    }
}

impl From<Structure> for Value {
    fn from(map: Structure) -> Self {
        Value::Map(map)
    }
}

impl From<Callable> for Value {
    fn from(f: Callable) -> Self {
        Value::Callable(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s.into())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Scalar(b.into())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Scalar(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Scalar(n.into())
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Map(map) => map.serialize(serializer),
            Value::Scalar(v) => v.serialize(serializer),
            Value::Callable(_) => Err(serde::ser::Error::custom(
                "callable values cannot be serialized",
            )),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}


/// A mutable mapping from property name to [`Value`].
///
/// Keys are kept sorted so rendered output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Structure {
    entries: BTreeMap<String, Value>,
}

impl Structure {
    pub fn new() -> Self {
        Structure {
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Own-key check; a key holding `null` still exists.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.entries.iter()
    }

    pub(crate) fn entry(&mut self, key: String) -> btree_map::Entry<'_, String, Value> {
        self.entries.entry(key)
    }
}

impl From<BTreeMap<String, Value>> for Structure {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Structure { entries }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Structure {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        map.into_iter().map(|(k, v)| (k, Value::from(v))).collect()
    }
}

/// Only JSON objects become structures; any other root is rejected.
impl TryFrom<serde_json::Value> for Structure {
    type Error = AccessError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Structure::from(map)),
            other => Err(AccessError::InvalidArgument(format!(
                "expected an object at the root, found {}",
                json_kind(&other)
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Structure {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Structure {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Structure {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}


/// Borrowed view of a resolved node.
///
/// Lookups return this rather than `&Value` so that the root structure
/// itself can be handed back when no path is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeRef<'a> {
    Map(&'a Structure),
    Callable(&'a Callable),
    Scalar(&'a serde_json::Value),
}

impl<'a> NodeRef<'a> {
    pub fn as_map(self) -> Option<&'a Structure> {
        match self {
            NodeRef::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_callable(self) -> Option<&'a Callable> {
        match self {
            NodeRef::Callable(f) => Some(f),
            _ => None,
        }
    }

    pub fn as_scalar(self) -> Option<&'a serde_json::Value> {
        match self {
            NodeRef::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(self) -> Option<&'a str> {
        self.as_scalar().and_then(serde_json::Value::as_str)
    }

    /// Clone the referenced node into an owned [`Value`].
    pub fn to_value(self) -> Value {
        match self {
            NodeRef::Map(map) => Value::Map(map.clone()),
            NodeRef::Callable(f) => Value::Callable(f.clone()),
            NodeRef::Scalar(v) => Value::Scalar(v.clone()),
        }
    }
}

impl<'a> From<&'a Value> for NodeRef<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Map(map) => NodeRef::Map(map),
            Value::Callable(f) => NodeRef::Callable(f),
            Value::Scalar(v) => NodeRef::Scalar(v),
        }
    }
}

impl<'a> From<&'a Structure> for NodeRef<'a> {
    fn from(map: &'a Structure) -> Self {
        NodeRef::Map(map)
    }
}

impl Serialize for NodeRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeRef::Map(map) => map.serialize(serializer),
            NodeRef::Scalar(v) => v.serialize(serializer),
            NodeRef::Callable(_) => Err(serde::ser::Error::custom(
                "callable values cannot be serialized",
            )),
        }
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
