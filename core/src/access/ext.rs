//! Method-call surface over the free functions in [`super::ops`].
//!
//! Nothing is attached to [`Structure`] implicitly: the methods only become
//! available once [`PathAccess`] is imported. [`Chain`] threads an owned
//! structure through a sequence of operations, each step a plain
//! value-to-value transform with no state besides the wrapped value.

use super::error::AccessError;
use super::ops;
use super::path::IntoKeyPath;
use super::value::{NodeRef, Structure, Value};


/// Path operations as methods on a structure.
pub trait PathAccess {
    fn get_in<P: IntoKeyPath>(&self, path: P) -> Option<NodeRef<'_>>;

    fn get_in_or<'a, P: IntoKeyPath>(&'a self, path: P, default: &'a Value) -> NodeRef<'a>;

    fn is_in<P: IntoKeyPath>(&self, path: P) -> bool;

    fn invoke_in<P: IntoKeyPath>(&self, path: P, args: &[Value]) -> Result<&Self, AccessError>;

    fn invoke_in_lenient<P: IntoKeyPath>(&self, path: P, args: &[Value]) -> &Self;

    fn update_in<P: IntoKeyPath>(
        &mut self,
        path: P,
        value: impl Into<Value>,
    ) -> Result<&mut Self, AccessError>;

    fn update_in_lenient<P: IntoKeyPath>(&mut self, path: P, value: impl Into<Value>) -> &mut Self;

    fn set_in<P: IntoKeyPath>(&mut self, path: P, value: impl Into<Value>) -> &mut Self;
}

impl PathAccess for Structure {
    fn get_in<P: IntoKeyPath>(&self, path: P) -> Option<NodeRef<'_>> {
        ops::get(self, path)
    }

    fn get_in_or<'a, P: IntoKeyPath>(&'a self, path: P, default: &'a Value) -> NodeRef<'a> {
        ops::get_or(self, path, default)
    }

    fn is_in<P: IntoKeyPath>(&self, path: P) -> bool {
        ops::exists(self, path)
    }

    fn invoke_in<P: IntoKeyPath>(&self, path: P, args: &[Value]) -> Result<&Self, AccessError> {
        ops::invoke(self, path, args)
    }

    fn invoke_in_lenient<P: IntoKeyPath>(&self, path: P, args: &[Value]) -> &Self {
        ops::invoke_lenient(self, path, args)
    }

    fn update_in<P: IntoKeyPath>(
        &mut self,
        path: P,
        value: impl Into<Value>,
    ) -> Result<&mut Self, AccessError> {
        ops::update_existing(self, path, value)
    }

    fn update_in_lenient<P: IntoKeyPath>(&mut self, path: P, value: impl Into<Value>) -> &mut Self {
        ops::update_existing_lenient(self, path, value)
    }

    fn set_in<P: IntoKeyPath>(&mut self, path: P, value: impl Into<Value>) -> &mut Self {
        ops::set_creating(self, path, value)
    }
}


/// Owned pipeline over a value.
#[derive(Debug, Clone, PartialEq)]
pub struct Chain<T> {
    value: T,
}

/// Start a chain over `structure`.
pub fn chain(structure: Structure) -> Chain<Structure> {
    Chain::new(structure)
}

impl<T> Chain<T> {
    pub fn new(value: T) -> Self {
        Chain { value }
    }

    /// Apply an arbitrary transform to the wrapped value.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Chain<U> {
        Chain::new(f(self.value))
    }

    /// Unwrap the chain.
    pub fn value(self) -> T {
        self.value
    }
}

impl Chain<Structure> {
    /// Continue with the node at `path`, cloned. No path yields the whole
    /// structure.
    pub fn get_in<P: IntoKeyPath>(self, path: P) -> Chain<Option<Value>> {
        match path.into_key_path() {
            None => Chain::new(Some(Value::Map(self.value))),
            Some(path) => {
                let found = ops::get(&self.value, path).map(NodeRef::to_value);
                Chain::new(found)
            }
        }
    }

    pub fn get_in_or<P: IntoKeyPath>(self, path: P, default: Value) -> Chain<Value> {
        self.get_in(path).map(|found| found.unwrap_or(default))
    }

    pub fn is_in<P: IntoKeyPath>(self, path: P) -> Chain<bool> {
        let found = ops::exists(&self.value, path);
        Chain::new(found)
    }

    pub fn invoke_in<P: IntoKeyPath>(self, path: P, args: &[Value]) -> Result<Self, AccessError> {
        ops::invoke(&self.value, path, args)?;
        Ok(self)
    }

    pub fn invoke_in_lenient<P: IntoKeyPath>(self, path: P, args: &[Value]) -> Self {
        ops::invoke_lenient(&self.value, path, args);
        self
    }

    pub fn update_in<P: IntoKeyPath>(
        mut self,
        path: P,
        value: impl Into<Value>,
    ) -> Result<Self, AccessError> {
        ops::update_existing(&mut self.value, path, value)?;
        Ok(self)
    }

    pub fn update_in_lenient<P: IntoKeyPath>(mut self, path: P, value: impl Into<Value>) -> Self {
        ops::update_existing_lenient(&mut self.value, path, value);
        self
    }

    pub fn set_in<P: IntoKeyPath>(mut self, path: P, value: impl Into<Value>) -> Self {
        ops::set_creating(&mut self.value, path, value);
        self
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn fixture() -> Structure {
        Structure::try_from(json!({"foo": {"bar": {"baz": "test"}}})).unwrap()
    }

    // --- PathAccess ---

    #[test]
    fn methods_match_free_functions() {
        let mut s = fixture();
        assert_eq!(s.get_in("foo.bar.baz").and_then(NodeRef::as_str), Some("test"));
        assert!(s.is_in("foo.bar.baz"));
        assert!(s.invoke_in("foo.bar.baz", &[]).is_err());

        s.update_in("foo.bar.baz", "updated").unwrap();
        assert_eq!(s.get_in("foo.bar.baz").and_then(NodeRef::as_str), Some("updated"));

        s.set_in("foo.qux.quux", "set");
        assert_eq!(s.get_in(["foo", "qux", "quux"]).and_then(NodeRef::as_str), Some("set"));
    }

    #[test]
    fn methods_chain_on_mutable_reference() {
        let mut s = Structure::new();
        s.set_in("a.b", 1i64)
            .set_in("a.c", 2i64)
            .update_in_lenient("a.missing", 3i64);
        assert_eq!(serde_json::to_value(&s).unwrap(), json!({"a": {"b": 1, "c": 2}}));
    }

    #[test]
    fn get_in_or_uses_default() {
        let s = fixture();
        let default = Value::from("d");
        assert_eq!(s.get_in_or("nope", &default).as_str(), Some("d"));
    }

    // --- Chain ---

    #[test]
    fn chain_get_in() {
        let res = chain(fixture()).get_in("foo.bar.baz").value();
        assert_eq!(res, Some(Value::from("test")));
    }

    #[test]
    fn chain_get_in_without_path_yields_structure() {
        let res = chain(fixture()).get_in(None::<&str>).value();
        assert_eq!(res, Some(Value::Map(fixture())));
    }

    #[test]
    fn chain_is_in() {
        assert!(chain(fixture()).is_in("foo.bar.baz").value());
        assert!(!chain(fixture()).is_in("foo.nope").value());
    }

    #[test]
    fn chain_invoke_in() {
        let invoked = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&invoked);
        let mut s = fixture();
        s.set_in("foo.bar.baz", Value::callable(move |_| flag.store(true, Ordering::SeqCst)));

        let out = chain(s.clone()).invoke_in("foo.bar.baz", &[]).unwrap().value();
        assert_eq!(out, s);
        assert!(invoked.load(Ordering::SeqCst));
    }

    #[test]
    fn chain_update_then_get() {
        let res = chain(fixture())
            .update_in("foo.bar.baz", "updated")
            .unwrap()
            .get_in("foo.bar.baz")
            .value();
        assert_eq!(res, Some(Value::from("updated")));
    }

    #[test]
    fn chain_update_strict_error_propagates() {
        let err = chain(fixture()).update_in("foo.missing", 1i64).unwrap_err();
        assert!(matches!(err, AccessError::PathNotFound { .. }));
    }

    #[test]
    fn chain_set_then_default() {
        let res = chain(Structure::new())
            .set_in("x.y", true)
            .update_in_lenient("x.z", false)
            .invoke_in_lenient("x.y", &[])
            .get_in_or("x.z", Value::from("absent"))
            .value();
        assert_eq!(res, Value::from("absent"));
    }

    #[test]
    fn chain_map_transforms() {
        let keys = chain(fixture()).map(|s| s.keys().count()).value();
        assert_eq!(keys, 1);
    }
}
