//! hoops — path-based access to nested key-value structures.
//!
//! Read, test, invoke and write deeply nested values by key path without
//! repeated existence checks:
//!
//! ```
//! use hoops_core::access::{self, Structure};
//! use serde_json::json;
//!
//! let mut s = Structure::try_from(json!({"foo": {"bar": {"baz": "test"}}})).unwrap();
//!
//! assert_eq!(access::get(&s, "foo.bar.baz").and_then(|n| n.as_str()), Some("test"));
//! assert!(access::exists(&s, ["foo", "bar"]));
//!
//! access::set_creating(&mut s, "foo.newprop.another", "x");
//! assert!(access::update_existing(&mut s, "foo.missing", "y").is_err());
//! ```
//!
//! [`document`], [`command`] and [`config`] build a file-oriented layer on
//! top, used by the `hoops` command-line tool.

pub mod access;
pub mod command;
pub mod config;
pub mod document;

pub use access::{AccessError, KeyPath, PathAccess, Policy, Structure, Value};
