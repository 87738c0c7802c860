//! Path-based access to nested structures.
//!
//! Paths are dotted strings (`foo.bar.baz`) or key sequences
//! (`["foo", "bar", "baz"]`); see [`KeyPath`]. Operations are plain
//! functions in [`ops`], with a method-call surface in [`PathAccess`] and an
//! owned pipeline in [`Chain`].

pub mod path;
pub mod value;
pub mod ops;
pub mod ext;
mod error;

pub use error::AccessError;
pub use path::{IntoKeyPath, KeyPath};
pub use value::{Callable, NodeRef, Structure, Value};
pub use ops::{
    exists, get, get_or, invoke, invoke_lenient, invoke_with, set_creating, update_existing,
    update_existing_lenient, update_existing_with, Policy,
};
pub use ext::{chain, Chain, PathAccess};
