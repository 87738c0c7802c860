//! The five path operations.
//!
//! Every operation walks the same key sequence from the root. They differ
//! only in what happens at the end of the walk and in how a missing key is
//! treated:
//!
//! | Operation | Missing key | Terminal action |
//! |-----------|-------------|-----------------|
//! | [`get`] / [`get_or`] | `None` / default | return the node |
//! | [`exists`] | `false` | `true` |
//! | [`invoke_with`] | strict: error, lenient: no-op | call the callable |
//! | [`update_existing_with`] | strict: error, lenient: no-op | overwrite |
//! | [`set_creating`] | create an empty mapping | overwrite |
//!
//! When no path is given (`None`, or an empty key sequence) every operation
//! is a no-op. [`get`] then returns the root structure itself while
//! [`exists`] returns `false`; both behaviors are relied upon separately.

use serde::{Deserialize, Serialize};

use super::error::AccessError;
use super::path::{IntoKeyPath, KeyPath};
use super::value::{NodeRef, Structure, Value};


/// How `invoke` and `update_existing` react to a path that does not resolve.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Policy {
    /// Return an error.
    #[default]
    Strict,
    /// Leave the structure untouched and report success.
    Lenient,
}


/// Resolve `path` against `structure`.
///
/// Returns `None` when any key is missing. With no path, returns the
/// structure itself.
pub fn get<P: IntoKeyPath>(structure: &Structure, path: P) -> Option<NodeRef<'_>> {
    match path.into_key_path() {
        None => Some(NodeRef::Map(structure)),
        Some(path) => lookup(structure, &path).map(NodeRef::from),
    }
}

/// Like [`get`], substituting `default` when the path does not resolve.
pub fn get_or<'a, P: IntoKeyPath>(
    structure: &'a Structure,
    path: P,
    default: &'a Value,
) -> NodeRef<'a> {
    get(structure, path).unwrap_or_else(|| NodeRef::from(default))
}

/// True when every key in `path` exists at its level. False with no path.
pub fn exists<P: IntoKeyPath>(structure: &Structure, path: P) -> bool {
    match path.into_key_path() {
        None => false,
        Some(path) => lookup(structure, &path).is_some(),
    }
}

/// Call the callable at `path` with `args`; fails with
/// [`AccessError::PathNotCallable`] if there is none.
pub fn invoke<'a, P: IntoKeyPath>(
    structure: &'a Structure,
    path: P,
    args: &[Value],
) -> Result<&'a Structure, AccessError> {
    invoke_with(structure, path, args, Policy::Strict)
}

/// Call the callable at `path` with `args` if there is one.
pub fn invoke_lenient<'a, P: IntoKeyPath>(
    structure: &'a Structure,
    path: P,
    args: &[Value],
) -> &'a Structure {
    match invoke_with(structure, path, args, Policy::Lenient) {
        Ok(s) => s,
        Err(_) => structure,
    }
}

/// Call the callable at `path`, handling a miss according to `policy`.
///
/// The callable's own result is discarded; the structure is always returned
/// on success.
pub fn invoke_with<'a, P: IntoKeyPath>(
    structure: &'a Structure,
    path: P,
    args: &[Value],
    policy: Policy,
) -> Result<&'a Structure, AccessError> {
    let Some(path) = path.into_key_path() else {
        return Ok(structure);
    };

    match lookup(structure, &path) {
        Some(Value::Callable(f)) => {
            tracing::trace!(path = %path, args = args.len(), "invoking callable");
            f.call(args);
        }
        _ => match policy {
            Policy::Strict => {
                tracing::debug!(path = %path, "no callable at path");
                return Err(AccessError::PathNotCallable { path });
            }
            Policy::Lenient => {
                tracing::debug!(path = %path, "no callable at path, skipping invoke");
            }
        },
    }
    Ok(structure)
}

/// Overwrite the value at `path`; every key, the last included, must
/// already exist or [`AccessError::PathNotFound`] is returned.
pub fn update_existing<P: IntoKeyPath>(
    structure: &mut Structure,
    path: P,
    value: impl Into<Value>,
) -> Result<&mut Structure, AccessError> {
    update_existing_with(structure, path, value, Policy::Strict)
}

/// Overwrite the value at `path` only if every key already exists.
pub fn update_existing_lenient<P: IntoKeyPath>(
    structure: &mut Structure,
    path: P,
    value: impl Into<Value>,
) -> &mut Structure {
    let missing = match path.into_key_path() {
        None => false,
        Some(path) => write_existing(structure, &path, value.into()).is_err(),
    };
    if missing {
        tracing::debug!("path not found, skipping update");
    }
    structure
}

/// Overwrite the value at `path`, handling a missing key according to
/// `policy`.
///
/// The whole path is resolved before the single write, so a failed update
/// leaves the structure unchanged.
pub fn update_existing_with<P: IntoKeyPath>(
    structure: &mut Structure,
    path: P,
    value: impl Into<Value>,
    policy: Policy,
) -> Result<&mut Structure, AccessError> {
    let Some(path) = path.into_key_path() else {
        return Ok(structure);
    };

    if let Err(err) = write_existing(structure, &path, value.into()) {
        match policy {
            Policy::Strict => {
                tracing::debug!(path = %path, "path not found for update");
                return Err(err);
            }
            Policy::Lenient => {
                tracing::debug!(path = %path, "path not found, skipping update");
            }
        }
    }
    Ok(structure)
}

/// Set the value at `path`, creating empty mappings along the way.
///
/// Intermediate slots that are missing or hold anything other than a
/// mapping are replaced with an empty mapping. The final key is written
/// unconditionally. Never fails.
pub fn set_creating<P: IntoKeyPath>(
    structure: &mut Structure,
    path: P,
    value: impl Into<Value>,
) -> &mut Structure {
    let Some(path) = path.into_key_path() else {
        return structure;
    };

    let (last, parents) = path.split_last();
    let mut current = &mut *structure;
    for key in parents {
        let slot = current
            .entry(key.clone())
            .or_insert_with(|| Value::Map(Structure::new()));
        if !slot.is_map() {
            tracing::trace!(path = %path, key = %key, "replacing non-mapping value with a mapping");
        }
        current = slot.make_map();
    }
    current.insert(last, value);

    structure
}


// ---------------------------------------------------------------------------
// Internal: traversal
// ---------------------------------------------------------------------------

/// Walk `path`, failing on the first key the current node does not hold.
fn lookup<'a>(structure: &'a Structure, path: &KeyPath) -> Option<&'a Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = structure.get(first)?;
    for key in rest {
        current = current.as_map()?.get(key)?;
    }
    Some(current)
}

fn lookup_mut<'a>(structure: &'a mut Structure, path: &KeyPath) -> Option<&'a mut Value> {
    let (first, rest) = path.segments().split_first()?;
    let mut current = structure.get_mut(first)?;
    for key in rest {
        current = current.as_map_mut()?.get_mut(key)?;
    }
    Some(current)
}

fn write_existing(structure: &mut Structure, path: &KeyPath, value: Value) -> Result<(), AccessError> {
    match lookup_mut(structure, path) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(AccessError::PathNotFound { path: path.clone() }),
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
