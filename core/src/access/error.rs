use thiserror::Error;

use super::path::KeyPath;

/// Failures raised by the strict accessor variants.
///
/// `get`, `exists` and `set_creating` never fail; only strict `invoke` and
/// strict `update_existing` return these, plus constructors that reject
/// malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// The path is missing or does not end in a callable.
    #[error("could not find fn to call in object path: {path}")]
    PathNotCallable { path: KeyPath },

    /// A key along the path (the final one included) does not exist.
    #[error("could not find path in object to update: {path}")]
    PathNotFound { path: KeyPath },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}
