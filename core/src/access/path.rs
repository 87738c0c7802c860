//! Key paths: ordered sequences of property names.
//!
//! A path is written either as a dotted string (`foo.bar.baz`) or as any
//! sequence of strings (`["foo", "bar", "baz"]`). Both forms produce the
//! same [`KeyPath`], so every operation traverses them identically.
//!
//! There is no escaping: a key containing `.` can only be addressed through
//! the sequence form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::AccessError;


/// A parsed, non-empty key path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct KeyPath {
    segments: Vec<String>,
}

impl KeyPath {
    /// Segment separator for the dotted form.
    pub const SEPARATOR: char = '.';

    /// Split a dotted string into a path.
    ///
    /// Empty segments are kept as empty keys (`"a..b"` has three segments,
    /// the middle one `""`), so the result is never empty.
    pub fn parse(dotted: &str) -> KeyPath {
        KeyPath {
            segments: dotted.split(Self::SEPARATOR).map(str::to_string).collect(),
        }
    }

    /// Build a path from an explicit sequence of keys.
    ///
    /// Segments are taken verbatim, dots included. An empty sequence is
    /// rejected with [`AccessError::InvalidArgument`].
    pub fn from_segments<I, S>(segments: I) -> Result<KeyPath, AccessError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        if segments.is_empty() {
            return Err(AccessError::InvalidArgument(
                "key path must contain at least one key".into(),
            ));
        }
        Ok(KeyPath { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Number of keys in the path (always at least one).
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// The final key and the keys leading up to it.
    pub fn split_last(&self) -> (&str, &[String]) {
        match self.segments.split_last() {
            Some((last, parents)) => (last.as_str(), parents),
            // Construction guarantees at least one segment.
            None => ("", &[]),
        }
    }

    /// Format back to a dotted string.
    pub fn to_dotted(&self) -> String {
        self.segments.join(".")
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_dotted())
    }
}

impl FromStr for KeyPath {
    type Err = AccessError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(KeyPath::parse(s))
    }
}

impl TryFrom<Vec<String>> for KeyPath {
    type Error = AccessError;

    fn try_from(segments: Vec<String>) -> Result<Self, Self::Error> {
        KeyPath::from_segments(segments)
    }
}

impl From<KeyPath> for Vec<String> {
    fn from(path: KeyPath) -> Self {
        path.segments
    }
}


/// Anything that can name a location in a structure.
///
/// `None` means "no path given", the degenerate case every operation treats
/// as a no-op. Explicit `None`s and empty key sequences both map to it.
pub trait IntoKeyPath {
    fn into_key_path(self) -> Option<KeyPath>;
}

fn from_sequence<I, S>(segments: I) -> Option<KeyPath>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    KeyPath::from_segments(segments).ok()
}

impl IntoKeyPath for KeyPath {
    fn into_key_path(self) -> Option<KeyPath> {
        Some(self)
    }
}

impl IntoKeyPath for &KeyPath {
    fn into_key_path(self) -> Option<KeyPath> {
        Some(self.clone())
    }
}

impl IntoKeyPath for &str {
    fn into_key_path(self) -> Option<KeyPath> {
        Some(KeyPath::parse(self))
    }
}

impl IntoKeyPath for String {
    fn into_key_path(self) -> Option<KeyPath> {
        Some(KeyPath::parse(&self))
    }
}

impl IntoKeyPath for &String {
    fn into_key_path(self) -> Option<KeyPath> {
        Some(KeyPath::parse(self))
    }
}

impl IntoKeyPath for &[&str] {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self.iter().copied())
    }
}

impl<const N: usize> IntoKeyPath for [&str; N] {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self)
    }
}

impl<const N: usize> IntoKeyPath for &[&str; N] {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self.iter().copied())
    }
}

impl IntoKeyPath for Vec<&str> {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self)
    }
}

impl IntoKeyPath for Vec<String> {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self)
    }
}

impl IntoKeyPath for &[String] {
    fn into_key_path(self) -> Option<KeyPath> {
        from_sequence(self.iter().cloned())
    }
}

impl<P: IntoKeyPath> IntoKeyPath for Option<P> {
    fn into_key_path(self) -> Option<KeyPath> {
        self.and_then(IntoKeyPath::into_key_path)
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- Parsing ---

    #[test]
    fn parse_dotted() {
        let p = KeyPath::parse("foo.bar.baz");
        assert_eq!(p.segments(), ["foo", "bar", "baz"]);
        assert_eq!(p.len(), 3);
    }

    #[test]
    fn parse_single_key() {
        let p = KeyPath::parse("foo");
        assert_eq!(p.segments(), ["foo"]);
    }

    #[test]
    fn parse_keeps_empty_segments() {
        assert_eq!(KeyPath::parse("a..b").segments(), ["a", "", "b"]);
        assert_eq!(KeyPath::parse("").segments(), [""]);
    }

    #[test]
    fn from_segments_keeps_dots_verbatim() {
        let p = KeyPath::from_segments(["a.b", "c"]).unwrap();
        assert_eq!(p.len(), 2);
        assert_eq!(p.segments()[0], "a.b");
    }

    #[test]
    fn from_segments_rejects_empty() {
        let err = KeyPath::from_segments(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument(_)));
    }

    #[test]
    fn split_last_separates_parents() {
        let p = KeyPath::parse("a.b.c");
        let (last, parents) = p.split_last();
        assert_eq!(last, "c");
        assert_eq!(parents, ["a", "b"]);

        let single = KeyPath::parse("a");
        let (last, parents) = single.split_last();
        assert_eq!(last, "a");
        assert!(parents.is_empty());
    }

    // --- Formatting ---

    #[test]
    fn display_round_trip() {
        let p: KeyPath = "flow.deploy.step1".parse().unwrap();
        assert_eq!(p.to_string(), "flow.deploy.step1");
    }

    #[test]
    fn serde_as_sequence() {
        let p = KeyPath::parse("a.b");
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: KeyPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
        assert!(serde_json::from_str::<KeyPath>("[]").is_err());
    }

    // --- IntoKeyPath ---

    #[test]
    fn string_and_sequence_forms_agree() {
        let dotted = "foo.bar.baz".into_key_path();
        assert_eq!(dotted, ["foo", "bar", "baz"].into_key_path());
        assert_eq!(dotted, vec!["foo", "bar", "baz"].into_key_path());
        assert_eq!(dotted, String::from("foo.bar.baz").into_key_path());
        let owned: Vec<String> = vec!["foo".into(), "bar".into(), "baz".into()];
        assert_eq!(dotted, owned.as_slice().into_key_path());
        assert_eq!(dotted, owned.into_key_path());
    }

    #[test]
    fn none_and_empty_sequences_are_absent() {
        assert_eq!(None::<&str>.into_key_path(), None);
        assert_eq!(Vec::<String>::new().into_key_path(), None);
        let empty: [&str; 0] = [];
        assert_eq!(empty.into_key_path(), None);
    }

    #[test]
    fn some_wraps_inner_path() {
        assert_eq!(Some("a.b").into_key_path(), Some(KeyPath::parse("a.b")));
    }
}
