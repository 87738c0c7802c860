//! File-backed documents.
//!
//! A [`Document`] wraps a root [`Structure`] loaded from JSON or YAML and
//! records which dotted paths were written since it was loaded, so callers
//! only write the file back when something changed.

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::access::{self, AccessError, IntoKeyPath, NodeRef, Policy, Structure, Value};


/// On-disk encoding of a document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Format {
    #[default]
    Json,
    Yaml,
}

impl Format {
    /// Pick the format from a file extension; `.yml`/`.yaml` are YAML,
    /// everything else JSON.
    pub fn from_path(path: &Path) -> Format {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Format::Yaml
            }
            _ => Format::Json,
        }
    }
}


#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("document root must be a mapping")]
    NotAMapping,
    #[error(transparent)]
    Access(#[from] AccessError),
}


/// A structure plus its format and the paths modified since load.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root: Structure,
    format: Format,
    dirty: BTreeSet<String>,
}

impl Document {
    /// Create an empty document.
    pub fn new(format: Format) -> Self {
        Document {
            root: Structure::new(),
            format,
            dirty: BTreeSet::new(),
        }
    }

    /// Wrap an existing structure. Nothing is marked dirty.
    pub fn from_structure(root: Structure, format: Format) -> Self {
        Document {
            root,
            format,
            dirty: BTreeSet::new(),
        }
    }

    /// Parse document text. An empty or blank input is an empty document.
    pub fn parse(content: &str, format: Format) -> Result<Self, DocumentError> {
        if content.trim().is_empty() {
            return Ok(Document::new(format));
        }
        let value: serde_json::Value = match format {
            Format::Json => serde_json::from_str(content)?,
            Format::Yaml => serde_yaml::from_str(content)?,
        };
        // A YAML file holding only comments parses to null.
        if value.is_null() {
            return Ok(Document::new(format));
        }
        if !value.is_object() {
            return Err(DocumentError::NotAMapping);
        }
        let root = Structure::try_from(value)?;
        Ok(Document::from_structure(root, format))
    }

    /// Load a document, choosing the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let doc = Document::parse(&content, Format::from_path(path))?;
        tracing::debug!(path = %path.display(), format = ?doc.format, keys = doc.root.len(), "loaded document");
        Ok(doc)
    }

    /// Write the document to `path` in its own format and clear dirty
    /// tracking.
    pub fn save(&mut self, path: &Path, pretty: bool) -> Result<(), DocumentError> {
        let content = self.render(pretty)?;
        std::fs::write(path, content).map_err(|source| DocumentError::Io {
            path: path.display().to_string(),
            source,
        })?;
        tracing::debug!(path = %path.display(), written = self.dirty.len(), "saved document");
        self.clear_dirty();
        Ok(())
    }

    /// Render the whole document in its format.
    pub fn render(&self, pretty: bool) -> Result<String, DocumentError> {
        match self.format {
            Format::Json if pretty => Ok(serde_json::to_string_pretty(&self.root)? + "\n"),
            Format::Json => Ok(serde_json::to_string(&self.root)? + "\n"),
            Format::Yaml => Ok(serde_yaml::to_string(&self.root)?),
        }
    }

    pub fn root(&self) -> &Structure {
        &self.root
    }

    pub fn format(&self) -> Format {
        self.format
    }

    // -------------------------------------------------------------------
    // Path operations
    // -------------------------------------------------------------------

    pub fn get<P: IntoKeyPath>(&self, path: P) -> Option<NodeRef<'_>> {
        access::get(&self.root, path)
    }

    pub fn get_or<'a, P: IntoKeyPath>(&'a self, path: P, default: &'a Value) -> NodeRef<'a> {
        access::get_or(&self.root, path, default)
    }

    pub fn exists<P: IntoKeyPath>(&self, path: P) -> bool {
        access::exists(&self.root, path)
    }

    /// Set a value, creating intermediate mappings. Always marks `path`
    /// dirty.
    pub fn set<P: IntoKeyPath>(&mut self, path: P, value: impl Into<Value>) {
        let Some(path) = path.into_key_path() else {
            return;
        };
        access::set_creating(&mut self.root, &path, value);
        self.dirty.insert(path.to_dotted());
    }

    /// Overwrite an existing value.
    ///
    /// Returns whether a write happened; a lenient miss returns `Ok(false)`
    /// and leaves the document clean.
    pub fn update<P: IntoKeyPath>(
        &mut self,
        path: P,
        value: impl Into<Value>,
        policy: Policy,
    ) -> Result<bool, DocumentError> {
        let Some(path) = path.into_key_path() else {
            return Ok(false);
        };
        let present = access::exists(&self.root, &path);
        access::update_existing_with(&mut self.root, &path, value, policy)?;
        if present {
            self.dirty.insert(path.to_dotted());
        }
        Ok(present)
    }

    /// Call the callable stored at `path` with `args`.
    ///
    /// Returns whether a call happened; a lenient miss returns `Ok(false)`.
    /// Invoking never marks the document dirty.
    pub fn invoke<P: IntoKeyPath>(
        &self,
        path: P,
        args: &[Value],
        policy: Policy,
    ) -> Result<bool, DocumentError> {
        let Some(path) = path.into_key_path() else {
            return Ok(false);
        };
        let callable = access::get(&self.root, &path).is_some_and(|node| node.as_callable().is_some());
        access::invoke_with(&self.root, &path, args, policy)?;
        Ok(callable)
    }

    // -------------------------------------------------------------------
    // Dirty tracking
    // -------------------------------------------------------------------

    /// Paths written since load or the last save, in sorted order.
    pub fn dirty_paths(&self) -> &BTreeSet<String> {
        &self.dirty
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        self.dirty.clear();
    }
}


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn sample() -> Document {
        Document::parse(r#"{"foo": {"bar": {"baz": "test"}}}"#, Format::Json).unwrap()
    }

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("hoops-doc-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    // --- Format ---

    #[test]
    fn format_from_extension() {
        assert_eq!(Format::from_path(Path::new("a.yaml")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.YML")), Format::Yaml);
        assert_eq!(Format::from_path(Path::new("a.json")), Format::Json);
        assert_eq!(Format::from_path(Path::new("noext")), Format::Json);
    }

    // --- Parsing ---

    #[test]
    fn parse_json() {
        let doc = sample();
        assert_eq!(doc.get("foo.bar.baz").and_then(NodeRef::as_str), Some("test"));
        assert!(!doc.is_dirty());
    }

    #[test]
    fn parse_yaml() {
        let doc = Document::parse("server:\n  port: 8080\n  hosts: [a, b]\n", Format::Yaml).unwrap();
        assert_eq!(doc.get("server.port").and_then(NodeRef::as_scalar), Some(&json!(8080)));
        assert_eq!(doc.get("server.hosts").and_then(NodeRef::as_scalar), Some(&json!(["a", "b"])));
    }

    #[test]
    fn parse_blank_is_empty() {
        let doc = Document::parse("\n", Format::Yaml).unwrap();
        assert!(doc.root().is_empty());
    }

    #[test]
    fn parse_comment_only_yaml_is_empty() {
        let doc = Document::parse("# settings\n# nothing yet\n", Format::Yaml).unwrap();
        assert!(doc.root().is_empty());
        assert_eq!(doc.format(), Format::Yaml);
        let doc = Document::parse("null", Format::Json).unwrap();
        assert!(doc.root().is_empty());
    }

    #[test]
    fn parse_rejects_non_mapping_root() {
        let err = Document::parse("[1, 2]", Format::Json).unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping));
        let err = Document::parse("- a\n- b\n", Format::Yaml).unwrap_err();
        assert!(matches!(err, DocumentError::NotAMapping));
    }

    #[test]
    fn parse_rejects_bad_json() {
        assert!(matches!(
            Document::parse("{not json", Format::Json),
            Err(DocumentError::Json(_))
        ));
    }

    // --- Operations ---

    #[test]
    fn set_marks_dirty() {
        let mut doc = sample();
        doc.set("foo.new.leaf", "x");
        assert!(doc.exists("foo.new.leaf"));
        assert!(doc.dirty_paths().contains("foo.new.leaf"));
    }

    #[test]
    fn update_present_marks_dirty() {
        let mut doc = sample();
        assert!(doc.update("foo.bar.baz", "y", Policy::Strict).unwrap());
        assert_eq!(doc.get("foo.bar.baz").and_then(NodeRef::as_str), Some("y"));
        assert!(doc.is_dirty());
    }

    #[test]
    fn update_missing_strict_errors() {
        let mut doc = sample();
        let err = doc.update("foo.missing", "y", Policy::Strict).unwrap_err();
        assert!(matches!(err, DocumentError::Access(AccessError::PathNotFound { .. })));
        assert!(!doc.is_dirty());
    }

    #[test]
    fn update_missing_lenient_stays_clean() {
        let mut doc = sample();
        assert!(!doc.update("foo.missing", "y", Policy::Lenient).unwrap());
        assert!(!doc.is_dirty());
        assert_eq!(doc, sample());
    }

    #[test]
    fn key_sequence_reaches_dotted_key() {
        let mut doc = Document::parse(r#"{"hosts": {"db.internal": "10.0.0.2"}}"#, Format::Json).unwrap();
        assert_eq!(doc.get(["hosts", "db.internal"]).and_then(NodeRef::as_str), Some("10.0.0.2"));
        assert!(!doc.exists("hosts.db.internal"));

        assert!(doc.update(["hosts", "db.internal"], "10.0.0.3", Policy::Strict).unwrap());
        assert!(doc.dirty_paths().contains("hosts.db.internal"));
        assert_eq!(doc.get(["hosts", "db.internal"]).and_then(NodeRef::as_str), Some("10.0.0.3"));
    }

    #[test]
    fn set_without_path_stays_clean() {
        let mut doc = sample();
        doc.set(None::<&str>, "x");
        assert!(!doc.is_dirty());
        assert_eq!(doc, sample());
    }

    #[test]
    fn invoke_calls_stored_callable() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut doc = sample();
        doc.set("hooks.reload", Value::callable(move |args| {
            seen.fetch_add(args.len(), Ordering::SeqCst);
        }));
        doc.clear_dirty();

        assert!(doc.invoke("hooks.reload", &[Value::from(1i64), Value::from(2i64)], Policy::Strict).unwrap());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!doc.is_dirty());
    }

    #[test]
    fn invoke_missing_follows_policy() {
        let doc = sample();
        let err = doc.invoke("foo.bar.baz", &[], Policy::Strict).unwrap_err();
        assert!(matches!(err, DocumentError::Access(AccessError::PathNotCallable { .. })));
        assert!(!doc.invoke("hooks.none", &[], Policy::Lenient).unwrap());
    }

    #[test]
    fn get_or_default() {
        let doc = sample();
        let default = Value::from(0i64);
        assert_eq!(doc.get_or("nope", &default).as_scalar(), Some(&json!(0)));
    }

    // --- Rendering / persistence ---

    #[test]
    fn render_compact_json() {
        let doc = sample();
        assert_eq!(doc.render(false).unwrap(), "{\"foo\":{\"bar\":{\"baz\":\"test\"}}}\n");
    }

    #[test]
    fn render_yaml() {
        let doc = Document::parse("a:\n  b: 1\n", Format::Yaml).unwrap();
        assert_eq!(doc.render(true).unwrap(), "a:\n  b: 1\n");
    }

    #[test]
    fn render_with_callable_fails() {
        let mut doc = sample();
        doc.set("hook", Value::callable(|_| {}));
        assert!(matches!(doc.render(true), Err(DocumentError::Json(_))));
    }

    #[test]
    fn save_and_load_round_trip() {
        let path = temp_path("round_trip.json");
        let mut doc = sample();
        doc.set("foo.count", 3i64);
        doc.save(&path, true).unwrap();
        assert!(!doc.is_dirty());

        let back = Document::load(&path).unwrap();
        assert_eq!(back.root(), doc.root());
        assert_eq!(back.format(), Format::Json);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn load_missing_file_errors() {
        let err = Document::load(Path::new("/nonexistent/hoops/doc.json")).unwrap_err();
        assert!(matches!(err, DocumentError::Io { .. }));
    }
}
