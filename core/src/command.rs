//! Command — the typed interface for document operations.
//!
//! Each variant is one path operation against a [`Document`]. The enum is
//! also the script format: a JSON array of commands, each an object with a
//! `"command"` discriminant.
//!
//! ```json
//! [
//!   {"command": "set", "path": "server.port", "value": 8080},
//!   {"command": "update", "path": "server.host", "value": "0.0.0.0", "policy": "lenient"},
//!   {"command": "get", "path": "server.port"},
//!   {"command": "exists", "path": "server.tls"},
//!   {"command": "get", "path": ["hosts", "db.internal"]},
//!   {"command": "invoke", "path": "hooks.reload", "args": [1]}
//! ]
//! ```
//!
//! A path is either a dotted string or a list of keys; the list form reaches
//! keys that contain a `.`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access::{IntoKeyPath, KeyPath, NodeRef, Policy, Value};
use crate::config::Settings;
use crate::document::Document;


/// Path argument of a command: `"a.b"` or `["a", "b"]`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum PathSpec {
    Dotted(String),
    Keys(KeyPath),
}

impl From<&str> for PathSpec {
    fn from(dotted: &str) -> Self {
        PathSpec::Dotted(dotted.to_string())
    }
}

impl From<String> for PathSpec {
    fn from(dotted: String) -> Self {
        PathSpec::Dotted(dotted)
    }
}

impl From<KeyPath> for PathSpec {
    fn from(path: KeyPath) -> Self {
        PathSpec::Keys(path)
    }
}

impl IntoKeyPath for &PathSpec {
    fn into_key_path(self) -> Option<KeyPath> {
        match self {
            PathSpec::Dotted(dotted) => dotted.into_key_path(),
            PathSpec::Keys(path) => path.into_key_path(),
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::Dotted(dotted) => f.write_str(dotted),
            PathSpec::Keys(path) => write!(f, "{}", path),
        }
    }
}


/// A typed operation on a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "command")]
pub enum Command {
    /// Print the value at `path`, or `default` when it does not resolve.
    #[serde(rename = "get")]
    Get {
        path: PathSpec,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<serde_json::Value>,
    },

    /// Print `true` or `false`.
    #[serde(rename = "exists")]
    Exists { path: PathSpec },

    /// Set a value, creating intermediate mappings.
    #[serde(rename = "set")]
    Set {
        path: PathSpec,
        value: serde_json::Value,
    },

    /// Overwrite an existing value. `policy` overrides the configured
    /// update policy.
    #[serde(rename = "update")]
    Update {
        path: PathSpec,
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<Policy>,
    },

    /// Call the callable stored at `path` with `args`. `policy` overrides
    /// the configured invoke policy.
    #[serde(rename = "invoke")]
    Invoke {
        path: PathSpec,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        args: Vec<serde_json::Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy: Option<Policy>,
    },
}

/// Outcome of a command.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok { output: String },
    Error { message: String },
}

impl Response {
    fn ok(output: impl Into<String>) -> Self {
        Response::Ok { output: output.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Response::Error { message: message.into() }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Response::Ok { .. })
    }
}


impl Command {
    /// Run this command against `doc`.
    pub fn execute(&self, doc: &mut Document, settings: &Settings) -> Response {
        match self {
            Command::Get { path, default } => {
                let found = match (doc.get(path), default) {
                    (Some(node), _) => node,
                    (None, Some(default)) => return render_json(default, settings.pretty),
                    (None, None) => return Response::error(format!("path not found: {}", path)),
                };
                render_node(found, settings.pretty)
            }
            Command::Exists { path } => Response::ok(doc.exists(path).to_string()),
            Command::Set { path, value } => {
                doc.set(path, Value::from(value.clone()));
                Response::ok("")
            }
            Command::Update { path, value, policy } => {
                let policy = policy.unwrap_or(settings.update_policy);
                match doc.update(path, Value::from(value.clone()), policy) {
                    Ok(true) => Response::ok(""),
                    Ok(false) => Response::ok(format!("skipped: {} not found", path)),
                    Err(e) => Response::error(e.to_string()),
                }
            }
            Command::Invoke { path, args, policy } => {
                let policy = policy.unwrap_or(settings.invoke_policy);
                let args: Vec<Value> = args.iter().cloned().map(Value::from).collect();
                match doc.invoke(path, &args, policy) {
                    Ok(true) => Response::ok(""),
                    Ok(false) => Response::ok(format!("skipped: {} is not callable", path)),
                    Err(e) => Response::error(e.to_string()),
                }
            }
        }
    }

    /// True for commands that can modify the document.
    pub fn is_mutation(&self) -> bool {
        matches!(self, Command::Set { .. } | Command::Update { .. })
    }
}


/// Parse a JSON array of commands.
pub fn parse_script(content: &str) -> Result<Vec<Command>, serde_json::Error> {
    serde_json::from_str(content)
}

/// Run `commands` in order, stopping after the first error.
///
/// Returns the responses produced, the failing one last.
pub fn run_script(commands: &[Command], doc: &mut Document, settings: &Settings) -> Vec<Response> {
    let mut responses = Vec::with_capacity(commands.len());
    for (i, cmd) in commands.iter().enumerate() {
        let resp = cmd.execute(doc, settings);
        let failed = !resp.is_ok();
        responses.push(resp);
        if failed {
            tracing::debug!(index = i, ?cmd, "script stopped at failing command");
            break;
        }
    }
    responses
}


fn render_node(node: NodeRef<'_>, pretty: bool) -> Response {
    let rendered = if pretty {
        serde_json::to_string_pretty(&node)
    } else {
        serde_json::to_string(&node)
    };
    match rendered {
        Ok(s) => Response::ok(s),
        Err(e) => Response::error(e.to_string()),
    }
}

fn render_json(value: &serde_json::Value, pretty: bool) -> Response {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match rendered {
        Ok(s) => Response::ok(s),
        Err(e) => Response::error(e.to_string()),
    }
}
