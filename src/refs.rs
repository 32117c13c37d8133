//! `$ref` resolution for chart files.
//!
//! Any object of the form `{"$ref": "<file>#<pointer>"}` is replaced by the
//! value it points at, before schema validation sees the document:
//! - `#/bars/Total` points into the same document (RFC 6901 pointer)
//! - `shared.json#/colors` points into another file, relative to the
//!   referencing file's directory
//! - `shared.json` (no fragment) takes the whole file
//!
//! Sibling keys next to `$ref` are ignored. Reference cycles are an error.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RefError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not valid JSON", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("'$ref' must be a string, found {0}")]
    NotAString(Value),
    #[error("unresolved reference '{reference}' in {document}")]
    Unresolved { reference: String, document: String },
    #[error("reference cycle through '{0}'")]
    Cycle(String),
}

#[derive(Clone)]
struct Document {
    /// `None` for an in-memory document.
    path: Option<PathBuf>,
    base_dir: PathBuf,
    root: Rc<Value>,
}

impl Document {
    fn name(&self) -> String {
        match &self.path {
            Some(p) => p.display().to_string(),
            None => "<input>".to_string(),
        }
    }
}

#[derive(Default)]
struct Resolver {
    files: HashMap<PathBuf, Document>,
    /// `document#pointer` keys currently being expanded.
    active: Vec<String>,
}

impl Resolver {
    fn load(&mut self, path: &Path) -> Result<Document, RefError> {
        if let Some(doc) = self.files.get(path) {
            return Ok(doc.clone());
        }
        let text = std::fs::read_to_string(path).map_err(|source| RefError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let root: Value = serde_json::from_str(&text).map_err(|source| RefError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        let doc = Document {
            path: Some(path.to_path_buf()),
            base_dir: path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            root: Rc::new(root),
        };
        self.files.insert(path.to_path_buf(), doc.clone());
        Ok(doc)
    }

    fn walk(&mut self, value: &Value, doc: &Document) -> Result<Value, RefError> {
        match value {
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref") {
                    let reference = reference
                        .as_str()
                        .ok_or_else(|| RefError::NotAString(reference.clone()))?;
                    return self.follow(reference, doc);
                }
                let mut out = Map::with_capacity(map.len());
                for (key, v) in map {
                    out.insert(key.clone(), self.walk(v, doc)?);
                }
                Ok(Value::Object(out))
            }
            Value::Array(items) => items
                .iter()
                .map(|v| self.walk(v, doc))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Ok(other.clone()),
        }
    }

    fn follow(&mut self, reference: &str, doc: &Document) -> Result<Value, RefError> {
        let (file, pointer) = reference.split_once('#').unwrap_or((reference, ""));
        let target_doc = if file.is_empty() {
            doc.clone()
        } else {
            self.load(&doc.base_dir.join(file))?
        };

        let unresolved = || RefError::Unresolved {
            reference: reference.to_string(),
            document: doc.name(),
        };
        if !pointer.is_empty() && !pointer.starts_with('/') {
            return Err(unresolved());
        }

        let key = format!("{}#{}", target_doc.name(), pointer);
        if self.active.contains(&key) {
            return Err(RefError::Cycle(key));
        }
        let root = Rc::clone(&target_doc.root);
        let target = root.pointer(pointer).ok_or_else(unresolved)?;

        log::debug!("resolving $ref '{}' -> {}", reference, key);
        self.active.push(key);
        let resolved = self.walk(target, &target_doc);
        self.active.pop();
        resolved
    }
}

/// Read `path` and resolve every `$ref` in it.
pub fn load_json(path: &Path) -> Result<Value, RefError> {
    let mut resolver = Resolver::default();
    let doc = resolver.load(path)?;
    let root = Rc::clone(&doc.root);
    resolver.walk(&root, &doc)
}

/// Resolve every `$ref` in an in-memory document. File references are looked
/// up relative to `base_dir`.
pub fn resolve_refs(value: &Value, base_dir: &Path) -> Result<Value, RefError> {
    let doc = Document {
        path: None,
        base_dir: base_dir.to_path_buf(),
        root: Rc::new(value.clone()),
    };
    Resolver::default().walk(value, &doc)
}
