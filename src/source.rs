//! Source classification and dispatch to a [`RamlLoader`].

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use crate::error::Raml2ObjError;
use crate::loader::{is_url, LoadOptions, RamlLoader};
use crate::types::{json_type_name, Document};

/// Anything [`parse`](crate::parse) accepts.
#[derive(Debug, Clone)]
pub enum Source {
    /// A file path, an `http(s)` URL, or raw RAML text.
    Text(String),
    /// Raw RAML bytes, decoded as UTF-8.
    Bytes(Vec<u8>),
    /// An already-parsed or hand-built document.
    Document(Document),
    /// A loosely-typed value, e.g. a document object decoded from JSON.
    Json(Value),
}

impl From<&str> for Source {
    fn from(s: &str) -> Self {
        Source::Text(s.to_string())
    }
}

impl From<String> for Source {
    fn from(s: String) -> Self {
        Source::Text(s)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Text(path.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::from(path.as_path())
    }
}

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}

impl From<&[u8]> for Source {
    fn from(bytes: &[u8]) -> Self {
        Source::Bytes(bytes.to_vec())
    }
}

impl From<Document> for Source {
    fn from(doc: Document) -> Self {
        Source::Document(doc)
    }
}

impl From<Value> for Source {
    fn from(value: Value) -> Self {
        Source::Json(value)
    }
}

/// Produce the raw document for a source.
///
/// Text naming an existing file or starting with `http://`/`https://` goes to
/// [`RamlLoader::load_file`]; other text and bytes go to
/// [`RamlLoader::load_str`]. Documents and JSON objects are returned without
/// calling the loader.
///
/// # Errors
///
/// Returns `Raml2ObjError::InvalidSourceKind` for JSON values that are not an
/// object or string, and `Raml2ObjError::Load` for anything the loader rejects.
pub async fn resolve_source(
    source: Source,
    loader: &dyn RamlLoader,
) -> Result<Document, Raml2ObjError> {
    let options = LoadOptions::default().validate(false);

    let source = match source {
        Source::Json(Value::String(text)) => Source::Text(text),
        other => other,
    };

    match source {
        Source::Text(text) => {
            if is_location(&text) {
                debug!(location = %text, "loading RAML from file or URL");
                Ok(loader.load_file(&text, &options).await?)
            } else {
                debug!(bytes = text.len(), "loading RAML from string");
                Ok(loader.load_str(&text, &options).await?)
            }
        }
        Source::Bytes(bytes) => {
            debug!(bytes = bytes.len(), "loading RAML from buffer");
            let text = String::from_utf8_lossy(&bytes);
            Ok(loader.load_str(&text, &options).await?)
        }
        Source::Document(doc) => {
            debug!("using supplied document");
            Ok(doc)
        }
        Source::Json(value @ Value::Object(_)) => {
            debug!("using supplied document object");
            serde_json::from_value(value)
                .map_err(|source| Raml2ObjError::InvalidDocument { source })
        }
        Source::Json(other) => Err(Raml2ObjError::InvalidSourceKind {
            actual: json_type_name(&other).to_string(),
        }),
    }
}

fn is_location(text: &str) -> bool {
    is_url(text) || Path::new(text).exists()
}
