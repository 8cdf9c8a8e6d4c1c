//! Error types for loading and enriching RAML documents.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a [`RamlLoader`](crate::RamlLoader) while producing a raw document.
#[derive(Debug, Error)]
pub enum LoadError {
    // IO errors (exit code 3)
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("cannot read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[cfg(feature = "remote")]
    #[error("failed to fetch {url}: {source}")]
    NetworkError {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[cfg(not(feature = "remote"))]
    #[error("cannot fetch {url}: built without the `remote` feature")]
    RemoteDisabled { url: String },

    // Parse errors (exit code 2)
    #[error("invalid YAML: {source}")]
    InvalidYaml {
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid RAML document: {message}")]
    InvalidDocument { message: String },
}

impl LoadError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::FileNotFound { .. } | LoadError::ReadError { .. } => 3,
            #[cfg(feature = "remote")]
            LoadError::NetworkError { .. } => 3,
            #[cfg(not(feature = "remote"))]
            LoadError::RemoteDisabled { .. } => 3,
            _ => 2,
        }
    }
}

/// Errors from [`parse`](crate::parse) and the enrichment passes.
#[derive(Debug, Error)]
pub enum Raml2ObjError {
    #[error("invalid source ({actual}): supply a file path, URL, raw RAML content, bytes, or a document object")]
    InvalidSourceKind { actual: String },

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("object does not describe a RAML document: {source}")]
    InvalidDocument {
        #[source]
        source: serde_json::Error,
    },

    #[error("schema \"{name}\" is not valid JSON: {source}")]
    SchemaDecode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Raml2ObjError {
    /// Returns the exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            Raml2ObjError::Load(e) => e.exit_code(),
            _ => 2,
        }
    }
}
