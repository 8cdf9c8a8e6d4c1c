//! Raw document loading from files, URLs and in-memory content.
//!
//! The [`RamlLoader`] trait is the seam to whatever parser produces the raw
//! document tree. [`YamlLoader`] is the bundled implementation: it maps the
//! YAML structure of a RAML file onto [`Document`] without checking it
//! against the RAML grammar.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};
use serde_yaml::Value as Yaml;
use tracing::debug;

use crate::error::LoadError;
use crate::types::{Document, HTTP_METHODS};

/// Default timeout for HTTP requests (10 seconds).
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// First line every RAML document must carry.
const RAML_HEADER: &str = "#%RAML";

static TEMPLATE_VARIABLE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{([^{}]+)\}").unwrap());

/// Options handed to a [`RamlLoader`].
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Ask the loader to validate the document. The pipeline always passes `false`.
    pub validate: bool,
    /// Timeout applied to URL fetches.
    pub http_timeout: Duration,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            validate: false,
            http_timeout: HTTP_TIMEOUT,
        }
    }
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    pub fn http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }
}

/// Produces raw RAML documents.
#[async_trait]
pub trait RamlLoader: Send + Sync {
    /// Load from a local file path or an `http(s)` URL.
    async fn load_file(&self, location: &str, options: &LoadOptions)
        -> Result<Document, LoadError>;

    /// Load from RAML text already in memory.
    async fn load_str(&self, content: &str, options: &LoadOptions) -> Result<Document, LoadError>;
}

/// Loader that reads RAML as YAML and maps it onto the document model.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlLoader;

#[async_trait]
impl RamlLoader for YamlLoader {
    async fn load_file(
        &self,
        location: &str,
        options: &LoadOptions,
    ) -> Result<Document, LoadError> {
        let content = if is_url(location) {
            fetch_url(location, options.http_timeout).await?
        } else {
            read_file(Path::new(location)).await?
        };
        self.load_str(&content, options).await
    }

    async fn load_str(&self, content: &str, options: &LoadOptions) -> Result<Document, LoadError> {
        if options.validate && !content.trim_start().starts_with(RAML_HEADER) {
            return Err(LoadError::InvalidDocument {
                message: format!("missing {} header", RAML_HEADER),
            });
        }
        document_from_yaml(content)
    }
}

/// Check if a string looks like a URL (starts with http:// or https://).
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

async fn read_file(path: &Path) -> Result<String, LoadError> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Err(LoadError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    debug!(path = %path.display(), "reading RAML file");
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| LoadError::ReadError {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(feature = "remote")]
async fn fetch_url(url: &str, timeout: Duration) -> Result<String, LoadError> {
    let network_error = |source| LoadError::NetworkError {
        url: url.to_string(),
        source,
    };

    debug!(url, "fetching RAML document");
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(network_error)?;

    let response = client.get(url).send().await.map_err(network_error)?;

    // Check for HTTP errors before reading the body
    let response = response.error_for_status().map_err(network_error)?;

    response.text().await.map_err(network_error)
}

#[cfg(not(feature = "remote"))]
async fn fetch_url(url: &str, _timeout: Duration) -> Result<String, LoadError> {
    Err(LoadError::RemoteDisabled {
        url: url.to_string(),
    })
}

/// Decode RAML text into a raw [`Document`].
pub fn document_from_yaml(content: &str) -> Result<Document, LoadError> {
    let yaml: Yaml =
        serde_yaml::from_str(content).map_err(|source| LoadError::InvalidYaml { source })?;

    let Yaml::Mapping(root) = yaml else {
        return Err(LoadError::InvalidDocument {
            message: "top level must be a mapping".to_string(),
        });
    };

    let mut doc = Map::new();
    let mut resources = Vec::new();
    for (key, value) in root {
        let key = yaml_key(&key);
        if key.starts_with('/') {
            resources.push(resource_value(key, value)?);
        } else {
            doc.insert(key, yaml_to_json(value));
        }
    }
    doc.insert("resources".to_string(), Value::Array(resources));

    serde_json::from_value(Value::Object(doc)).map_err(|e| LoadError::InvalidDocument {
        message: e.to_string(),
    })
}

/// Map a `/path:` entry onto the resource shape.
fn resource_value(relative_uri: String, body: Yaml) -> Result<Value, LoadError> {
    let mut resource = Map::new();
    let mut methods = Map::new();
    let mut children = Vec::new();
    let mut uri_parameters = Map::new();

    let entries = match body {
        Yaml::Mapping(m) => m,
        // `/path:` with no body
        Yaml::Null => Default::default(),
        other => {
            return Err(LoadError::InvalidDocument {
                message: format!(
                    "resource {} must be a mapping, got {}",
                    relative_uri,
                    yaml_type_name(&other)
                ),
            })
        }
    };

    for (key, value) in entries {
        let key = yaml_key(&key);
        if key.starts_with('/') {
            children.push(resource_value(key, value)?);
        } else if HTTP_METHODS.contains(&key.as_str()) {
            let method = match yaml_to_json(value) {
                Value::Null => Value::Object(Map::new()),
                other => other,
            };
            methods.insert(key, method);
        } else if key == "uriParameters" {
            if let Value::Object(declared) = yaml_to_json(value) {
                uri_parameters = declared;
            }
        } else {
            resource.insert(key, yaml_to_json(value));
        }
    }

    for (name, param) in uri_parameters.iter_mut() {
        if param.is_null() {
            *param = Value::Object(Map::new());
        }
        if let Value::Object(fields) = param {
            fields
                .entry("displayName")
                .or_insert_with(|| Value::String(name.clone()));
        }
    }

    // Undeclared template variables still get a parameter
    for caps in TEMPLATE_VARIABLE.captures_iter(&relative_uri) {
        let name = caps[1].to_string();
        if !uri_parameters.contains_key(&name) {
            let mut implicit = Map::new();
            implicit.insert("displayName".to_string(), Value::String(name.clone()));
            implicit.insert("type".to_string(), Value::String("string".to_string()));
            implicit.insert("required".to_string(), Value::Bool(true));
            uri_parameters.insert(name, Value::Object(implicit));
        }
    }

    resource.insert("relativeUri".to_string(), Value::String(relative_uri));
    if !uri_parameters.is_empty() {
        resource.insert("uriParameters".to_string(), Value::Object(uri_parameters));
    }
    if !methods.is_empty() {
        resource.insert("methods".to_string(), Value::Object(methods));
    }
    if !children.is_empty() {
        resource.insert("resources".to_string(), Value::Array(children));
    }
    Ok(Value::Object(resource))
}

fn yaml_key(key: &Yaml) -> String {
    match key {
        Yaml::String(s) => s.clone(),
        other => match yaml_to_json(other.clone()) {
            Value::String(s) => s,
            Value::Null => String::new(),
            value => value.to_string(),
        },
    }
}

fn yaml_type_name(value: &Yaml) -> &'static str {
    match value {
        Yaml::Null => "null",
        Yaml::Bool(_) => "boolean",
        Yaml::Number(_) => "number",
        Yaml::String(_) => "string",
        Yaml::Sequence(_) => "sequence",
        Yaml::Mapping(_) => "mapping",
        Yaml::Tagged(_) => "tagged value",
    }
}

fn yaml_to_json(value: Yaml) -> Value {
    match value {
        Yaml::Null => Value::Null,
        Yaml::Bool(b) => Value::Bool(b),
        Yaml::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Number(i.into())
            } else if let Some(u) = n.as_u64() {
                Value::Number(u.into())
            } else {
                n.as_f64()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or(Value::Null)
            }
        }
        Yaml::String(s) => Value::String(s),
        Yaml::Sequence(items) => Value::Array(items.into_iter().map(yaml_to_json).collect()),
        Yaml::Mapping(m) => Value::Object(
            m.into_iter()
                .map(|(k, v)| (yaml_key(&k), yaml_to_json(v)))
                .collect(),
        ),
        // `!include file.json` and friends: keep the literal, don't follow it
        Yaml::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}
