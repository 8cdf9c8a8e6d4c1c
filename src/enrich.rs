//! Enrichment passes applied to a raw document.
//!
//! Each pass takes the whole document and hands it back, so the full
//! enrichment is a fold over:
//!
//! 1. [`normalize_base_uri`] - substitute `{version}` in `baseUri`
//! 2. [`walk_resources`] - `parentUrl`, `uniqueId`, inherited URI parameters
//! 3. [`index_documentation`] - `uniqueId` on documentation chapters
//! 4. [`decode_schemas`] - decode schema text into `parsedSchemas`
//! 5. [`rename_errors`] - move `(errors)` to `errors`

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Map;
use tracing::debug;

use crate::error::Raml2ObjError;
use crate::types::{Document, Resource, UriParameter};

/// Parser-added disambiguation suffix inside a template variable, e.g. `{id1}`.
static NUMBERED_VARIABLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^0-9]+)[0-9]\}").unwrap());

/// Whole display name carrying a disambiguation suffix, e.g. `id1`.
static NUMBERED_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^0-9]+)[0-9]$").unwrap());

/// Characters outside `[A-Za-z0-9_]`.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]").unwrap());

/// Run every enrichment pass in order.
///
/// # Errors
///
/// Returns `Raml2ObjError::SchemaDecode` if an embedded schema isn't valid JSON.
pub fn enrich(doc: Document) -> Result<Document, Raml2ObjError> {
    let doc = normalize_base_uri(doc);
    let doc = walk_resources(doc);
    let doc = index_documentation(doc);
    let doc = decode_schemas(doc)?;
    Ok(rename_errors(doc))
}

/// Replace the first `{version}` in `baseUri` with the document version.
///
/// A missing version is substituted as the text `undefined`.
pub fn normalize_base_uri(mut doc: Document) -> Document {
    if let Some(base_uri) = doc.base_uri.as_mut().filter(|uri| !uri.is_empty()) {
        let version = doc.version.as_deref().unwrap_or("undefined");
        *base_uri = base_uri.replacen("{version}", version, 1);
        debug!(base_uri = %base_uri, "normalized base URI");
    }
    doc
}

/// Walk the resource tree depth-first, filling in derived fields.
pub fn walk_resources(mut doc: Document) -> Document {
    let inherited: Arc<Vec<UriParameter>> = Arc::default();
    let visited = walk(&mut doc.resources, "", &inherited);
    debug!(resources = visited, "walked resource tree");
    doc
}

fn walk(
    resources: &mut [Resource],
    parent_url: &str,
    inherited: &Arc<Vec<UriParameter>>,
) -> usize {
    let mut visited = 0;

    for resource in resources.iter_mut() {
        resource.parent_url = parent_url.to_string();
        resource.unique_id =
            unique_id(&format!("{}{}", resource.parent_url, resource.relative_uri));
        resource.relative_uri = NUMBERED_VARIABLE
            .replace(&resource.relative_uri, "{$1}")
            .into_owned();

        let mut all_uri_parameters: Vec<UriParameter> = inherited.iter().cloned().collect();
        if let Some(declared) = resource.uri_parameters.as_mut() {
            for param in declared.values_mut() {
                param.display_name = NUMBERED_NAME
                    .replace(&param.display_name, "$1")
                    .into_owned();
                all_uri_parameters.push(param.clone());
            }
        }
        let all_uri_parameters = Arc::new(all_uri_parameters);

        if let Some(methods) = resource.methods.as_mut() {
            for method in methods.values_mut() {
                method.all_uri_parameters = Arc::clone(&all_uri_parameters);
            }
        }
        resource.all_uri_parameters = Arc::clone(&all_uri_parameters);

        let child_url = format!("{}{}", resource.parent_url, resource.relative_uri);
        visited += 1 + walk(&mut resource.resources, &child_url, &all_uri_parameters);
    }

    visited
}

/// Every non-word character becomes `_`, then leading underscores are dropped.
fn unique_id(full_url: &str) -> String {
    NON_WORD
        .replace_all(full_url, "_")
        .trim_start_matches('_')
        .to_string()
}

/// Give each top-level documentation chapter a `uniqueId` derived from its title.
pub fn index_documentation(mut doc: Document) -> Document {
    for section in doc.documentation.iter_mut() {
        section.unique_id = NON_WORD.replace_all(&section.title, "-").into_owned();
    }
    debug!(sections = doc.documentation.len(), "indexed documentation");
    doc
}

/// Decode every schema's JSON text into `parsedSchemas`, keyed by schema name.
///
/// Later entries overwrite earlier ones with the same name.
///
/// # Errors
///
/// Returns `Raml2ObjError::SchemaDecode` naming the first schema that fails to decode.
pub fn decode_schemas(mut doc: Document) -> Result<Document, Raml2ObjError> {
    let mut parsed = doc.parsed_schemas.take().unwrap_or_else(Map::new);

    for group in &doc.schemas {
        for (name, text) in group.iter() {
            let value =
                serde_json::from_str(text).map_err(|source| Raml2ObjError::SchemaDecode {
                    name: name.to_string(),
                    source,
                })?;
            parsed.insert(name.to_string(), value);
        }
    }

    debug!(schemas = parsed.len(), "decoded schemas");
    doc.parsed_schemas = Some(parsed);
    Ok(doc)
}

/// Move the `(errors)` annotation to `errors`.
///
/// Any existing `errors` value is replaced, even when the annotation is absent.
pub fn rename_errors(mut doc: Document) -> Document {
    doc.errors = doc.error_annotation.take();
    doc
}
