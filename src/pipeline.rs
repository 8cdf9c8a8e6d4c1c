//! The `parse` entry point: resolve a source, then enrich it.

use crate::enrich::enrich;
use crate::error::Raml2ObjError;
use crate::loader::{RamlLoader, YamlLoader};
use crate::source::{resolve_source, Source};
use crate::types::Document;

/// Parse a RAML source into an enriched [`Document`] using the bundled [`YamlLoader`].
///
/// # Errors
///
/// Fails on the first error from source resolution, loading, or enrichment;
/// no partially enriched document is returned.
pub async fn parse(source: impl Into<Source>) -> Result<Document, Raml2ObjError> {
    parse_with(source, &YamlLoader).await
}

/// Like [`parse`], but loads through the given [`RamlLoader`].
pub async fn parse_with(
    source: impl Into<Source>,
    loader: &dyn RamlLoader,
) -> Result<Document, Raml2ObjError> {
    let raw = resolve_source(source.into(), loader).await?;
    enrich(raw)
}
