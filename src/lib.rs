//! RAML to object
//!
//! Turns a RAML API description into an enriched object tree that templates
//! and documentation generators can walk without further lookups.
//!
//! The raw document comes from a [`RamlLoader`] (file, URL, string or bytes),
//! or is supplied directly. Five passes then run in order:
//!
//! | Pass | Adds |
//! |------|------|
//! | base URI | `{version}` in `baseUri` replaced by `version` |
//! | resource walk | `parentUrl`, `uniqueId`, `allUriParameters` on resources and methods |
//! | documentation | `uniqueId` on each top-level chapter |
//! | schemas | `parsedSchemas`, each schema's JSON text decoded by name |
//! | errors | `(errors)` annotation moved to `errors` |
//!
//! # Example
//!
//! ```
//! use raml2obj::{enrich, Document, Resource, UriParameter};
//!
//! let mut org = Resource::new("/{orgId2}");
//! org.uri_parameters = Some([("orgId2", UriParameter::new("orgId2"))].into_iter().collect());
//! let mut orgs = Resource::new("/orgs");
//! orgs.resources.push(org);
//!
//! let doc = Document {
//!     base_uri: Some("http://api.example.com/{version}".into()),
//!     version: Some("v1".into()),
//!     resources: vec![orgs],
//!     ..Document::default()
//! };
//!
//! let doc = enrich(doc).unwrap();
//! assert_eq!(doc.base_uri.as_deref(), Some("http://api.example.com/v1"));
//!
//! let org = &doc.resources[0].resources[0];
//! assert_eq!(org.parent_url, "/orgs");
//! assert_eq!(org.relative_uri, "/{orgId}");
//! assert_eq!(org.all_uri_parameters[0].display_name, "orgId");
//! ```

mod enrich;
mod error;
mod loader;
mod ordered_map;
mod pipeline;
mod source;
mod types;

pub use enrich::{
    decode_schemas, enrich, index_documentation, normalize_base_uri, rename_errors,
    walk_resources,
};
pub use error::{LoadError, Raml2ObjError};
pub use loader::{document_from_yaml, is_url, LoadOptions, RamlLoader, YamlLoader};
pub use ordered_map::OrderedMap;
pub use pipeline::{parse, parse_with};
pub use source::{resolve_source, Source};
pub use types::{
    DocSection, Document, Method, Resource, SharedParameters, UriParameter,
    ERROR_ANNOTATION_KEY, HTTP_METHODS,
};
