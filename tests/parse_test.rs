//! Integration tests for the parse pipeline.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use raml2obj::{
    parse, parse_with, Document, LoadError, LoadOptions, Raml2ObjError, RamlLoader, Resource,
    Source,
};
use serde_json::{json, Value};
use tempfile::TempDir;

const ORGS_RAML: &str = r#"#%RAML 0.8
title: Orgs API
version: v1
baseUri: http://api.example.com/{version}
documentation:
  - title: Getting Started
    content: Read this first.
schemas:
  - Org: '{"type":"object","properties":{"name":{"type":"string"}}}'
  - Member: '{"type":"object"}'
(errors):
  - code: 404
    description: Not found
/orgs:
  get:
  /{orgId2}:
    uriParameters:
      orgId2:
        type: string
    get:
    delete:
    /members:
      get:
      /{memberId}:
        get:
        put:
/health:
  get:
"#;

/// Records which entry point was used and with which options.
#[derive(Default)]
struct RecordingLoader {
    calls: Mutex<Vec<(String, String, bool)>>,
}

impl RecordingLoader {
    fn calls(&self) -> Vec<(String, String, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RamlLoader for RecordingLoader {
    async fn load_file(
        &self,
        location: &str,
        options: &LoadOptions,
    ) -> Result<Document, LoadError> {
        self.calls
            .lock()
            .unwrap()
            .push(("file".into(), location.into(), options.validate));
        Ok(Document::default())
    }

    async fn load_str(&self, content: &str, options: &LoadOptions) -> Result<Document, LoadError> {
        self.calls
            .lock()
            .unwrap()
            .push(("str".into(), content.into(), options.validate));
        Ok(Document::default())
    }
}

fn write_temp_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

fn for_each_resource<'a>(resources: &'a [Resource], f: &mut impl FnMut(&'a Resource)) {
    for resource in resources {
        f(resource);
        for_each_resource(&resource.resources, f);
    }
}

// === Source Resolution Tests ===

mod source_resolution {
    use super::*;

    #[tokio::test]
    async fn raw_string_uses_content_entry_point() {
        let loader = RecordingLoader::default();
        parse_with("title: Inline\n", &loader).await.unwrap();

        assert_eq!(
            loader.calls(),
            [("str".to_string(), "title: Inline\n".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn bytes_are_decoded_to_text() {
        let loader = RecordingLoader::default();
        parse_with(b"title: Bytes\n".to_vec(), &loader).await.unwrap();

        assert_eq!(
            loader.calls(),
            [("str".to_string(), "title: Bytes\n".to_string(), false)]
        );
    }

    #[tokio::test]
    async fn existing_path_uses_file_entry_point() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(&dir, "api.raml", ORGS_RAML);

        let loader = RecordingLoader::default();
        parse_with(path.as_path(), &loader).await.unwrap();

        let calls = loader.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "file");
        assert_eq!(calls[0].1, path.to_str().unwrap());
        assert!(!calls[0].2);
    }

    #[tokio::test]
    async fn url_uses_file_entry_point() {
        let loader = RecordingLoader::default();
        parse_with("https://api.example.com/api.raml", &loader)
            .await
            .unwrap();

        assert_eq!(
            loader.calls(),
            [(
                "file".to_string(),
                "https://api.example.com/api.raml".to_string(),
                false
            )]
        );
    }

    #[tokio::test]
    async fn json_string_behaves_like_text() {
        let loader = RecordingLoader::default();
        parse_with(json!("title: Json\n"), &loader).await.unwrap();
        assert_eq!(loader.calls()[0].0, "str");
    }

    #[tokio::test]
    async fn prebuilt_document_skips_the_loader_but_is_enriched() {
        let mut users = Resource::new("/users");
        users.resources.push(Resource::new("/{userId1}"));
        let doc = Document {
            base_uri: Some("http://api.example.com/{version}".into()),
            version: Some("v3".into()),
            resources: vec![users],
            error_annotation: Some(json!([{ "code": 500 }])),
            ..Document::default()
        };

        let loader = RecordingLoader::default();
        let doc = parse_with(doc, &loader).await.unwrap();

        assert!(loader.calls().is_empty());
        assert_eq!(doc.base_uri.as_deref(), Some("http://api.example.com/v3"));
        assert_eq!(doc.resources[0].resources[0].parent_url, "/users");
        assert_eq!(doc.resources[0].resources[0].relative_uri, "/{userId}");
        assert_eq!(doc.parsed_schemas, Some(serde_json::Map::new()));
        assert_eq!(doc.errors, Some(json!([{ "code": 500 }])));
    }

    #[tokio::test]
    async fn json_object_skips_the_loader() {
        let loader = RecordingLoader::default();
        let doc = parse_with(
            json!({
                "title": "Object",
                "resources": [{ "relativeUri": "/things" }],
                "schemas": [{ "Thing": "{\"type\":\"object\"}" }]
            }),
            &loader,
        )
        .await
        .unwrap();

        assert!(loader.calls().is_empty());
        assert_eq!(doc.resources[0].unique_id, "things");
        assert_eq!(
            doc.parsed_schemas.unwrap()["Thing"],
            json!({ "type": "object" })
        );
    }

    #[tokio::test]
    async fn non_document_values_are_rejected() {
        for value in [json!(42), Value::Null, json!(true), json!([1, 2])] {
            let loader = RecordingLoader::default();
            let result = parse_with(value, &loader).await;
            assert!(
                matches!(result, Err(Raml2ObjError::InvalidSourceKind { .. })),
                "expected InvalidSourceKind, got {:?}",
                result
            );
            assert!(loader.calls().is_empty());
        }
    }

    #[tokio::test]
    async fn object_of_wrong_shape_is_rejected() {
        let result = parse(json!({ "resources": "not a list" })).await;
        assert!(matches!(result, Err(Raml2ObjError::InvalidDocument { .. })));
    }
}

// === End-to-end Enrichment Tests ===

mod enrichment {
    use super::*;

    async fn orgs_document() -> Document {
        parse(ORGS_RAML).await.unwrap()
    }

    #[tokio::test]
    async fn base_uri_is_versioned() {
        let doc = orgs_document().await;
        assert_eq!(doc.base_uri.as_deref(), Some("http://api.example.com/v1"));
    }

    #[tokio::test]
    async fn top_level_resources_keep_declaration_order() {
        let doc = orgs_document().await;
        let uris: Vec<&str> = doc
            .resources
            .iter()
            .map(|r| r.relative_uri.as_str())
            .collect();
        assert_eq!(uris, ["/orgs", "/health"]);
        assert!(doc.resources.iter().all(|r| r.parent_url.is_empty()));
    }

    #[tokio::test]
    async fn parent_url_is_parent_path() {
        let doc = orgs_document().await;

        fn check(parent: &Resource) {
            for child in &parent.resources {
                assert_eq!(
                    child.parent_url,
                    format!("{}{}", parent.parent_url, parent.relative_uri)
                );
                check(child);
            }
        }
        for root in &doc.resources {
            check(root);
        }

        let member = &doc.resources[0].resources[0].resources[0].resources[0];
        assert_eq!(member.parent_url, "/orgs/{orgId}/members");
        assert_eq!(member.unique_id, "orgs__orgId__members__memberId_");
    }

    #[tokio::test]
    async fn disambiguated_names_are_stripped() {
        let doc = orgs_document().await;
        let org = &doc.resources[0].resources[0];

        assert_eq!(org.relative_uri, "/{orgId}");
        let declared = org.uri_parameters.as_ref().unwrap();
        assert_eq!(declared.get("orgId2").unwrap().display_name, "orgId");
    }

    #[tokio::test]
    async fn all_uri_parameters_accumulate_down_the_tree() {
        let doc = orgs_document().await;
        let names = |r: &Resource| -> Vec<String> {
            r.all_uri_parameters
                .iter()
                .map(|p| p.display_name.clone())
                .collect()
        };

        let orgs = &doc.resources[0];
        let org = &orgs.resources[0];
        let members = &org.resources[0];
        let member = &members.resources[0];

        assert!(names(orgs).is_empty());
        assert_eq!(names(org), ["orgId"]);
        assert_eq!(names(members), ["orgId"]);
        assert_eq!(names(member), ["orgId", "memberId"]);
    }

    #[tokio::test]
    async fn methods_share_their_resource_list() {
        let doc = orgs_document().await;
        let mut methods_seen = 0;

        for_each_resource(&doc.resources, &mut |resource| {
            if let Some(methods) = &resource.methods {
                for method in methods.values() {
                    methods_seen += 1;
                    assert!(Arc::ptr_eq(
                        &method.all_uri_parameters,
                        &resource.all_uri_parameters
                    ));
                }
            }
        });
        assert_eq!(methods_seen, 7);
    }

    #[tokio::test]
    async fn documentation_gets_unique_ids() {
        let doc = orgs_document().await;
        assert_eq!(doc.documentation[0].unique_id, "Getting-Started");
    }

    #[tokio::test]
    async fn schemas_are_decoded() {
        let doc = orgs_document().await;
        let parsed = doc.parsed_schemas.unwrap();
        assert_eq!(parsed["Member"], json!({ "type": "object" }));
        assert_eq!(parsed["Org"]["properties"]["name"]["type"], "string");
    }

    #[tokio::test]
    async fn error_annotation_becomes_errors() {
        let doc = orgs_document().await;
        assert_eq!(
            doc.errors,
            Some(json!([{ "code": 404, "description": "Not found" }]))
        );
        assert!(doc.error_annotation.is_none());

        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("(errors)").is_none());
        assert_eq!(value["errors"][0]["code"], 404);
    }

    #[tokio::test]
    async fn enrichment_is_repeatable() {
        let first = orgs_document().await;
        let second = orgs_document().await;
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn serialized_tree_uses_camel_case() {
        let doc = orgs_document().await;
        let value = serde_json::to_value(&doc).unwrap();
        let org = &value["resources"][0]["resources"][0];

        assert_eq!(org["parentUrl"], "/orgs");
        assert_eq!(org["uniqueId"], "orgs__orgId2_");
        assert_eq!(org["allUriParameters"][0]["displayName"], "orgId");
        assert_eq!(
            org["methods"]["get"]["allUriParameters"][0]["displayName"],
            "orgId"
        );
    }
}

// === Error Handling Tests ===

mod error_handling {
    use super::*;

    #[tokio::test]
    async fn missing_file_path_is_parsed_as_content() {
        // Not an existing file, so the text itself is treated as RAML
        let result = parse("/no/such/api.raml").await;
        assert!(matches!(
            result,
            Err(Raml2ObjError::Load(LoadError::InvalidDocument { .. }))
        ));
    }

    #[tokio::test]
    async fn malformed_yaml_is_a_load_error() {
        let result = parse("title: [unclosed\n").await;
        match result {
            Err(err @ Raml2ObjError::Load(LoadError::InvalidYaml { .. })) => {
                assert_eq!(err.exit_code(), 2)
            }
            other => panic!("expected InvalidYaml, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn bad_schema_aborts_the_pipeline() {
        let raml = "title: T\nschemas:\n  - Good: '{}'\n  - Bad: '{oops'\n";
        let result = parse(raml).await;
        match result {
            Err(Raml2ObjError::SchemaDecode { name, .. }) => assert_eq!(name, "Bad"),
            other => panic!("expected SchemaDecode, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn loader_failures_propagate_unchanged() {
        struct FailingLoader;

        #[async_trait]
        impl RamlLoader for FailingLoader {
            async fn load_file(
                &self,
                location: &str,
                _options: &LoadOptions,
            ) -> Result<Document, LoadError> {
                Err(LoadError::FileNotFound {
                    path: location.into(),
                })
            }

            async fn load_str(
                &self,
                _content: &str,
                _options: &LoadOptions,
            ) -> Result<Document, LoadError> {
                Err(LoadError::InvalidDocument {
                    message: "rejected".into(),
                })
            }
        }

        let source = Source::from("http://unreachable.invalid/api.raml");
        let result = parse_with(source, &FailingLoader).await;
        match result {
            Err(err @ Raml2ObjError::Load(LoadError::FileNotFound { .. })) => {
                assert_eq!(err.exit_code(), 3)
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }
}

// === File and URL Loading Tests ===

mod loading {
    use super::*;

    #[tokio::test]
    async fn parse_from_file() {
        let dir = TempDir::new().unwrap();
        let path = write_temp_file(&dir, "api.raml", ORGS_RAML);

        let doc = parse(path).await.unwrap();
        assert_eq!(doc.title.as_deref(), Some("Orgs API"));
        assert_eq!(doc.resources.len(), 2);
    }

    #[tokio::test]
    async fn parse_from_bytes() {
        let doc = parse(ORGS_RAML.as_bytes()).await.unwrap();
        assert_eq!(doc.title.as_deref(), Some("Orgs API"));
    }

    #[cfg(feature = "remote")]
    #[tokio::test]
    async fn parse_from_url() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api.raml")
            .with_status(200)
            .with_header("content-type", "application/raml+yaml")
            .with_body(ORGS_RAML)
            .create_async()
            .await;

        let doc = parse(format!("{}/api.raml", server.url())).await.unwrap();

        mock.assert_async().await;
        assert_eq!(doc.base_uri.as_deref(), Some("http://api.example.com/v1"));
        assert_eq!(doc.resources[0].resources[0].relative_uri, "/{orgId}");
    }

    #[cfg(feature = "remote")]
    #[tokio::test]
    async fn url_http_error_is_network_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/missing.raml")
            .with_status(404)
            .create_async()
            .await;

        let result = parse(format!("{}/missing.raml", server.url())).await;
        match result {
            Err(err @ Raml2ObjError::Load(LoadError::NetworkError { .. })) => {
                assert_eq!(err.exit_code(), 3)
            }
            other => panic!("expected NetworkError, got {:?}", other),
        }
    }
}
