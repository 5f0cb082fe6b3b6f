//! Request-level service tests: nested components, API scaffolding and categories

mod common;

use async_trait::async_trait;
use common::{attributes, component_input, content_type_input, relation, TestApp};
use schema_builder::schema::types::{
    Attribute, CategoryInput, ComponentAttribute, ComponentInput, ComponentRequest, ContentKind,
    ContentTypeInput, ContentTypeRequest, DynamicZoneAttribute, RelationAttribute, RelationKind,
};
use schema_builder::{ApiDescriptor, ApiGenerator, SchemaBuilderError, SchemaResult, SchemaService};
use serde_json::json;
use std::sync::Mutex;

/// Generator that records every call and can be told to fail generation
#[derive(Default)]
struct RecordingApi {
    calls: Mutex<Vec<String>>,
    fail_generate: bool,
}

impl RecordingApi {
    fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ApiGenerator for RecordingApi {
    async fn generate(&self, api: &ApiDescriptor) -> SchemaResult<()> {
        self.record(format!("generate {} {}", api.uid, api.kind.as_str()));
        if self.fail_generate {
            return Err(SchemaBuilderError::ApiGenerator("disk full".into()));
        }
        Ok(())
    }

    async fn backup(&self, uid: &str) -> SchemaResult<()> {
        self.record(format!("backup {}", uid));
        Ok(())
    }

    async fn clear(&self, uid: &str) -> SchemaResult<()> {
        self.record(format!("clear {}", uid));
        Ok(())
    }

    async fn rollback(&self, uid: &str) -> SchemaResult<()> {
        self.record(format!("rollback {}", uid));
        Ok(())
    }
}

#[tokio::test]
async fn test_create_content_type_with_nested_components() {
    let app = TestApp::new();
    let service = SchemaService::new(app.config.clone(), RecordingApi::default());

    let request = ContentTypeRequest {
        content_type: content_type_input(
            "article",
            attributes([
                ("title", Attribute::scalar("string")),
                ("seo", ComponentAttribute::new("tmp-seo").into()),
                (
                    "blocks",
                    DynamicZoneAttribute::new(vec!["tmp-quote".into(), "shared.unknown".into()]).into(),
                ),
            ]),
        ),
        components: vec![
            ComponentInput {
                tmp_uid: Some("tmp-seo".into()),
                ..component_input(
                    "shared",
                    "Seo",
                    attributes([(
                        "article",
                        RelationAttribute::new(RelationKind::OneToOne, "__contentType__").into(),
                    )]),
                )
            },
            ComponentInput {
                tmp_uid: Some("tmp-quote".into()),
                ..component_input("shared", "Quote", attributes([("text", Attribute::scalar("text"))]))
            },
        ],
    };

    let document = service
        .create_content_type(&app.registry().await, &request)
        .await
        .unwrap();
    assert_eq!(document.uid, "api::article.article");

    let article = app.read(app.content_type_path("article")).await;
    assert_eq!(article["attributes"]["seo"]["component"], json!("shared.seo"));
    assert_eq!(
        article["attributes"]["blocks"]["components"],
        json!(["shared.quote", "shared.unknown"])
    );

    let seo = app.read(app.component_path("shared", "seo")).await;
    assert_eq!(
        seo["attributes"]["article"],
        json!({ "type": "relation", "relation": "oneToOne", "target": "api::article.article" })
    );
    assert!(app.component_path("shared", "quote").exists());

    assert_eq!(
        service.api().calls(),
        vec!["generate api::article.article collectionType"]
    );
}

#[tokio::test]
async fn test_kind_change_regenerates_api() {
    let app = TestApp::new();
    app.write_content_type("home", json!({})).await;
    let service = SchemaService::new(app.config.clone(), RecordingApi::default());

    let request = ContentTypeRequest {
        content_type: ContentTypeInput {
            kind: Some(ContentKind::SingleType),
            ..content_type_input("home", attributes([("title", Attribute::scalar("string"))]))
        },
        components: vec![],
    };
    service
        .edit_content_type(&app.registry().await, "api::home.home", &request)
        .await
        .unwrap();

    let home = app.read(app.content_type_path("home")).await;
    assert_eq!(home["kind"], json!("singleType"));
    assert_eq!(
        service.api().calls(),
        vec![
            "backup api::home.home",
            "clear api::home.home",
            "generate api::home.home singleType"
        ]
    );
}

#[tokio::test]
async fn test_failed_api_generation_restores_api_and_writes_nothing() {
    let app = TestApp::new();
    app.write_content_type("home", json!({})).await;
    let before = app.read(app.content_type_path("home")).await;
    let service = SchemaService::new(app.config.clone(), RecordingApi::failing());

    let request = ContentTypeRequest {
        content_type: ContentTypeInput {
            kind: Some(ContentKind::SingleType),
            ..content_type_input("home", attributes([("title", Attribute::scalar("string"))]))
        },
        components: vec![],
    };
    let err = service
        .edit_content_type(&app.registry().await, "api::home.home", &request)
        .await
        .unwrap_err();

    assert!(matches!(err, SchemaBuilderError::ApiGenerator(_)));
    assert_eq!(app.read(app.content_type_path("home")).await, before);
    assert_eq!(
        service.api().calls().last().map(String::as_str),
        Some("rollback api::home.home")
    );
}

#[tokio::test]
async fn test_edit_without_kind_change_leaves_api_alone() {
    let app = TestApp::new();
    app.write_content_type("page", json!({})).await;
    let service = SchemaService::new(app.config.clone(), RecordingApi::default());

    let request = ContentTypeRequest {
        content_type: content_type_input("page", attributes([("body", Attribute::scalar("richtext"))])),
        components: vec![],
    };
    let document = service
        .edit_content_type(&app.registry().await, "api::page.page", &request)
        .await
        .unwrap();

    assert_eq!(document.schema["attributes"], json!({ "body": { "type": "richtext" } }));
    assert!(service.api().calls().is_empty());
}

#[tokio::test]
async fn test_delete_content_type_clears_api_and_mirrors() {
    let app = TestApp::new();
    app.write_content_type(
        "a",
        json!({ "items": { "type": "relation", "relation": "oneToMany", "target": "api::b.b", "mappedBy": "owner" } }),
    )
    .await;
    app.write_content_type(
        "b",
        json!({ "owner": { "type": "relation", "relation": "manyToOne", "target": "api::a.a", "inversedBy": "items" } }),
    )
    .await;
    let service = SchemaService::new(app.config.clone(), RecordingApi::default());

    service
        .delete_content_type(&app.registry().await, "api::b.b")
        .await
        .unwrap();

    assert!(!app.content_type_path("b").exists());
    assert_eq!(app.read(app.content_type_path("a")).await["attributes"], json!({}));
    assert_eq!(service.api().calls(), vec!["backup api::b.b", "clear api::b.b"]);

    let missing = service
        .delete_content_type(&app.registry().await, "api::b.b")
        .await
        .unwrap_err();
    assert!(matches!(missing, SchemaBuilderError::NotFound(_)));
}

#[tokio::test]
async fn test_unknown_content_type_is_not_found() {
    let app = TestApp::new();
    app.write_component("layout", "hero", json!({})).await;
    let service = SchemaService::new(app.config.clone(), RecordingApi::default());

    let request = ContentTypeRequest {
        content_type: content_type_input("ghost", attributes([("title", Attribute::scalar("string"))])),
        components: vec![],
    };
    let err = service
        .edit_content_type(&app.registry().await, "api::ghost.ghost", &request)
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaBuilderError::NotFound(_)));

    let err = service
        .delete_content_type(&app.registry().await, "layout.hero")
        .await
        .unwrap_err();
    assert!(matches!(err, SchemaBuilderError::NotFound(_)));

    assert!(app.component_path("layout", "hero").exists());
    assert!(service.api().calls().is_empty());
}

#[tokio::test]
async fn test_component_service_round_trip() {
    let app = TestApp::new();
    app.write_content_type("page", json!({})).await;
    let service = SchemaService::without_api(app.config.clone());

    let request = ComponentRequest {
        component: component_input(
            "layout",
            "Hero",
            attributes([
                ("title", Attribute::scalar("string")),
                ("cta", ComponentAttribute::new("tmp-cta").into()),
                ("page", relation(RelationKind::ManyToOne, "api::page.page", "heroes")),
            ]),
        ),
        components: vec![ComponentInput {
            tmp_uid: Some("tmp-cta".into()),
            ..component_input("layout", "Call To Action", attributes([("label", Attribute::scalar("string"))]))
        }],
    };
    let hero = service
        .create_component(&app.registry().await, &request)
        .await
        .unwrap();
    assert_eq!(hero.uid, "layout.hero");
    assert_eq!(hero.schema["attributes"]["cta"]["component"], json!("layout.call-to-action"));
    assert!(app.component_path("layout", "call-to-action").exists());

    let edit = ComponentRequest {
        component: component_input("layout", "Hero Banner", attributes([("title", Attribute::scalar("string"))])),
        components: vec![],
    };
    let edited = service
        .edit_component(&app.registry().await, "layout.hero", &edit)
        .await
        .unwrap();
    assert_eq!(edited.schema["info"]["displayName"], json!("Hero Banner"));

    service
        .delete_component(&app.registry().await, "layout.hero")
        .await
        .unwrap();
    assert!(!app.component_path("layout", "hero").exists());
    assert!(app.component_path("layout", "call-to-action").exists());
}

#[tokio::test]
async fn test_category_rename_moves_files_and_references() {
    let app = TestApp::new();
    app.write_component("layout", "hero", json!({ "title": { "type": "string" } }))
        .await;
    app.write_component(
        "layout",
        "section",
        json!({ "hero": { "type": "component", "component": "layout.hero" } }),
    )
    .await;
    app.write_content_type(
        "page",
        json!({ "blocks": { "type": "dynamiczone", "components": ["layout.hero", "layout.section"] } }),
    )
    .await;
    let service = SchemaService::without_api(app.config.clone());

    let renamed = service
        .edit_category(&app.registry().await, "layout", &CategoryInput { name: "Sections".into() })
        .await
        .unwrap();
    assert_eq!(renamed, "sections");

    assert!(!app.config.components_dir().join("layout").exists());
    assert!(app.component_path("sections", "hero").exists());
    let section = app.read(app.component_path("sections", "section")).await;
    assert_eq!(section["attributes"]["hero"]["component"], json!("sections.hero"));
    let page = app.read(app.content_type_path("page")).await;
    assert_eq!(
        page["attributes"]["blocks"]["components"],
        json!(["sections.hero", "sections.section"])
    );

    let registry = app.registry().await;
    let unchanged = service
        .edit_category(&registry, "sections", &CategoryInput { name: "Sections".into() })
        .await
        .unwrap();
    assert_eq!(unchanged, "sections");
}

#[tokio::test]
async fn test_category_rename_to_taken_name_fails() {
    let app = TestApp::new();
    app.write_component("layout", "hero", json!({})).await;
    app.write_component("shared", "quote", json!({})).await;
    let service = SchemaService::without_api(app.config.clone());

    let err = service
        .edit_category(&app.registry().await, "layout", &CategoryInput { name: "shared".into() })
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.to_string(), "Name already taken");
    assert!(app.component_path("layout", "hero").exists());
}

#[tokio::test]
async fn test_delete_category() {
    let app = TestApp::new();
    app.write_component("layout", "hero", json!({})).await;
    app.write_component("shared", "quote", json!({})).await;
    app.write_content_type(
        "page",
        json!({ "hero": { "type": "component", "component": "layout.hero" }, "title": { "type": "string" } }),
    )
    .await;
    let service = SchemaService::without_api(app.config.clone());

    service
        .delete_category(&app.registry().await, "layout")
        .await
        .unwrap();

    assert!(!app.config.components_dir().join("layout").exists());
    assert!(app.component_path("shared", "quote").exists());
    assert_eq!(
        app.read(app.content_type_path("page")).await["attributes"],
        json!({ "title": { "type": "string" } })
    );
}
