//! JSON import/export of the schema model.
//!
//! Import accepts the current collection shape and the legacy one with
//! fields stored directly on the collection. Export is a lossy
//! `collection → document → field → value` projection.

use crate::geometry::Point;
use crate::model::{Collection, Document, Field, ModelError, SchemaModel};
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

/// Id and name of the document synthesized for legacy collections.
pub const LEGACY_DOCUMENT_ID: &str = "default-doc";
pub const LEGACY_DOCUMENT_NAME: &str = "Sample Document";

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid schema format: missing \"collections\"")]
    MissingCollections,
    #[error("Invalid schema format: \"collections\" must be an array")]
    CollectionsNotArray,
    #[error("Invalid collection at index {index}: {source}")]
    InvalidCollection {
        index: usize,
        source: serde_json::Error,
    },
    #[error("Invalid schema: {0}")]
    Model(#[from] ModelError),
}

enum RawCollection {
    Current(Collection),
    Legacy(LegacyCollection),
}

#[derive(Deserialize)]
struct LegacyCollection {
    id: String,
    name: String,
    fields: Vec<Field>,
    #[serde(default)]
    position: Point,
}

impl RawCollection {
    fn upgrade(self) -> Collection {
        match self {
            RawCollection::Current(c) => c,
            RawCollection::Legacy(legacy) => {
                let documents = if legacy.fields.is_empty() {
                    Vec::new()
                } else {
                    vec![Document {
                        id: LEGACY_DOCUMENT_ID.to_string(),
                        name: LEGACY_DOCUMENT_NAME.to_string(),
                        fields: legacy.fields,
                    }]
                };
                Collection {
                    id: legacy.id,
                    name: legacy.name,
                    documents,
                    position: legacy.position,
                }
            }
        }
    }
}

/// Parse an import payload. Any problem rejects the whole payload.
pub fn import_json(input: &str) -> Result<SchemaModel, ImportError> {
    let result = parse(input);
    match &result {
        Ok(model) => info!(collections = model.collections().len(), "imported schema"),
        Err(e) => warn!(error = %e, "rejected schema import"),
    }
    result
}

fn parse(input: &str) -> Result<SchemaModel, ImportError> {
    let root: Value = serde_json::from_str(input)?;
    let items = match root.get("collections") {
        None => return Err(ImportError::MissingCollections),
        Some(Value::Array(items)) => items,
        Some(_) => return Err(ImportError::CollectionsNotArray),
    };

    let collections = items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            // `documents` wins over a stray `fields` key.
            let raw = if item.get("documents").is_none() && item.get("fields").is_some() {
                LegacyCollection::deserialize(item).map(RawCollection::Legacy)
            } else {
                Collection::deserialize(item).map(RawCollection::Current)
            };
            raw.map(RawCollection::upgrade)
                .map_err(|source| ImportError::InvalidCollection { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(SchemaModel::from_collections(collections)?)
}

/// Flatten to `{collection: {document: {field: value}}}`. Ids, positions and
/// types are dropped; later duplicate names overwrite earlier ones.
pub fn export_flat(model: &SchemaModel) -> Value {
    let mut root = Map::new();
    for collection in model.collections() {
        let mut docs = Map::new();
        for document in &collection.documents {
            let fields: Map<String, Value> = document
                .fields
                .iter()
                .map(|f| (f.name.clone(), Value::String(f.value.clone())))
                .collect();
            docs.insert(document.name.clone(), Value::Object(fields));
        }
        root.insert(collection.name.clone(), Value::Object(docs));
    }
    Value::Object(root)
}

pub fn export_json(model: &SchemaModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&export_flat(model))
}

/// Full current-shape document that [`import_json`] reads back unchanged.
pub fn save_json(model: &SchemaModel) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldSpec, FieldType};
    use serde_json::json;

    #[test]
    fn test_legacy_collection_upgraded() {
        let input = r#"{"collections":[{"id":"c1","name":"X","fields":[{"id":"f1","name":"a","value":"1","type":"string"}],"position":{"x":0,"y":0}}]}"#;
        let model = import_json(input).unwrap();

        let c = model.collection("c1").unwrap();
        assert_eq!(c.documents.len(), 1);
        assert_eq!(c.documents[0].id, LEGACY_DOCUMENT_ID);
        assert_eq!(c.documents[0].name, LEGACY_DOCUMENT_NAME);
        assert_eq!(
            c.documents[0].fields,
            vec![Field {
                id: "f1".to_string(),
                name: "a".to_string(),
                value: "1".to_string(),
                typ: FieldType::String,
                description: None,
                reference_collection: None,
            }]
        );
    }

    #[test]
    fn test_legacy_without_fields_has_no_documents() {
        let model = import_json(r#"{"collections":[{"id":"c1","name":"X","fields":[]}]}"#).unwrap();
        assert!(model.collection("c1").unwrap().documents.is_empty());
    }

    #[test]
    fn test_legacy_missing_value_defaults_empty() {
        let input = r#"{"collections":[{"id":"c1","name":"X","fields":[{"id":"f1","name":"owner","type":"reference","referenceCollection":"c1"}]}]}"#;
        let model = import_json(input).unwrap();
        let f = &model.collection("c1").unwrap().documents[0].fields[0];
        assert_eq!(f.value, "");
        assert_eq!(f.reference_target(), Some("c1"));
    }

    #[test]
    fn test_current_shape() {
        let input = json!({
            "collections": [{
                "id": "u1", "name": "Users", "position": {"x": 10, "y": 20},
                "documents": [{"id": "d1", "name": "alice", "fields": [
                    {"id": "f1", "name": "email", "value": "a@b.com", "type": "string",
                     "referenceCollection": "stray"}
                ]}]
            }]
        });
        let model = import_json(&input.to_string()).unwrap();
        let c = model.collection("u1").unwrap();
        assert_eq!(c.position, Point::new(10.0, 20.0));
        // non-reference fields never carry a target
        assert_eq!(c.documents[0].fields[0].reference_collection, None);
    }

    #[test]
    fn test_malformed_payloads_rejected() {
        assert!(matches!(import_json("not json"), Err(ImportError::Json(_))));
        assert!(matches!(import_json("{}"), Err(ImportError::MissingCollections)));
        assert!(matches!(
            import_json(r#"{"collections": {"a": 1}}"#),
            Err(ImportError::CollectionsNotArray)
        ));
    }

    #[test]
    fn test_one_bad_collection_rejects_all() {
        let input = r#"{"collections":[
            {"id":"c1","name":"ok","documents":[]},
            {"id":"c2","name":"bad","documents":[{"id":"d","name":"d","fields":[{"id":"f","name":"x","type":"uuid"}]}]}
        ]}"#;
        match import_json(input) {
            Err(ImportError::InvalidCollection { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected InvalidCollection, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_without_target_rejected() {
        let input = r#"{"collections":[{"id":"c1","name":"X","fields":[{"id":"f1","name":"owner","type":"reference"}]}]}"#;
        assert!(matches!(
            import_json(input),
            Err(ImportError::Model(ModelError::MissingReferenceTarget(_)))
        ));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let input = r#"{"collections":[{"id":"c1","name":"a","documents":[]},{"id":"c1","name":"b","documents":[]}]}"#;
        assert!(matches!(import_json(input), Err(ImportError::Model(_))));
    }

    #[test]
    fn test_export_flat() {
        let mut model = SchemaModel::new();
        let users = model.add_collection("users", None).unwrap();
        let doc = model.add_document(&users, "u1").unwrap();
        model
            .add_field(
                &users,
                &doc,
                FieldSpec::new("email", FieldType::String).with_value("a@b.com"),
            )
            .unwrap();

        assert_eq!(export_flat(&model), json!({"users": {"u1": {"email": "a@b.com"}}}));
    }

    #[test]
    fn test_export_keeps_model_order() {
        let mut model = SchemaModel::new();
        model.add_collection("zeta", None).unwrap();
        model.add_collection("alpha", None).unwrap();
        let out = export_json(&model).unwrap();
        assert!(out.find("zeta").unwrap() < out.find("alpha").unwrap());
    }

    #[test]
    fn test_save_then_import() {
        let mut model = SchemaModel::new();
        let users = model.add_collection("Users", Some(Point::new(5.0, 6.0))).unwrap();
        let posts = model.add_collection("Posts", None).unwrap();
        let doc = model.add_document(&posts, "p1").unwrap();
        model
            .add_field(
                &posts,
                &doc,
                FieldSpec::reference("author", users).with_description("who wrote it"),
            )
            .unwrap();

        let restored = import_json(&save_json(&model).unwrap()).unwrap();
        assert_eq!(restored.collections(), model.collections());
    }
}
