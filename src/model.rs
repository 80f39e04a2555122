//! Schema model: collections own documents, documents own typed fields.
//!
//! All mutation goes through [`SchemaModel`] methods; callers only ever get
//! shared references to the collections.

use crate::geometry::Point;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where new collections land when no position is given.
pub const DEFAULT_POSITION: Point = Point::new(100.0, 100.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Map,
    Array,
    Null,
    Timestamp,
    Geopoint,
    Reference,
}

impl FieldType {
    pub const ALL: [FieldType; 9] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Boolean,
        FieldType::Map,
        FieldType::Array,
        FieldType::Null,
        FieldType::Timestamp,
        FieldType::Geopoint,
        FieldType::Reference,
    ];

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Map => "map",
            Self::Array => "array",
            Self::Null => "null",
            Self::Timestamp => "timestamp",
            Self::Geopoint => "geopoint",
            Self::Reference => "reference",
        }
    }

    /// Short glyph shown next to a field on its card.
    pub fn icon(self) -> &'static str {
        match self {
            Self::String => "T",
            Self::Number => "#",
            Self::Boolean => "B",
            Self::Timestamp => "D",
            Self::Array => "[]",
            Self::Map => "{}",
            Self::Reference => "→",
            Self::Geopoint => "G",
            Self::Null => "∅",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type")]
    pub typ: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_collection: Option<String>,
}

impl Field {
    /// Target collection id, only for reference fields.
    pub fn reference_target(&self) -> Option<&str> {
        match self.typ {
            FieldType::Reference => self.reference_collection.as_deref(),
            _ => None,
        }
    }

    /// Drop a stray `reference_collection` on non-reference fields and
    /// reject reference fields without a target.
    pub(crate) fn normalize(&mut self) -> Result<(), ModelError> {
        if self.typ != FieldType::Reference {
            self.reference_collection = None;
            return Ok(());
        }
        match self.reference_collection.as_deref().map(str::trim) {
            Some(target) if !target.is_empty() => Ok(()),
            _ => Err(ModelError::MissingReferenceTarget(self.name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub documents: Vec<Document>,
    #[serde(default)]
    pub position: Point,
}

impl Collection {
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.documents.iter().flat_map(|d| d.fields.iter())
    }
}

/// Input for creating or replacing a field.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub value: String,
    #[serde(rename = "type", default)]
    pub typ: FieldType,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub reference_collection: Option<String>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, typ: FieldType) -> Self {
        Self {
            name: name.into(),
            typ,
            ..Self::default()
        }
    }

    pub fn reference(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: FieldType::Reference,
            reference_collection: Some(target.into()),
            ..Self::default()
        }
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn into_field(self, id: String) -> Result<Field, ModelError> {
        let mut field = Field {
            id,
            name: self.name,
            value: self.value,
            typ: self.typ,
            description: self.description,
            reference_collection: self.reference_collection,
        };
        field.normalize()?;
        Ok(field)
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelError {
    #[error("Unknown collection: {0}")]
    UnknownCollection(String),
    #[error("Unknown document: {0}")]
    UnknownDocument(String),
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Duplicate collection id: {0}")]
    DuplicateCollection(String),
    #[error("Name must not be empty")]
    EmptyName,
    #[error("Reference field {0} has no target collection")]
    MissingReferenceTarget(String),
}

/// The collections on the canvas, in creation (and draw) order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SchemaModel {
    collections: Vec<Collection>,
    #[serde(skip)]
    next_id: u64,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a model from already-shaped collections, e.g. after import.
    pub fn from_collections(mut collections: Vec<Collection>) -> Result<Self, ModelError> {
        for (i, c) in collections.iter().enumerate() {
            if collections[..i].iter().any(|prev| prev.id == c.id) {
                return Err(ModelError::DuplicateCollection(c.id.clone()));
            }
        }
        for field in collections
            .iter_mut()
            .flat_map(|c| c.documents.iter_mut())
            .flat_map(|d| d.fields.iter_mut())
        {
            field.normalize()?;
        }
        Ok(Self {
            collections,
            next_id: 0,
        })
    }

    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.collections.iter().find(|c| c.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.collections.is_empty()
    }

    pub fn add_collection(
        &mut self,
        name: &str,
        position: Option<Point>,
    ) -> Result<String, ModelError> {
        let name = non_empty(name)?;
        let id = self.fresh_id('c');
        let position = position.unwrap_or(DEFAULT_POSITION).clamp_non_negative();
        debug!(%id, name, "add collection");
        self.collections.push(Collection {
            id: id.clone(),
            name,
            documents: Vec::new(),
            position,
        });
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<(), ModelError> {
        let name = non_empty(name)?;
        self.collection_mut(id)?.name = name;
        Ok(())
    }

    /// Remove a collection. Fields elsewhere that point at it stay in place
    /// and simply stop producing edges.
    pub fn delete_collection(&mut self, id: &str) -> Result<Collection, ModelError> {
        let idx = self
            .collections
            .iter()
            .position(|c| c.id == id)
            .ok_or_else(|| ModelError::UnknownCollection(id.to_string()))?;
        debug!(id, "delete collection");
        Ok(self.collections.remove(idx))
    }

    /// Commit a new world position, clamped to non-negative coordinates.
    /// Returns the position actually stored.
    pub fn move_node(&mut self, id: &str, position: Point) -> Result<Point, ModelError> {
        let committed = position.clamp_non_negative();
        self.collection_mut(id)?.position = committed;
        Ok(committed)
    }

    pub fn add_document(&mut self, collection_id: &str, name: &str) -> Result<String, ModelError> {
        let name = non_empty(name)?;
        self.collection_mut(collection_id)?;
        let id = self.fresh_id('d');
        self.collection_mut(collection_id)?.documents.push(Document {
            id: id.clone(),
            name,
            fields: Vec::new(),
        });
        Ok(id)
    }

    pub fn rename_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
        name: &str,
    ) -> Result<(), ModelError> {
        let name = non_empty(name)?;
        self.document_mut(collection_id, document_id)?.name = name;
        Ok(())
    }

    pub fn delete_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<Document, ModelError> {
        let documents = &mut self.collection_mut(collection_id)?.documents;
        let idx = documents
            .iter()
            .position(|d| d.id == document_id)
            .ok_or_else(|| ModelError::UnknownDocument(document_id.to_string()))?;
        Ok(documents.remove(idx))
    }

    pub fn add_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        spec: FieldSpec,
    ) -> Result<String, ModelError> {
        if spec.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        self.document_mut(collection_id, document_id)?;
        let mut field = spec.into_field(String::new())?;
        let id = self.fresh_id('f');
        field.id = id.clone();
        self.document_mut(collection_id, document_id)?.fields.push(field);
        Ok(id)
    }

    /// Replace a field's content, keeping its id and place in the document.
    pub fn update_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
        spec: FieldSpec,
    ) -> Result<(), ModelError> {
        if spec.name.trim().is_empty() {
            return Err(ModelError::EmptyName);
        }
        let field = self
            .document_mut(collection_id, document_id)?
            .fields
            .iter_mut()
            .find(|f| f.id == field_id)
            .ok_or_else(|| ModelError::UnknownField(field_id.to_string()))?;
        *field = spec.into_field(field_id.to_string())?;
        Ok(())
    }

    pub fn delete_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
    ) -> Result<Field, ModelError> {
        let fields = &mut self.document_mut(collection_id, document_id)?.fields;
        let idx = fields
            .iter()
            .position(|f| f.id == field_id)
            .ok_or_else(|| ModelError::UnknownField(field_id.to_string()))?;
        Ok(fields.remove(idx))
    }

    fn collection_mut(&mut self, id: &str) -> Result<&mut Collection, ModelError> {
        self.collections
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ModelError::UnknownCollection(id.to_string()))
    }

    fn document_mut(
        &mut self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<&mut Document, ModelError> {
        self.collection_mut(collection_id)?
            .documents
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| ModelError::UnknownDocument(document_id.to_string()))
    }

    /// Next `<prefix><n>` id not already used anywhere in the model.
    fn fresh_id(&mut self, prefix: char) -> String {
        loop {
            self.next_id += 1;
            let candidate = format!("{}{}", prefix, self.next_id);
            if !self.id_in_use(&candidate) {
                return candidate;
            }
        }
    }

    fn id_in_use(&self, id: &str) -> bool {
        self.collections.iter().any(|c| {
            c.id == id
                || c.documents
                    .iter()
                    .any(|d| d.id == id || d.fields.iter().any(|f| f.id == id))
        })
    }
}

fn non_empty(name: &str) -> Result<String, ModelError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        Err(ModelError::EmptyName)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users_and_posts() -> (SchemaModel, String, String) {
        let mut model = SchemaModel::new();
        let users = model.add_collection("Users", None).unwrap();
        let posts = model
            .add_collection("Posts", Some(Point::new(400.0, 100.0)))
            .unwrap();
        let doc = model.add_document(&posts, "post1").unwrap();
        model
            .add_field(&posts, &doc, FieldSpec::reference("author", users.clone()))
            .unwrap();
        (model, users, posts)
    }

    #[test]
    fn test_add_collection_defaults() {
        let mut model = SchemaModel::new();
        let id = model.add_collection("  Users ", None).unwrap();
        let c = model.collection(&id).unwrap();
        assert_eq!(c.name, "Users");
        assert_eq!(c.position, DEFAULT_POSITION);
        assert!(c.documents.is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut model = SchemaModel::new();
        assert_eq!(model.add_collection("   ", None), Err(ModelError::EmptyName));
    }

    #[test]
    fn test_ids_are_unique_across_kinds() {
        let (model, users, posts) = users_and_posts();
        let c = model.collection(&posts).unwrap();
        let doc_id = &c.documents[0].id;
        let field_id = &c.documents[0].fields[0].id;
        let ids = [&users, &posts, doc_id, field_id];
        for (i, a) in ids.iter().enumerate() {
            for b in &ids[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn test_fresh_id_skips_imported_ids() {
        let mut model = SchemaModel::from_collections(vec![Collection {
            id: "c1".to_string(),
            name: "Imported".to_string(),
            documents: vec![],
            position: Point::ORIGIN,
        }])
        .unwrap();
        let id = model.add_collection("New", None).unwrap();
        assert_ne!(id, "c1");
    }

    #[test]
    fn test_duplicate_collection_ids_rejected() {
        let c = Collection {
            id: "x".to_string(),
            name: "X".to_string(),
            documents: vec![],
            position: Point::ORIGIN,
        };
        assert_eq!(
            SchemaModel::from_collections(vec![c.clone(), c]),
            Err(ModelError::DuplicateCollection("x".to_string()))
        );
    }

    #[test]
    fn test_move_node_clamps() {
        let (mut model, users, _) = users_and_posts();
        let committed = model.move_node(&users, Point::new(-20.0, 35.0)).unwrap();
        assert_eq!(committed, Point::new(0.0, 35.0));
        assert_eq!(model.collection(&users).unwrap().position, committed);
    }

    #[test]
    fn test_move_unknown_node() {
        let mut model = SchemaModel::new();
        assert_eq!(
            model.move_node("nope", Point::ORIGIN),
            Err(ModelError::UnknownCollection("nope".to_string()))
        );
    }

    #[test]
    fn test_delete_collection_leaves_dangling_field() {
        let (mut model, users, posts) = users_and_posts();
        model.delete_collection(&users).unwrap();
        let field = model.collection(&posts).unwrap().fields().next().unwrap().clone();
        assert_eq!(field.reference_target(), Some(users.as_str()));
    }

    #[test]
    fn test_reference_collection_only_on_reference_fields() {
        let (mut model, users, posts) = users_and_posts();
        let doc = model.collection(&posts).unwrap().documents[0].id.clone();
        let field = model.collection(&posts).unwrap().documents[0].fields[0].id.clone();

        let mut spec = FieldSpec::new("author", FieldType::String).with_value("bob");
        spec.reference_collection = Some(users);
        model.update_field(&posts, &doc, &field, spec).unwrap();

        let f = &model.collection(&posts).unwrap().documents[0].fields[0];
        assert_eq!(f.id, field);
        assert_eq!(f.value, "bob");
        assert_eq!(f.reference_collection, None);
    }

    #[test]
    fn test_reference_field_requires_target() {
        let (mut model, _, posts) = users_and_posts();
        let doc = model.collection(&posts).unwrap().documents[0].id.clone();
        let field = model.collection(&posts).unwrap().documents[0].fields[0].id.clone();

        assert_eq!(
            model.add_field(&posts, &doc, FieldSpec::new("owner", FieldType::Reference)),
            Err(ModelError::MissingReferenceTarget("owner".to_string()))
        );
        assert_eq!(
            model.add_field(&posts, &doc, FieldSpec::reference("owner", "  ")),
            Err(ModelError::MissingReferenceTarget("owner".to_string()))
        );
        assert_eq!(
            model.update_field(
                &posts,
                &doc,
                &field,
                FieldSpec::new("author", FieldType::Reference)
            ),
            Err(ModelError::MissingReferenceTarget("author".to_string()))
        );
        // the rejected update left the field alone
        let fields = &model.collection(&posts).unwrap().documents[0].fields;
        assert_eq!(fields.len(), 1);
        assert!(fields[0].reference_target().is_some());
    }

    #[test]
    fn test_imported_reference_without_target_rejected() {
        let c = Collection {
            id: "c1".to_string(),
            name: "Posts".to_string(),
            documents: vec![Document {
                id: "d1".to_string(),
                name: "p".to_string(),
                fields: vec![Field {
                    id: "f1".to_string(),
                    name: "author".to_string(),
                    value: String::new(),
                    typ: FieldType::Reference,
                    description: None,
                    reference_collection: None,
                }],
            }],
            position: Point::ORIGIN,
        };
        assert_eq!(
            SchemaModel::from_collections(vec![c]),
            Err(ModelError::MissingReferenceTarget("author".to_string()))
        );
    }

    #[test]
    fn test_document_and_field_lifecycle() {
        let (mut model, _, posts) = users_and_posts();
        let doc = model.add_document(&posts, "post2").unwrap();
        model.rename_document(&posts, &doc, "second").unwrap();
        let fid = model
            .add_field(&posts, &doc, FieldSpec::new("title", FieldType::String))
            .unwrap();
        assert_eq!(model.collection(&posts).unwrap().documents[1].name, "second");

        let removed = model.delete_field(&posts, &doc, &fid).unwrap();
        assert_eq!(removed.name, "title");
        model.delete_document(&posts, &doc).unwrap();
        assert_eq!(model.collection(&posts).unwrap().documents.len(), 1);
        assert_eq!(
            model.delete_document(&posts, &doc),
            Err(ModelError::UnknownDocument(doc))
        );
    }

    #[test]
    fn test_field_type_names() {
        for t in FieldType::ALL {
            assert_eq!(FieldType::from_str(t.as_str()), Some(t));
        }
        assert_eq!(FieldType::from_str("uuid"), None);
    }
}
