use crate::geometry::Point;
use crate::model::{FieldType, SchemaModel};

/// Rows shown on a card before collapsing into "+N more fields".
pub const DEFAULT_PREVIEW_ROWS: usize = 6;

/// Flattened view of the model: one node per collection, one edge per
/// reference field.
#[derive(Debug, Clone)]
pub struct GraphIR {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub label: String,
    pub position: Point,
    pub rows: Vec<FieldRow>,
    /// Distinct field names not shown in `rows`.
    pub hidden_rows: usize,
}

/// One distinct field name on a card, described by its first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRow {
    pub name: String,
    pub typ: FieldType,
    pub is_reference: bool,
    pub sample: String,
}

/// A `(source, target, field name)` triple of the reference relation.
/// The target may name a collection that no longer exists.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub label: String,
}

impl GraphIR {
    pub fn from_model(model: &SchemaModel, preview_rows: usize) -> Self {
        let nodes = model
            .collections()
            .iter()
            .map(|c| {
                let mut rows: Vec<FieldRow> = Vec::new();
                for field in c.fields() {
                    if rows.iter().any(|r| r.name == field.name) {
                        continue;
                    }
                    rows.push(FieldRow {
                        name: field.name.clone(),
                        typ: field.typ,
                        is_reference: field.reference_target().is_some(),
                        sample: if field.value.is_empty() {
                            "(empty)".to_string()
                        } else {
                            field.value.clone()
                        },
                    });
                }
                let hidden_rows = rows.len().saturating_sub(preview_rows);
                rows.truncate(preview_rows);

                Node {
                    id: c.id.clone(),
                    label: c.name.clone(),
                    position: c.position,
                    rows,
                    hidden_rows,
                }
            })
            .collect();

        GraphIR {
            nodes,
            edges: references(model),
        }
    }
}

/// Enumerate the reference relation in collection → document → field
/// order. Duplicates are kept: each reference field is its own edge.
pub fn references(model: &SchemaModel) -> Vec<Edge> {
    model
        .collections()
        .iter()
        .flat_map(|c| {
            c.fields().filter_map(move |f| {
                f.reference_target().map(|target| Edge {
                    from: c.id.clone(),
                    to: target.to_string(),
                    label: f.name.clone(),
                })
            })
        })
        .collect()
}
