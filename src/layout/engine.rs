//! Edge router: reference relation + card rectangles → routed edges.

use std::collections::HashMap;

use tracing::debug;

use crate::config::{CanvasConfig, CardGeometry, CurveConfig, LabelConfig};
use crate::geometry::Rect;
use crate::ir::references;
use crate::model::{Collection, SchemaModel};

use super::anchors::calculate_anchors;
use super::routing::{label_plate, route_curve};
use super::types::LayoutEdge;

/// Source of world-space card rectangles.
pub trait NodeGeometry {
    fn rect_of(&self, collection: &Collection) -> Rect;
}

/// Committed model position plus the fixed logical card size.
#[derive(Debug, Clone, Copy)]
pub struct ModelGeometry {
    pub card: CardGeometry,
}

impl NodeGeometry for ModelGeometry {
    fn rect_of(&self, collection: &Collection) -> Rect {
        Rect::from_origin(collection.position, self.card.width, self.card.height)
    }
}

/// Host-measured rectangles, falling back to the model for cards that have
/// not been measured (yet).
#[derive(Debug, Clone, Copy)]
pub struct MeasuredGeometry<'a> {
    pub measured: &'a HashMap<String, Rect>,
    pub fallback: ModelGeometry,
}

impl NodeGeometry for MeasuredGeometry<'_> {
    fn rect_of(&self, collection: &Collection) -> Rect {
        match self.measured.get(&collection.id) {
            Some(rect) => *rect,
            None => self.fallback.rect_of(collection),
        }
    }
}

/// Edge routing configuration and computation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeRouter {
    pub(crate) curve: CurveConfig,
    pub(crate) label: LabelConfig,
}

impl EdgeRouter {
    pub fn new(config: &CanvasConfig) -> Self {
        Self {
            curve: config.curve,
            label: config.label,
        }
    }

    /// Route every reference whose endpoints both exist.
    ///
    /// Output order follows the reference relation; references to missing
    /// collections are skipped without affecting the indices of the rest.
    pub fn route(&self, model: &SchemaModel, geometry: &impl NodeGeometry) -> Vec<LayoutEdge> {
        let by_id: HashMap<&str, &Collection> = model
            .collections()
            .iter()
            .map(|c| (c.id.as_str(), c))
            .collect();

        let mut edges = Vec::new();
        let mut dropped = 0usize;

        for reference in references(model) {
            let (Some(source), Some(target)) = (
                by_id.get(reference.from.as_str()),
                by_id.get(reference.to.as_str()),
            ) else {
                dropped += 1;
                continue;
            };

            let source_rect = geometry.rect_of(source);
            let target_rect = geometry.rect_of(target);
            let anchors = calculate_anchors(&source_rect, &target_rect);
            let curve = route_curve(&anchors, &self.curve);
            let plate = label_plate(&curve, &reference.label, &self.label);

            edges.push(LayoutEdge {
                index: edges.len(),
                source: reference.from,
                target: reference.to,
                label: reference.label,
                axis: anchors.axis,
                source_side: anchors.source_side,
                target_side: anchors.target_side,
                curve,
                label_plate: plate,
            });
        }

        debug!(edges = edges.len(), dropped, "routed edges");
        edges
    }
}
