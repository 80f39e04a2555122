//! The canvas controller. Owns the schema model and all view state, turns
//! pointer and wheel events into model commits and viewport changes, and
//! keeps the routed edges current.

use crate::config::CanvasConfig;
use crate::geometry::{Point, Rect};
use crate::ir::GraphIR;
use crate::layout::{
    EdgeRouter, Interaction, LayoutEdge, MeasuredGeometry, ModelGeometry, PointerUpdate,
    Selection, hit_test,
};
use crate::measure::TextMetrics;
use crate::model::{FieldSpec, ModelError, SchemaModel};
use crate::scene::{self, Highlight, SceneBuilder};
use crate::serializer::{self, ImportError};
use crate::svg::SvgRenderer;
use crate::viewport::Viewport;
use std::collections::HashMap;
use tracing::debug;

/// DOM `MouseEvent.button` value of the primary button.
pub const PRIMARY_BUTTON: i16 = 0;

/// Cooperative per-frame task. The host calls [`Designer::tick`] once per
/// animation frame; work is only done while the loop is running.
#[derive(Debug, Default)]
pub struct FrameLoop {
    running: bool,
    frames: u64,
}

impl FrameLoop {
    pub fn start(&mut self) {
        if !self.running {
            debug!("frame loop started");
        }
        self.running = true;
    }

    /// Returns whether the loop was running.
    pub fn stop(&mut self) -> bool {
        let was_running = self.running;
        if was_running {
            debug!(frames = self.frames, "frame loop stopped");
        }
        self.running = false;
        was_running
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Frames run since the loop was created.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    fn tick(&mut self) -> bool {
        if self.running {
            self.frames += 1;
        }
        self.running
    }
}

pub struct Designer {
    model: SchemaModel,
    viewport: Viewport,
    interaction: Interaction,
    selection: Selection,
    config: CanvasConfig,
    metrics: TextMetrics,
    router: EdgeRouter,
    /// Host-reported world-space card rectangles.
    measured: HashMap<String, Rect>,
    edges: Vec<LayoutEdge>,
    dirty: bool,
    frame_loop: FrameLoop,
}

impl Default for Designer {
    fn default() -> Self {
        Self::new(CanvasConfig::default())
    }
}

impl Designer {
    pub fn new(config: CanvasConfig) -> Self {
        Self {
            model: SchemaModel::new(),
            viewport: Viewport::default(),
            interaction: Interaction::Idle,
            selection: Selection::default(),
            router: EdgeRouter::new(&config),
            config,
            metrics: TextMetrics::default(),
            measured: HashMap::new(),
            edges: Vec::new(),
            dirty: true,
            frame_loop: FrameLoop::default(),
        }
    }

    pub fn with_model(model: SchemaModel, config: CanvasConfig) -> Self {
        let mut designer = Self::new(config);
        designer.load(model);
        designer
    }

    pub fn model(&self) -> &SchemaModel {
        &self.model
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn selected(&self) -> Option<&str> {
        self.selection.get()
    }

    pub fn frame_loop(&self) -> &FrameLoop {
        &self.frame_loop
    }

    /// Replace the whole model. View state tied to old ids is dropped.
    pub fn load(&mut self, model: SchemaModel) {
        self.cancel_interaction();
        self.selection.clear();
        self.measured.clear();
        self.model = model;
        self.dirty = true;
    }

    // --- model operations ---

    /// Commit a node position (clamped to non-negative coordinates).
    pub fn move_node(&mut self, id: &str, world: Point) -> Result<Point, ModelError> {
        let committed = self.model.move_node(id, world)?;
        // A commit supersedes any host measurement of the old spot.
        if let Some(rect) = self.measured.get_mut(id) {
            rect.x = committed.x;
            rect.y = committed.y;
        }
        self.dirty = true;
        Ok(committed)
    }

    /// Routed edges for the current model, recomputed if anything changed.
    pub fn edges(&mut self) -> &[LayoutEdge] {
        if self.dirty {
            self.route();
        }
        &self.edges
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport.clamped(&self.config.zoom);
    }

    pub fn select(&mut self, id: Option<&str>) -> Result<(), ModelError> {
        if let Some(id) = id {
            if self.model.collection(id).is_none() {
                return Err(ModelError::UnknownCollection(id.to_string()));
            }
        }
        self.selection.select(id);
        Ok(())
    }

    pub fn add_collection(
        &mut self,
        name: &str,
        position: Option<Point>,
    ) -> Result<String, ModelError> {
        let id = self.model.add_collection(name, position)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<(), ModelError> {
        self.model.rename_collection(id, name)
    }

    pub fn delete_collection(&mut self, id: &str) -> Result<(), ModelError> {
        self.model.delete_collection(id)?;
        if self.selection.is_selected(id) {
            self.selection.clear();
        }
        if self.interaction.dragged_id() == Some(id) {
            self.cancel_interaction();
        }
        self.measured.remove(id);
        self.dirty = true;
        Ok(())
    }

    pub fn add_document(&mut self, collection_id: &str, name: &str) -> Result<String, ModelError> {
        let id = self.model.add_document(collection_id, name)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn rename_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
        name: &str,
    ) -> Result<(), ModelError> {
        self.model.rename_document(collection_id, document_id, name)
    }

    pub fn delete_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), ModelError> {
        self.model.delete_document(collection_id, document_id)?;
        self.dirty = true;
        Ok(())
    }

    pub fn add_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        spec: FieldSpec,
    ) -> Result<String, ModelError> {
        let id = self.model.add_field(collection_id, document_id, spec)?;
        self.dirty = true;
        Ok(id)
    }

    pub fn update_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
        spec: FieldSpec,
    ) -> Result<(), ModelError> {
        self.model.update_field(collection_id, document_id, field_id, spec)?;
        self.dirty = true;
        Ok(())
    }

    pub fn delete_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
    ) -> Result<(), ModelError> {
        self.model.delete_field(collection_id, document_id, field_id)?;
        self.dirty = true;
        Ok(())
    }

    /// Record the host's on-screen rectangle for a card. Routing prefers it
    /// over the logical card size; later moves keep the measured size.
    pub fn measure(&mut self, id: &str, screen: Rect) -> Result<(), ModelError> {
        if self.model.collection(id).is_none() {
            return Err(ModelError::UnknownCollection(id.to_string()));
        }
        self.measured
            .insert(id.to_string(), self.viewport.rect_to_world(screen));
        self.dirty = true;
        Ok(())
    }

    // --- I/O ---

    /// Replace the model with an imported one. On error the current model
    /// is left untouched.
    pub fn import_json(&mut self, input: &str) -> Result<(), ImportError> {
        let model = serializer::import_json(input)?;
        self.load(model);
        Ok(())
    }

    pub fn export_json(&self) -> Result<String, serde_json::Error> {
        serializer::export_json(&self.model)
    }

    pub fn save_json(&self) -> Result<String, serde_json::Error> {
        serializer::save_json(&self.model)
    }

    pub fn render_svg(&mut self) -> String {
        if self.dirty {
            self.route();
        }
        let ir = GraphIR::from_model(&self.model, self.config.preview_rows);
        let highlight = Highlight {
            selected: self.selection.get(),
            dragging: self.interaction.dragged_id(),
        };
        let scene = SceneBuilder::new(&self.metrics, &self.config).build(
            &ir,
            &self.viewport,
            &self.edges,
            highlight,
        );
        SvgRenderer.render(&scene)
    }

    // --- pointer & wheel ---

    /// Primary press on a card selects it and starts dragging it; on empty
    /// canvas it clears the selection and starts a pan. Returns whether an
    /// interaction started.
    pub fn pointer_down(&mut self, screen: Point, button: i16) -> bool {
        if button != PRIMARY_BUTTON || self.interaction.is_active() {
            return false;
        }
        let world = self.viewport.screen_to_world(screen);
        let hit = self
            .card_at(world)
            .and_then(|id| self.model.collection(&id).map(|c| (id, c.position)));

        self.interaction = match hit {
            Some((id, position)) => {
                self.selection.select(Some(&id));
                Interaction::begin_drag(&id, world, position)
            }
            None => {
                self.selection.clear();
                Interaction::begin_pan(screen)
            }
        };
        self.frame_loop.start();
        true
    }

    /// Apply a pointer move to the active interaction. Drags commit
    /// immediately. Returns whether anything changed.
    pub fn pointer_move(&mut self, screen: Point) -> bool {
        match self.interaction.pointer_moved(screen, &self.viewport) {
            PointerUpdate::MoveNode { id, position } => {
                if self.move_node(&id, position).is_err() {
                    debug!(%id, "dragged node vanished, ending drag");
                    self.cancel_interaction();
                    return false;
                }
                true
            }
            PointerUpdate::Pan(delta) => {
                self.viewport.pan(delta);
                true
            }
            PointerUpdate::None => false,
        }
    }

    /// End any drag or pan. A release with nothing active is a no-op.
    pub fn pointer_up(&mut self) -> bool {
        self.cancel_interaction()
    }

    pub fn pointer_cancel(&mut self) -> bool {
        self.cancel_interaction()
    }

    /// Focus loss ends interactions the same way a release does.
    pub fn blur(&mut self) -> bool {
        self.cancel_interaction()
    }

    /// Ctrl/Cmd + wheel zooms about the cursor; plain wheel pans. Ignored
    /// while a node is being dragged, since the drag anchor is tied to the
    /// current viewport.
    pub fn wheel(&mut self, delta: Point, zoom_modifier: bool, cursor: Point) {
        if self.interaction.dragged_id().is_some() {
            return;
        }
        if zoom_modifier {
            let step = -delta.y * self.config.zoom.wheel_factor;
            self.viewport.zoom_by(step, Some(cursor), &self.config.zoom);
        } else {
            self.viewport.pan(Point::new(-delta.x, -delta.y));
        }
    }

    pub fn zoom_in(&mut self) {
        self.viewport
            .zoom_by(self.config.zoom.step, None, &self.config.zoom);
    }

    pub fn zoom_out(&mut self) {
        self.viewport
            .zoom_by(-self.config.zoom.step, None, &self.config.zoom);
    }

    pub fn reset_view(&mut self) {
        self.viewport.reset_view();
    }

    // --- frame loop ---

    /// Run one frame: a router pass while an interaction is active.
    /// Returns whether the loop is still running.
    pub fn tick(&mut self) -> bool {
        if self.frame_loop.tick() {
            self.route();
            true
        } else {
            false
        }
    }

    pub fn teardown(&mut self) {
        self.cancel_interaction();
    }

    fn cancel_interaction(&mut self) -> bool {
        let was_active = self.interaction.release();
        self.frame_loop.stop();
        was_active
    }

    fn route(&mut self) {
        let geometry = MeasuredGeometry {
            measured: &self.measured,
            fallback: ModelGeometry {
                card: self.config.card,
            },
        };
        self.edges = self.router.route(&self.model, &geometry);
        self.dirty = false;
    }

    /// Topmost card under a world point, measured rectangles taking
    /// precedence over rendered card sizes.
    fn card_at(&self, world: Point) -> Option<String> {
        let ir = GraphIR::from_model(&self.model, self.config.preview_rows);
        let cards: Vec<(String, Rect)> =
            scene::card_rects(&ir, self.selection.get(), &self.metrics, &self.config)
                .into_iter()
                .map(|(id, rect)| {
                    let rect = self.measured.get(&id).copied().unwrap_or(rect);
                    (id, rect)
                })
                .collect();
        hit_test(&cards, world).map(str::to_string)
    }
}

impl Drop for Designer {
    fn drop(&mut self) {
        self.frame_loop.stop();
    }
}
