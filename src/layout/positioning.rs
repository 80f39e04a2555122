//! Pointer-driven positioning: node drags, canvas pans, selection and hit
//! testing.

use crate::geometry::{Point, Rect};
use crate::viewport::Viewport;

/// The single active pointer interaction. Drag and pan exclude each other.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Interaction {
    #[default]
    Idle,
    DraggingNode {
        id: String,
        /// Pointer offset from the node's top-left, in world units.
        drag_anchor: Point,
    },
    Panning {
        last_screen: Point,
    },
}

/// What a pointer move asks the owner to apply.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerUpdate {
    /// Commit this (already clamped) world position for the node.
    MoveNode { id: String, position: Point },
    /// Add this screen-space delta to the pan offset.
    Pan(Point),
    None,
}

impl Interaction {
    pub fn begin_drag(id: &str, pointer_world: Point, node_position: Point) -> Self {
        Interaction::DraggingNode {
            id: id.to_string(),
            drag_anchor: pointer_world - node_position,
        }
    }

    pub fn begin_pan(pointer_screen: Point) -> Self {
        Interaction::Panning {
            last_screen: pointer_screen,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, Interaction::Idle)
    }

    pub fn dragged_id(&self) -> Option<&str> {
        match self {
            Interaction::DraggingNode { id, .. } => Some(id),
            _ => None,
        }
    }

    pub fn pointer_moved(&mut self, pointer_screen: Point, viewport: &Viewport) -> PointerUpdate {
        match self {
            Interaction::Idle => PointerUpdate::None,
            Interaction::DraggingNode { id, drag_anchor } => {
                let pointer_world = viewport.screen_to_world(pointer_screen);
                PointerUpdate::MoveNode {
                    id: id.clone(),
                    position: (pointer_world - *drag_anchor).clamp_non_negative(),
                }
            }
            Interaction::Panning { last_screen } => {
                let delta = pointer_screen - *last_screen;
                *last_screen = pointer_screen;
                PointerUpdate::Pan(delta)
            }
        }
    }

    /// End any drag or pan. Returns whether one was active.
    pub fn release(&mut self) -> bool {
        let was_active = self.is_active();
        *self = Interaction::Idle;
        was_active
    }
}

/// At most one selected collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection(Option<String>);

impl Selection {
    pub fn select(&mut self, id: Option<&str>) {
        self.0 = id.map(str::to_string);
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.0.as_deref() == Some(id)
    }
}

/// Topmost card under `world`. `cards` is in draw order, so later entries
/// win.
pub fn hit_test<'a>(cards: &'a [(String, Rect)], world: Point) -> Option<&'a str> {
    cards
        .iter()
        .rev()
        .find(|(_, rect)| rect.contains(world))
        .map(|(id, _)| id.as_str())
}
