//! Rendering surface: turns the model, the viewport and the routed edges
//! into screen-space drawing primitives. No state, no business logic.

use crate::config::CanvasConfig;
use crate::geometry::{Point, Rect};
use crate::ir::{GraphIR, Node};
use crate::layout::{CubicBezier, LayoutEdge};
use crate::measure::{TextMetrics, truncate_columns};
use crate::viewport::Viewport;

/// World-space spacing of the background grid.
pub const GRID_SPACING: f64 = 20.0;

const CARD_RADIUS: f64 = 8.0;
const PLATE_RADIUS: f64 = 4.0;
const SAMPLE_COLUMNS: usize = 14;
const MIN_CANVAS: (f64, f64) = (400.0, 300.0);
const CANVAS_MARGIN: f64 = 40.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        radius: f64,
        class: &'static str,
    },
    Text {
        at: Point,
        text: String,
        size: f64,
        anchor: TextAnchor,
        class: &'static str,
    },
    Line {
        from: Point,
        to: Point,
        class: &'static str,
    },
    /// Directed curve, drawn with an arrowhead at its end.
    Curve {
        curve: CubicBezier,
        class: &'static str,
    },
}

/// Everything needed to draw one frame, in screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub width: f64,
    pub height: f64,
    /// Grid cell size and phase, following pan and zoom.
    pub grid_spacing: f64,
    pub grid_offset: Point,
    pub primitives: Vec<Primitive>,
}

/// Per-frame interaction state the surface reflects.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlight<'a> {
    pub selected: Option<&'a str>,
    pub dragging: Option<&'a str>,
}

/// Nodes in paint order: model order, selected card last (on top).
pub fn draw_order<'a>(ir: &'a GraphIR, selected: Option<&str>) -> Vec<&'a Node> {
    let (mut rest, top): (Vec<&Node>, Vec<&Node>) = ir
        .nodes
        .iter()
        .partition(|n| Some(n.id.as_str()) != selected);
    rest.extend(top);
    rest
}

/// Rendered world-space card rectangles in paint order.
pub fn card_rects(
    ir: &GraphIR,
    selected: Option<&str>,
    metrics: &TextMetrics,
    config: &CanvasConfig,
) -> Vec<(String, Rect)> {
    draw_order(ir, selected)
        .into_iter()
        .map(|n| (n.id.clone(), card_rect(n, metrics, config)))
        .collect()
}

fn card_rect(node: &Node, metrics: &TextMetrics, config: &CanvasConfig) -> Rect {
    let (w, h) = metrics.card_size(node, (config.card.width, config.card.height));
    Rect::from_origin(node.position, w, h)
}

pub struct SceneBuilder<'a> {
    metrics: &'a TextMetrics,
    config: &'a CanvasConfig,
}

impl<'a> SceneBuilder<'a> {
    pub fn new(metrics: &'a TextMetrics, config: &'a CanvasConfig) -> Self {
        Self { metrics, config }
    }

    pub fn build(
        &self,
        ir: &GraphIR,
        viewport: &Viewport,
        edges: &[LayoutEdge],
        highlight: Highlight<'_>,
    ) -> Scene {
        let mut primitives = Vec::new();

        for node in draw_order(ir, highlight.selected) {
            let class = if highlight.dragging == Some(node.id.as_str()) {
                "card dragging"
            } else if highlight.selected == Some(node.id.as_str()) {
                "card selected"
            } else {
                "card"
            };
            self.push_card(&mut primitives, node, viewport, class);
        }

        // Arrows above the cards
        for edge in edges {
            self.push_edge(&mut primitives, edge, viewport);
        }

        let (width, height) = canvas_size(&primitives);

        if ir.nodes.is_empty() {
            primitives.push(Primitive::Text {
                at: Point::new(width / 2.0, height / 2.0),
                text: "Start Designing Your Database".to_string(),
                size: 18.0,
                anchor: TextAnchor::Middle,
                class: "empty-state",
            });
        }

        Scene {
            width,
            height,
            grid_spacing: GRID_SPACING * viewport.zoom,
            grid_offset: viewport.pan_offset,
            primitives,
        }
    }

    fn push_card(
        &self,
        out: &mut Vec<Primitive>,
        node: &Node,
        viewport: &Viewport,
        class: &'static str,
    ) {
        let m = self.metrics;
        let z = viewport.zoom;
        let card = viewport.rect_to_screen(card_rect(node, m, self.config));
        let header_h = m.header_height * z;
        let pad_x = m.padding_x * z;
        let font = 14.0 * z;
        let small = 12.0 * z;

        out.push(Primitive::Rect {
            rect: card,
            radius: CARD_RADIUS * z,
            class,
        });
        out.push(Primitive::Rect {
            rect: Rect::new(card.x, card.y, card.width, header_h),
            radius: CARD_RADIUS * z,
            class: "card-header",
        });
        out.push(Primitive::Line {
            from: Point::new(card.x, card.y + header_h),
            to: Point::new(card.right(), card.y + header_h),
            class: "card-separator",
        });

        let title_y = card.y + header_h / 2.0 + font * 0.35;
        out.push(Primitive::Text {
            at: Point::new(card.x + pad_x, title_y),
            text: "DB".to_string(),
            size: font,
            anchor: TextAnchor::Start,
            class: "card-badge",
        });
        out.push(Primitive::Text {
            at: Point::new(card.x + pad_x + m.char_width * 4.0 * z, title_y),
            text: node.label.clone(),
            size: font,
            anchor: TextAnchor::Start,
            class: "card-title",
        });

        let line_h = m.line_height * z;
        let mut y = card.y + header_h + m.padding_y * z + line_h * 0.6;
        for row in &node.rows {
            let name_w = m.text_width(&row.name) * z;
            out.push(Primitive::Text {
                at: Point::new(card.x + pad_x, y),
                text: row.name.clone(),
                size: small,
                anchor: TextAnchor::Start,
                class: "field-name",
            });
            let type_tag = format!("({})", row.typ.as_str());
            let type_x = card.x + pad_x + name_w + m.char_width * z;
            out.push(Primitive::Text {
                at: Point::new(type_x, y),
                text: type_tag.clone(),
                size: small * 0.85,
                anchor: TextAnchor::Start,
                class: "field-type",
            });
            if row.is_reference {
                out.push(Primitive::Text {
                    at: Point::new(type_x + (m.text_width(&type_tag) + m.char_width) * z, y),
                    text: row.typ.icon().to_string(),
                    size: small,
                    anchor: TextAnchor::Start,
                    class: "field-ref",
                });
            }
            out.push(Primitive::Text {
                at: Point::new(card.right() - pad_x, y),
                text: truncate_columns(&row.sample, SAMPLE_COLUMNS),
                size: small * 0.85,
                anchor: TextAnchor::End,
                class: "field-sample",
            });
            y += line_h;
        }

        let footer = if node.rows.is_empty() {
            Some("No fields defined".to_string())
        } else if node.hidden_rows > 0 {
            Some(format!("+{} more fields", node.hidden_rows))
        } else {
            None
        };
        if let Some(text) = footer {
            out.push(Primitive::Text {
                at: Point::new(card.x + card.width / 2.0, y),
                text,
                size: small * 0.85,
                anchor: TextAnchor::Middle,
                class: "card-footer",
            });
        }
    }

    fn push_edge(&self, out: &mut Vec<Primitive>, edge: &LayoutEdge, viewport: &Viewport) {
        let z = viewport.zoom;
        out.push(Primitive::Curve {
            curve: edge.curve.map(|p| viewport.world_to_screen(p)),
            class: "edge",
        });

        let plate = viewport.rect_to_screen(edge.label_plate);
        out.push(Primitive::Rect {
            rect: plate,
            radius: PLATE_RADIUS * z,
            class: "edge-label-bg",
        });
        let center = plate.center();
        out.push(Primitive::Text {
            at: Point::new(center.x, center.y + 3.0 * z),
            text: edge.label.clone(),
            size: self.config.label.font_size * z,
            anchor: TextAnchor::Middle,
            class: "edge-label",
        });
    }
}

fn canvas_size(primitives: &[Primitive]) -> (f64, f64) {
    let (mut w, mut h) = MIN_CANVAS;
    let mut include = |p: Point| {
        w = w.max(p.x + CANVAS_MARGIN);
        h = h.max(p.y + CANVAS_MARGIN);
    };
    for prim in primitives {
        match prim {
            Primitive::Rect { rect, .. } => include(Point::new(rect.right(), rect.bottom())),
            Primitive::Text { at, .. } => include(*at),
            Primitive::Line { from, to, .. } => {
                include(*from);
                include(*to);
            }
            Primitive::Curve { curve, .. } => {
                for p in [curve.start, curve.control1, curve.control2, curve.end] {
                    include(p);
                }
            }
        }
    }
    (w, h)
}
