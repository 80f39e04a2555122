use crate::scene::{Primitive, Scene, TextAnchor};
use std::fmt::{self, Write};

/// Serializes a [`Scene`] into a standalone SVG document.
#[derive(Default)]
pub struct SvgRenderer;

impl SvgRenderer {
    pub fn render(&self, scene: &Scene) -> String {
        let mut svg = String::new();
        self.write_document(&mut svg, scene)
            .expect("writing to a String cannot fail");
        svg
    }

    fn write_document(&self, svg: &mut String, scene: &Scene) -> fmt::Result {
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
            scene.width, scene.height, scene.width, scene.height
        )?;

        writeln!(
            svg,
            r#"<style>
  .canvas {{ fill: #f3f4f6; }}
  .grid-line {{ stroke: #e5e7eb; stroke-width: 1; opacity: 0.6; }}
  .card {{ fill: #fff; stroke: #e5e7eb; stroke-width: 2; }}
  .card.selected {{ stroke: #3b82f6; }}
  .card.dragging {{ stroke: #3b82f6; filter: drop-shadow(0 8px 12px rgba(0, 0, 0, 0.2)); }}
  .card-header {{ fill: #f9fafb; }}
  .card-separator {{ stroke: #e5e7eb; stroke-width: 1; }}
  .card-badge {{ font-family: sans-serif; font-weight: bold; fill: #2563eb; }}
  .card-title {{ font-family: sans-serif; font-weight: 600; fill: #111827; }}
  .field-name {{ font-family: sans-serif; font-weight: 500; fill: #111827; }}
  .field-type {{ font-family: sans-serif; fill: #6b7280; }}
  .field-ref {{ font-family: sans-serif; fill: #3b82f6; }}
  .field-sample {{ font-family: sans-serif; fill: #4b5563; }}
  .card-footer {{ font-family: sans-serif; fill: #6b7280; }}
  .edge {{ stroke: #3b82f6; stroke-width: 2; fill: none; }}
  .edge-label-bg {{ fill: rgba(255, 255, 255, 0.95); stroke: #3b82f6; stroke-width: 1; }}
  .edge-label {{ font-family: sans-serif; font-weight: 500; fill: #2563eb; }}
  .empty-state {{ font-family: sans-serif; fill: #6b7280; }}
</style>"#
        )?;

        writeln!(
            svg,
            r##"<defs>
  <marker id="arrowhead" markerWidth="10" markerHeight="7" refX="9" refY="3.5" orient="auto">
    <polygon points="0 0, 10 3.5, 0 7" fill="#3b82f6" />
  </marker>"##
        )?;
        self.write_grid_pattern(svg, scene)?;
        writeln!(svg, "</defs>")?;

        writeln!(
            svg,
            r#"<rect class="canvas" x="0" y="0" width="{}" height="{}" />"#,
            scene.width, scene.height
        )?;
        writeln!(
            svg,
            r#"<rect x="0" y="0" width="{}" height="{}" fill="url(#grid)" />"#,
            scene.width, scene.height
        )?;

        for primitive in &scene.primitives {
            self.write_primitive(svg, primitive)?;
        }

        writeln!(svg, "</svg>")
    }

    fn write_grid_pattern(&self, svg: &mut String, scene: &Scene) -> fmt::Result {
        let s = scene.grid_spacing;
        writeln!(
            svg,
            r#"  <pattern id="grid" width="{s}" height="{s}" x="{}" y="{}" patternUnits="userSpaceOnUse">
    <path class="grid-line" d="M {s} 0 L 0 0 0 {s}" fill="none" />
  </pattern>"#,
            scene.grid_offset.x, scene.grid_offset.y
        )
    }

    fn write_primitive(&self, svg: &mut String, primitive: &Primitive) -> fmt::Result {
        match primitive {
            Primitive::Rect { rect, radius, class } => writeln!(
                svg,
                r#"<rect class="{}" x="{}" y="{}" width="{}" height="{}" rx="{}" />"#,
                class, rect.x, rect.y, rect.width, rect.height, radius
            ),
            Primitive::Text {
                at,
                text,
                size,
                anchor,
                class,
            } => writeln!(
                svg,
                r#"<text class="{}" x="{}" y="{}" font-size="{}" text-anchor="{}">{}</text>"#,
                class,
                at.x,
                at.y,
                size,
                anchor_attr(*anchor),
                escape_xml(text)
            ),
            Primitive::Line { from, to, class } => writeln!(
                svg,
                r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" />"#,
                class, from.x, from.y, to.x, to.y
            ),
            Primitive::Curve { curve, class } => writeln!(
                svg,
                r#"<path class="{}" d="M {} {} C {} {}, {} {}, {} {}" marker-end="url(#arrowhead)" />"#,
                class,
                curve.start.x,
                curve.start.y,
                curve.control1.x,
                curve.control1.y,
                curve.control2.x,
                curve.control2.y,
                curve.end.x,
                curve.end.y
            ),
        }
    }
}

fn anchor_attr(anchor: TextAnchor) -> &'static str {
    match anchor {
        TextAnchor::Start => "start",
        TextAnchor::Middle => "middle",
        TextAnchor::End => "end",
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
