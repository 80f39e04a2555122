//! Canvas layout: user-driven node positions and routed reference edges.

pub mod anchors;
pub mod engine;
pub mod positioning;
pub mod routing;
pub mod types;

pub use engine::{EdgeRouter, MeasuredGeometry, ModelGeometry, NodeGeometry};
pub use positioning::{Interaction, PointerUpdate, Selection, hit_test};
pub use types::{Axis, CubicBezier, LayoutEdge, Side};
