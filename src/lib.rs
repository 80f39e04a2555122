pub mod config;
pub mod designer;
pub mod geometry;
pub mod ir;
pub mod layout;
pub mod measure;
pub mod model;
pub mod scene;
pub mod serializer;
pub mod svg;
pub mod viewport;

use wasm_bindgen::prelude::*;

use config::CanvasConfig;
use designer::Designer;
use geometry::{Point, Rect};
use model::FieldSpec;
use viewport::Viewport;

/// Initialize panic hook for better error messages in WASM
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(target_arch = "wasm32")]
    console_error_panic_hook::set_once();
}

/// Render a saved schema JSON document to SVG
#[wasm_bindgen(js_name = "schemaToSvg")]
pub fn schema_to_svg(json: &str) -> Result<String, String> {
    let model = serializer::import_json(json).map_err(|e| e.to_string())?;
    let mut designer = Designer::with_model(model, CanvasConfig::default());
    Ok(designer.render_svg())
}

fn to_js<T: serde::Serialize>(value: &T) -> Result<JsValue, String> {
    let json = serde_json::to_string(value).map_err(|e| e.to_string())?;
    js_sys::JSON::parse(&json).map_err(|_| "failed to convert to a JS value".to_string())
}

fn parse_field(spec: &str) -> Result<FieldSpec, String> {
    serde_json::from_str(spec).map_err(|e| format!("Invalid field: {}", e))
}

/// Canvas controller exposed to JavaScript. Call `tick` from
/// `requestAnimationFrame` and `teardown` when the canvas unmounts.
#[wasm_bindgen(js_name = "Designer")]
pub struct WasmDesigner {
    inner: Designer,
}

#[wasm_bindgen(js_class = "Designer")]
impl WasmDesigner {
    /// `config` is an optional JSON object overriding any tuning defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<WasmDesigner, String> {
        let config = match config {
            Some(json) => CanvasConfig::from_json(&json).map_err(|e| e.to_string())?,
            None => CanvasConfig::default(),
        };
        Ok(Self {
            inner: Designer::new(config),
        })
    }

    #[wasm_bindgen(js_name = "importJson")]
    pub fn import_json(&mut self, json: &str) -> Result<(), String> {
        self.inner.import_json(json).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "exportJson")]
    pub fn export_json(&self) -> Result<String, String> {
        self.inner.export_json().map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "saveJson")]
    pub fn save_json(&self) -> Result<String, String> {
        self.inner.save_json().map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "renderSvg")]
    pub fn render_svg(&mut self) -> String {
        self.inner.render_svg()
    }

    #[wasm_bindgen(js_name = "addCollection")]
    pub fn add_collection(
        &mut self,
        name: &str,
        x: Option<f64>,
        y: Option<f64>,
    ) -> Result<String, String> {
        let position = match (x, y) {
            (Some(x), Some(y)) => Some(Point::new(x, y)),
            _ => None,
        };
        self.inner
            .add_collection(name, position)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "renameCollection")]
    pub fn rename_collection(&mut self, id: &str, name: &str) -> Result<(), String> {
        self.inner.rename_collection(id, name).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "deleteCollection")]
    pub fn delete_collection(&mut self, id: &str) -> Result<(), String> {
        self.inner.delete_collection(id).map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "addDocument")]
    pub fn add_document(&mut self, collection_id: &str, name: &str) -> Result<String, String> {
        self.inner
            .add_document(collection_id, name)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "renameDocument")]
    pub fn rename_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
        name: &str,
    ) -> Result<(), String> {
        self.inner
            .rename_document(collection_id, document_id, name)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "deleteDocument")]
    pub fn delete_document(
        &mut self,
        collection_id: &str,
        document_id: &str,
    ) -> Result<(), String> {
        self.inner
            .delete_document(collection_id, document_id)
            .map_err(|e| e.to_string())
    }

    /// `spec` is JSON: `{name, type, value?, description?, referenceCollection?}`.
    #[wasm_bindgen(js_name = "addField")]
    pub fn add_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        spec: &str,
    ) -> Result<String, String> {
        let spec = parse_field(spec)?;
        self.inner
            .add_field(collection_id, document_id, spec)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "updateField")]
    pub fn update_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
        spec: &str,
    ) -> Result<(), String> {
        let spec = parse_field(spec)?;
        self.inner
            .update_field(collection_id, document_id, field_id, spec)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "deleteField")]
    pub fn delete_field(
        &mut self,
        collection_id: &str,
        document_id: &str,
        field_id: &str,
    ) -> Result<(), String> {
        self.inner
            .delete_field(collection_id, document_id, field_id)
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "moveNode")]
    pub fn move_node(&mut self, id: &str, x: f64, y: f64) -> Result<JsValue, String> {
        let committed = self
            .inner
            .move_node(id, Point::new(x, y))
            .map_err(|e| e.to_string())?;
        to_js(&committed)
    }

    #[wasm_bindgen(js_name = "getEdges")]
    pub fn get_edges(&mut self) -> Result<JsValue, String> {
        to_js(&self.inner.edges())
    }

    #[wasm_bindgen(js_name = "getViewport")]
    pub fn get_viewport(&self) -> Result<JsValue, String> {
        to_js(&self.inner.viewport())
    }

    #[wasm_bindgen(js_name = "setViewport")]
    pub fn set_viewport(&mut self, pan_x: f64, pan_y: f64, zoom: f64) {
        self.inner.set_viewport(Viewport {
            pan_offset: Point::new(pan_x, pan_y),
            zoom,
        });
    }

    pub fn select(&mut self, id: Option<String>) -> Result<(), String> {
        self.inner.select(id.as_deref()).map_err(|e| e.to_string())
    }

    pub fn selected(&self) -> Option<String> {
        self.inner.selected().map(str::to_string)
    }

    /// Report a card's on-screen bounding box.
    pub fn measure(
        &mut self,
        id: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<(), String> {
        self.inner
            .measure(id, Rect::new(x, y, width, height))
            .map_err(|e| e.to_string())
    }

    #[wasm_bindgen(js_name = "pointerDown")]
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> bool {
        self.inner.pointer_down(Point::new(x, y), button)
    }

    #[wasm_bindgen(js_name = "pointerMove")]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.inner.pointer_move(Point::new(x, y))
    }

    #[wasm_bindgen(js_name = "pointerUp")]
    pub fn pointer_up(&mut self) -> bool {
        self.inner.pointer_up()
    }

    #[wasm_bindgen(js_name = "pointerCancel")]
    pub fn pointer_cancel(&mut self) -> bool {
        self.inner.pointer_cancel()
    }

    pub fn blur(&mut self) -> bool {
        self.inner.blur()
    }

    /// `zoom` is true when Ctrl or Cmd is held.
    pub fn wheel(&mut self, delta_x: f64, delta_y: f64, zoom: bool, cursor_x: f64, cursor_y: f64) {
        self.inner.wheel(
            Point::new(delta_x, delta_y),
            zoom,
            Point::new(cursor_x, cursor_y),
        );
    }

    #[wasm_bindgen(js_name = "zoomIn")]
    pub fn zoom_in(&mut self) {
        self.inner.zoom_in();
    }

    #[wasm_bindgen(js_name = "zoomOut")]
    pub fn zoom_out(&mut self) {
        self.inner.zoom_out();
    }

    #[wasm_bindgen(js_name = "resetView")]
    pub fn reset_view(&mut self) {
        self.inner.reset_view();
    }

    /// Returns false once no interaction needs further frames.
    pub fn tick(&mut self) -> bool {
        self.inner.tick()
    }

    pub fn teardown(&mut self) {
        self.inner.teardown();
    }
}
