//! render-lessons
//!
//! Small interactive lessons on real-time rendering, drawn with wgpu on native
//! platforms and in the browser. Each lesson is a scene with live controls:
//! the texture scene shows sampling and texture coordinates, the blending
//! scene shows blend functions and why transparent geometry needs ordering.
//!
//! High-level modules
//! - `camera`: fly camera, projection and its controller
//! - `context`: window, surface, device and the multisampled render targets
//! - `controls`: keyboard mapping to scene controls
//! - `data_structures`: handles, textures, meshes, draw items, blend settings
//! - `flow`: the event loop that loads, switches and draws scenes
//! - `pipelines`: shaders and pipelines keyed by fixed-function state
//! - `render`: draw ordering and per-item state for transparent geometry
//! - `resources`: asset loading, samplers and procedural images
//! - `scenes`: the lessons themselves
//!

pub mod camera;
pub mod context;
pub mod controls;
pub mod data_structures;
pub mod flow;
pub mod pipelines;
pub mod render;
pub mod resources;
pub mod scenes;

pub use flow::{LessonConfig, run};
pub use scenes::{Scene, SceneKind};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn run_web() -> Result<(), wasm_bindgen::JsValue> {
    flow::run(LessonConfig::from_location()).map_err(|e| JsValue::from_str(&format!("{e:#}")))
}
