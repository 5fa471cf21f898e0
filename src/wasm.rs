//! WebAssembly bindings for HGLY playback.
//!
//! The browser owns the GPU pipeline; these bindings hand it flat instance
//! and matrix arrays after each tick or input event.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::{
    animation::{Animation, PlaybackEngine},
    format::{CompressionType, compress_file, decompress_file},
    render::{CubeInstance, GeometryProjector, InstanceRaw, OrbitCamera},
    schema::SessionConfig,
};

/// Initialize WASM module with panic hook and logging.
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages in browser
    console_error_panic_hook::set_once();

    // Initialize WASM logger
    wasm_logger::init(wasm_logger::Config::default());
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// RLE-compress a whole file buffer. Already-compressed input is returned as is.
#[wasm_bindgen(js_name = compressFile)]
pub fn compress_file_js(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    compress_file(bytes).map(|o| o.into_bytes()).map_err(js_err)
}

/// Expand an RLE file buffer.
#[wasm_bindgen(js_name = decompressFile)]
pub fn decompress_file_js(bytes: &[u8]) -> Result<Vec<u8>, JsValue> {
    decompress_file(bytes).map_err(js_err)
}

/// WebAssembly wrapper around an animation, its clock and camera.
#[wasm_bindgen]
pub struct WasmPlayer {
    animation: Animation,
    engine: PlaybackEngine,
    camera: OrbitCamera,
    projector: GeometryProjector,
    camera_distance: f32,
    light_direction: [f32; 3],
}

#[wasm_bindgen]
impl WasmPlayer {
    /// Load an animation from file bytes.
    ///
    /// # Arguments
    /// * `bytes` - HGLY file, compressed or not
    /// * `config_json` - JSON SessionConfig, or empty for defaults
    #[wasm_bindgen(constructor)]
    pub fn new(bytes: &[u8], config_json: &str) -> Result<WasmPlayer, JsValue> {
        let config: SessionConfig = if config_json.trim().is_empty() {
            SessionConfig::default()
        } else {
            serde_json::from_str(config_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid config JSON: {e}")))?
        };
        config.validate().map_err(js_err)?;

        let animation = Animation::from_bytes(bytes).map_err(js_err)?;
        let projector = GeometryProjector::new(animation.header()).map_err(js_err)?;

        Ok(WasmPlayer {
            engine: PlaybackEngine::new(animation.header()),
            camera: OrbitCamera::new(&config.camera),
            camera_distance: projector.scene_extent() * config.camera_distance_factor,
            light_direction: config.light_direction,
            projector,
            animation,
        })
    }

    #[wasm_bindgen]
    pub fn play(&mut self) {
        self.engine.play();
    }

    #[wasm_bindgen]
    pub fn pause(&mut self) {
        self.engine.pause();
    }

    #[wasm_bindgen]
    pub fn stop(&mut self) {
        self.engine.stop();
    }

    /// Advance by elapsed milliseconds. Returns true if the frame changed.
    #[wasm_bindgen]
    pub fn tick(&mut self, elapsed_ms: f64) -> bool {
        let before = self.engine.current_frame();
        self.engine.tick(elapsed_ms);
        self.engine.current_frame() != before
    }

    #[wasm_bindgen]
    pub fn drag(&mut self, dx: f32, dy: f32) {
        let sensitivity = self.camera.drag_sensitivity();
        self.camera.apply_drag_delta(dx, dy, sensitivity);
    }

    #[wasm_bindgen]
    pub fn zoom(&mut self, delta: f32) {
        self.camera.apply_zoom_delta(delta);
    }

    #[wasm_bindgen]
    pub fn pinch(&mut self, scale: f32) {
        self.camera.apply_pinch_scale(scale);
    }

    #[wasm_bindgen(js_name = currentFrame)]
    pub fn current_frame(&self) -> usize {
        self.engine.current_frame()
    }

    #[wasm_bindgen(js_name = isPlaying)]
    pub fn is_playing(&self) -> bool {
        self.engine.is_playing()
    }

    /// Current frame as flat `[x, y, z, r, g, b, a]` records.
    #[wasm_bindgen(js_name = getInstances)]
    pub fn get_instances(&self) -> Result<Vec<f32>, JsValue> {
        let frame = self
            .animation
            .frame(self.engine.current_frame())
            .map_err(js_err)?;
        let instances: Vec<InstanceRaw> = self
            .projector
            .iter(frame)
            .map_err(js_err)?
            .map(|c: CubeInstance| c.to_raw())
            .collect();
        Ok(bytemuck::cast_slice(&instances).to_vec())
    }

    /// Column-major view matrix.
    #[wasm_bindgen(js_name = getViewMatrix)]
    pub fn get_view_matrix(&self) -> Vec<f32> {
        self.camera
            .view_matrix(self.camera_distance)
            .to_cols_array()
            .to_vec()
    }

    /// Column-major orthographic projection for the given aspect ratio.
    #[wasm_bindgen(js_name = getProjectionMatrix)]
    pub fn get_projection_matrix(&self, aspect: f32) -> Vec<f32> {
        self.camera
            .projection_matrix(aspect, self.projector.scene_extent())
            .to_cols_array()
            .to_vec()
    }

    /// Header fields and playback state as JSON.
    #[wasm_bindgen(js_name = getInfo)]
    pub fn get_info(&self) -> Result<JsValue, JsValue> {
        let header = self.animation.header();
        let info = PlayerInfo {
            width: header.width,
            height: header.height,
            depth: header.depth,
            frame_count: header.frame_count,
            frame_duration_ms: header.frame_duration_ms,
            looping: header.looping(),
            loop_start_frame: header.loop_start_frame,
            current_frame: self.engine.current_frame(),
            light_direction: self.light_direction,
        };
        serde_wasm_bindgen::to_value(&info)
            .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
    }

    /// Serialize the animation, optionally RLE-compressed.
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&self, compressed: bool) -> Result<Vec<u8>, JsValue> {
        let compression = if compressed {
            CompressionType::Rle
        } else {
            CompressionType::None
        };
        self.animation.to_bytes(compression).map_err(js_err)
    }
}

/// Serializable header/playback summary.
#[derive(Serialize)]
struct PlayerInfo {
    width: u8,
    height: u8,
    depth: u8,
    frame_count: u32,
    frame_duration_ms: u32,
    looping: bool,
    loop_start_frame: u32,
    current_frame: usize,
    light_direction: [f32; 3],
}
