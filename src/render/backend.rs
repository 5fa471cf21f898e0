//! Renderer seam: the core hands over cubes and matrices, never draws itself.

use glam::{Mat4, Vec3};
use log::{info, warn};

use super::{CubeInstance, RenderError};

/// Everything a backend needs to draw one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry<'a> {
    /// Index of the animation frame being drawn.
    pub frame_index: usize,
    pub instances: &'a [CubeInstance],
    pub view: Mat4,
    pub projection: Mat4,
    /// Unit vector pointing toward the light.
    pub light_direction: Vec3,
}

/// A drawing backend consuming cube instances.
pub trait Renderer {
    /// Backend name, for logs.
    fn name(&self) -> &str;

    /// Draw one frame.
    fn draw(&mut self, frame: &FrameGeometry<'_>) -> Result<(), RenderError>;

    /// Viewport changed size.
    fn resize(&mut self, _width: u32, _height: u32) {}
}

/// Factory for a renderer that may be unavailable on this host.
pub trait RendererBackend {
    fn name(&self) -> &str;

    /// Construct the renderer, failing fast with [`RenderError::Unavailable`].
    fn create(&self) -> Result<Box<dyn Renderer>, RenderError>;
}

/// Try each backend in order and return the first that constructs.
pub fn select_renderer(
    backends: &[&dyn RendererBackend],
) -> Result<Box<dyn Renderer>, RenderError> {
    let mut last_error = RenderError::NoBackend;
    for backend in backends {
        match backend.create() {
            Ok(renderer) => {
                info!("Using renderer backend '{}'", backend.name());
                return Ok(renderer);
            }
            Err(e) => {
                warn!("Renderer backend '{}' unavailable: {}", backend.name(), e);
                last_error = e;
            }
        }
    }
    Err(last_error)
}
