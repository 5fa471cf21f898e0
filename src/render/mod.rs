//! Render-side core: orbit camera, geometry projection and the renderer seam.
//!
//! Nothing here talks to a graphics API. A backend implements [`Renderer`]
//! and receives a [`FrameGeometry`] per frame.

mod backend;
mod camera;
mod geometry;

pub use backend::{FrameGeometry, Renderer, RendererBackend, select_renderer};
pub use camera::{FAR_PLANE, NEAR_PLANE, OrbitCamera};
pub use geometry::{
    CubeInstance, GeometryProjector, InstanceRaw, hsba_to_rgba, instances_as_bytes,
};

/// Error type for renderer backends.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Renderer backend '{backend}' unavailable: {reason}")]
    Unavailable { backend: String, reason: String },

    #[error("No renderer backend configured")]
    NoBackend,

    #[error("Draw failed: {0}")]
    Draw(String),
}
