//! HGLY - compact voxel animations.
//!
//! This crate decodes the `.hgly` container, keeps time for playback and
//! turns each frame into positioned, colored cubes plus camera matrices for
//! an external renderer.
//!
//! # Architecture
//!
//! - `format`: header, pixel and run-length codecs
//! - `animation`: decoded animation document and the playback clock
//! - `render`: orbit camera, geometry projection and the renderer trait
//! - `schema`: serde configuration for sessions and the camera
//! - `session`: composition of the above, driven by ticks and input deltas
//!
//! # Example
//!
//! ```rust,no_run
//! use hologlyph::{
//!     animation::{Animation, PlaybackEngine},
//!     format::{CompressionType, HeaderOptions},
//!     render::{GeometryProjector, OrbitCamera},
//! };
//!
//! let mut anim = Animation::new(&HeaderOptions {
//!     width: 8,
//!     height: 8,
//!     depth: 8,
//!     frame_count: 4,
//!     ..Default::default()
//! })
//! .unwrap();
//! anim.set_voxel(0, 3, 3, 3, (0.0, 100.0, 100.0, 100.0)).unwrap();
//! let bytes = anim.to_bytes(CompressionType::Rle).unwrap();
//!
//! let anim = Animation::from_bytes(&bytes).unwrap();
//! let mut engine = PlaybackEngine::new(anim.header());
//! engine.play();
//! engine.tick(250.0);
//!
//! let projector = GeometryProjector::new(anim.header()).unwrap();
//! let cubes = projector.project(anim.frame(engine.current_frame()).unwrap()).unwrap();
//! let camera = OrbitCamera::default();
//! let view = camera.view_matrix(16.0);
//! let projection = camera.projection_matrix(16.0 / 9.0, projector.scene_extent());
//! println!("{} cubes, view {view:?}, projection {projection:?}", cubes.len());
//! ```

pub mod animation;
pub mod format;
pub mod render;
pub mod schema;
pub mod session;

// WebAssembly bindings (only for wasm32 target)
#[cfg(target_arch = "wasm32")]
pub mod wasm;

// Re-export commonly used types
pub use animation::{Animation, PlaybackEngine, PlaybackStatus};
pub use format::{FormatError, Header, HeaderOptions, Hsba};
pub use render::{GeometryProjector, OrbitCamera, Renderer};
pub use schema::SessionConfig;
pub use session::{Session, SessionError};
