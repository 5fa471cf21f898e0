//! Decoded animations and the playback clock that steps through them.
//!
//! [`Animation`] owns the header and the decompressed voxel stream.
//! [`PlaybackEngine`] only tracks which frame is current; frame data is
//! borrowed from the animation on demand.

mod document;
mod playback;

pub use document::Animation;
pub use playback::{PlaybackEngine, PlaybackStatus};

/// Out-of-bounds access to an animation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    #[error("Voxel ({x}, {y}, {z}) outside {width}x{height}x{depth} grid")]
    Voxel {
        x: usize,
        y: usize,
        z: usize,
        width: usize,
        height: usize,
        depth: usize,
    },

    #[error("Frame index {index} out of range (frame count {frame_count})")]
    Frame { index: usize, frame_count: usize },

    #[error("An animation needs at least one frame")]
    LastFrame,
}
