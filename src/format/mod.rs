//! Binary container format for HGLY voxel animations.
//!
//! # File Format
//!
//! An `.hgly` file is a fixed 28-byte header followed by the voxel payload:
//!
//! ```text
//! Header (28 bytes):
//!   Magic: "HGLY" (4 bytes)
//!   Version: u8
//!   Header size: u8 (always 28)
//!   Flags: u8 (bit 0 = loop)
//!   Bytes per voxel: u8
//!   Width: u8
//!   Height: u8
//!   Depth: u8
//!   Color model: u8
//!   Frame count: u32 LE
//!   Frame duration (ms): u32 LE
//!   Reserved: 3 bytes (zero)
//!   Compression type: u8
//!   Loop start frame: u32 LE
//!
//! Payload:
//!   Uncompressed: frame_count * width * height * depth * 4 bytes
//!   RLE: sequence of [count, H, S, B, A] runs, 1 <= count <= 255
//! ```
//!
//! Voxels are ordered frame-major, then Z (slowest), Y, X (fastest).

mod color;
mod container;
mod header;
mod rle;

use std::io;

pub use color::{Hsba, decode_color, encode_color};
pub use container::{CompressOutcome, compress_file, decompress_file, decompress_file_with};
pub use header::{
    ColorModel, CompressionType, FORMAT_MAGIC, FORMAT_VERSION, HEADER_SIZE, Header, HeaderFlags,
    HeaderOptions, build_header, parse_header,
};
pub use rle::{MismatchPolicy, RUN_SIZE, compress, decompress, decompress_with};

/// Size of one color record in the voxel stream.
pub const COLOR_SIZE: usize = 4;

/// Errors raised while encoding or decoding HGLY data.
#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("Header too short: {0} bytes (need 28)")]
    TruncatedHeader(usize),

    #[error("Invalid HGLY magic bytes: {0:?}")]
    BadMagic([u8; 4]),

    #[error("Unsupported compression type: {0}")]
    UnsupportedCompression(u8),

    #[error("Malformed color '{input}': {reason}")]
    MalformedColor { input: String, reason: String },

    #[error("Voxel stream length {0} is not a multiple of 4")]
    MisalignedVoxels(usize),

    #[error("Compressed stream ends mid-run ({0} trailing bytes)")]
    TruncatedRun(usize),

    #[error("Run at byte {0} has a zero count")]
    EmptyRun(usize),

    #[error("Decompressed length mismatch: expected {expected} bytes, got {actual}")]
    DecompressionMismatch { expected: usize, actual: usize },

    #[error("Payload is {actual} bytes, header describes {expected}")]
    PayloadSize { expected: usize, actual: usize },

    #[error("Payload of {0} bytes does not fit in memory")]
    PayloadTooLarge(u64),

    #[error("Header declares zero frames")]
    NoFrames,

    #[error("Loop start frame {loop_start_frame} is outside {frame_count} frames")]
    LoopStartOutOfRange {
        loop_start_frame: u32,
        frame_count: u32,
    },

    #[error("Voxel stride of {0} bytes cannot hold a color record")]
    UnsupportedVoxelStride(u8),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
