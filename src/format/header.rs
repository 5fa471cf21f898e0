//! Fixed 28-byte HGLY header.

use log::warn;
use serde::{Deserialize, Serialize};

use super::{COLOR_SIZE, FormatError};

/// Magic bytes identifying an HGLY file.
pub const FORMAT_MAGIC: &[u8; 4] = b"HGLY";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Size of the header in bytes. Payload starts at this offset.
pub const HEADER_SIZE: usize = 28;

const OFFSET_VERSION: usize = 4;
const OFFSET_HEADER_SIZE: usize = 5;
const OFFSET_FLAGS: usize = 6;
const OFFSET_BYTES_PER_VOXEL: usize = 7;
const OFFSET_WIDTH: usize = 8;
const OFFSET_HEIGHT: usize = 9;
const OFFSET_DEPTH: usize = 10;
const OFFSET_COLOR_MODEL: usize = 11;
const OFFSET_FRAME_COUNT: usize = 12;
const OFFSET_FRAME_DURATION: usize = 16;
const OFFSET_RESERVED: usize = 20;
const OFFSET_COMPRESSION: usize = 23;
const OFFSET_LOOP_START: usize = 24;

/// Compression applied to the voxel payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CompressionType {
    /// Raw color records.
    #[default]
    None = 0,
    /// `[count, H, S, B, A]` runs.
    Rle = 1,
}

impl CompressionType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Rle),
            _ => None,
        }
    }
}

/// Color model of the voxel records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorModel {
    /// Hue/saturation/brightness/alpha, one byte each.
    #[default]
    Hsba,
    /// An id this version does not know; carried through untouched.
    Unknown(u8),
}

impl ColorModel {
    pub fn from_u8(v: u8) -> Self {
        match v {
            0 => ColorModel::Hsba,
            other => ColorModel::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            ColorModel::Hsba => 0,
            ColorModel::Unknown(v) => v,
        }
    }
}

/// Header flag bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeaderFlags {
    /// Restart from the loop start frame after the last frame.
    pub looping: bool,
}

impl HeaderFlags {
    const LOOP: u8 = 1;

    pub fn to_u8(self) -> u8 {
        if self.looping { Self::LOOP } else { 0 }
    }

    pub fn from_u8(v: u8) -> Self {
        Self {
            looping: v & Self::LOOP != 0,
        }
    }
}

fn default_dimension() -> u32 {
    32
}

fn default_frame_count() -> u32 {
    1
}

fn default_frame_duration() -> u32 {
    100
}

fn default_loop() -> bool {
    true
}

fn default_bytes_per_voxel() -> u8 {
    COLOR_SIZE as u8
}

/// Options for building a header. Every field has a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderOptions {
    /// Grid width (X), clamped to 1..=255.
    #[serde(default = "default_dimension")]
    pub width: u32,
    /// Grid height (Y), clamped to 1..=255.
    #[serde(default = "default_dimension")]
    pub height: u32,
    /// Grid depth (Z), clamped to 1..=255.
    #[serde(default = "default_dimension")]
    pub depth: u32,
    /// Number of frames, at least 1.
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    /// Duration of one frame in milliseconds.
    #[serde(default = "default_frame_duration")]
    pub frame_duration_ms: u32,
    #[serde(default = "default_loop", rename = "loop")]
    pub looping: bool,
    /// First frame of the loop. Clamped below `frame_count`.
    #[serde(default)]
    pub loop_start_frame: u32,
    #[serde(default = "default_bytes_per_voxel")]
    pub bytes_per_voxel: u8,
    #[serde(default)]
    pub color_model: ColorModel,
    #[serde(default)]
    pub compression: CompressionType,
}

impl Default for HeaderOptions {
    fn default() -> Self {
        Self {
            width: default_dimension(),
            height: default_dimension(),
            depth: default_dimension(),
            frame_count: default_frame_count(),
            frame_duration_ms: default_frame_duration(),
            looping: default_loop(),
            loop_start_frame: 0,
            bytes_per_voxel: default_bytes_per_voxel(),
            color_model: ColorModel::Hsba,
            compression: CompressionType::None,
        }
    }
}

/// Parsed HGLY header. Immutable once parsed; use [`Header::with_compression`]
/// and friends to derive a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: u8,
    /// Header size as declared in the file.
    pub header_size: u8,
    pub flags: HeaderFlags,
    pub bytes_per_voxel: u8,
    pub width: u8,
    pub height: u8,
    pub depth: u8,
    pub color_model: ColorModel,
    pub frame_count: u32,
    pub frame_duration_ms: u32,
    pub reserved: [u8; 3],
    pub compression: CompressionType,
    pub loop_start_frame: u32,
}

impl Header {
    /// Build a header from options, clamping values into their field widths.
    pub fn from_options(options: &HeaderOptions) -> Self {
        let clamp_dim = |v: u32| v.clamp(1, 255) as u8;
        let frame_count = options.frame_count.max(1);

        Self {
            version: FORMAT_VERSION,
            header_size: HEADER_SIZE as u8,
            flags: HeaderFlags {
                looping: options.looping,
            },
            bytes_per_voxel: options.bytes_per_voxel,
            width: clamp_dim(options.width),
            height: clamp_dim(options.height),
            depth: clamp_dim(options.depth),
            color_model: options.color_model,
            frame_count,
            frame_duration_ms: options.frame_duration_ms,
            reserved: [0; 3],
            compression: options.compression,
            loop_start_frame: options.loop_start_frame.min(frame_count - 1),
        }
    }

    /// Options that rebuild this header.
    pub fn to_options(&self) -> HeaderOptions {
        HeaderOptions {
            width: u32::from(self.width),
            height: u32::from(self.height),
            depth: u32::from(self.depth),
            frame_count: self.frame_count,
            frame_duration_ms: self.frame_duration_ms,
            looping: self.flags.looping,
            loop_start_frame: self.loop_start_frame,
            bytes_per_voxel: self.bytes_per_voxel,
            color_model: self.color_model,
            compression: self.compression,
        }
    }

    /// Same metadata, different compression.
    pub fn with_compression(&self, compression: CompressionType) -> Self {
        Self {
            compression,
            ..self.clone()
        }
    }

    /// Same metadata, different frame count. Loop start is pulled back into range.
    pub fn with_frame_count(&self, frame_count: u32) -> Self {
        let frame_count = frame_count.max(1);
        Self {
            frame_count,
            loop_start_frame: self.loop_start_frame.min(frame_count - 1),
            ..self.clone()
        }
    }

    /// Number of voxels in one frame.
    pub fn voxels_per_frame(&self) -> usize {
        usize::from(self.width) * usize::from(self.height) * usize::from(self.depth)
    }

    /// Size of one uncompressed frame in bytes.
    pub fn frame_size_bytes(&self) -> usize {
        self.voxels_per_frame() * usize::from(self.bytes_per_voxel)
    }

    /// Size of the whole uncompressed payload in bytes.
    ///
    /// Fails when the size cannot be addressed on this target.
    pub fn payload_size_bytes(&self) -> Result<usize, FormatError> {
        // 255^3 * 255 * u32::MAX still fits in u64.
        let bytes = self.frame_size_bytes() as u64 * u64::from(self.frame_count);
        usize::try_from(bytes).map_err(|_| FormatError::PayloadTooLarge(bytes))
    }

    pub fn looping(&self) -> bool {
        self.flags.looping
    }

    /// True if the file was written by a newer format revision.
    pub fn is_newer_than_supported(&self) -> bool {
        self.version > FORMAT_VERSION
    }

    /// Write header to its 28-byte form.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut b = [0u8; HEADER_SIZE];
        b[..4].copy_from_slice(FORMAT_MAGIC);
        b[OFFSET_VERSION] = self.version;
        b[OFFSET_HEADER_SIZE] = self.header_size;
        b[OFFSET_FLAGS] = self.flags.to_u8();
        b[OFFSET_BYTES_PER_VOXEL] = self.bytes_per_voxel;
        b[OFFSET_WIDTH] = self.width;
        b[OFFSET_HEIGHT] = self.height;
        b[OFFSET_DEPTH] = self.depth;
        b[OFFSET_COLOR_MODEL] = self.color_model.to_u8();
        b[OFFSET_FRAME_COUNT..OFFSET_FRAME_COUNT + 4]
            .copy_from_slice(&self.frame_count.to_le_bytes());
        b[OFFSET_FRAME_DURATION..OFFSET_FRAME_DURATION + 4]
            .copy_from_slice(&self.frame_duration_ms.to_le_bytes());
        b[OFFSET_RESERVED..OFFSET_COMPRESSION].copy_from_slice(&self.reserved);
        b[OFFSET_COMPRESSION] = self.compression as u8;
        b[OFFSET_LOOP_START..OFFSET_LOOP_START + 4]
            .copy_from_slice(&self.loop_start_frame.to_le_bytes());
        b
    }

    /// Read header from the start of `bytes`. Trailing bytes are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FormatError::TruncatedHeader(bytes.len()));
        }

        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if &magic != FORMAT_MAGIC {
            return Err(FormatError::BadMagic(magic));
        }

        let read_u32 = |offset: usize| {
            u32::from_le_bytes([
                bytes[offset],
                bytes[offset + 1],
                bytes[offset + 2],
                bytes[offset + 3],
            ])
        };

        let compression = CompressionType::from_u8(bytes[OFFSET_COMPRESSION])
            .ok_or(FormatError::UnsupportedCompression(bytes[OFFSET_COMPRESSION]))?;

        let header = Self {
            version: bytes[OFFSET_VERSION],
            header_size: bytes[OFFSET_HEADER_SIZE],
            flags: HeaderFlags::from_u8(bytes[OFFSET_FLAGS]),
            bytes_per_voxel: bytes[OFFSET_BYTES_PER_VOXEL],
            width: bytes[OFFSET_WIDTH],
            height: bytes[OFFSET_HEIGHT],
            depth: bytes[OFFSET_DEPTH],
            color_model: ColorModel::from_u8(bytes[OFFSET_COLOR_MODEL]),
            frame_count: read_u32(OFFSET_FRAME_COUNT),
            frame_duration_ms: read_u32(OFFSET_FRAME_DURATION),
            reserved: [
                bytes[OFFSET_RESERVED],
                bytes[OFFSET_RESERVED + 1],
                bytes[OFFSET_RESERVED + 2],
            ],
            compression,
            loop_start_frame: read_u32(OFFSET_LOOP_START),
        };

        if header.is_newer_than_supported() {
            warn!(
                "HGLY version {} is newer than supported version {}",
                header.version, FORMAT_VERSION
            );
        }

        Ok(header)
    }
}

/// Build header bytes from options.
pub fn build_header(options: &HeaderOptions) -> [u8; HEADER_SIZE] {
    Header::from_options(options).to_bytes()
}

/// Parse header bytes.
pub fn parse_header(bytes: &[u8]) -> Result<Header, FormatError> {
    Header::from_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_layout() {
        let bytes = build_header(&HeaderOptions::default());
        assert_eq!(bytes.len(), HEADER_SIZE);
        assert_eq!(&bytes[..4], b"HGLY");
        assert_eq!(bytes[4], 1);
        assert_eq!(bytes[5], 28);
        assert_eq!(bytes[6], 1);
        assert_eq!(bytes[7], 4);
        assert_eq!(&bytes[8..11], &[32, 32, 32]);
        assert_eq!(bytes[11], 0);
        assert_eq!(&bytes[12..16], &1u32.to_le_bytes());
        assert_eq!(&bytes[16..20], &100u32.to_le_bytes());
        assert_eq!(&bytes[20..24], &[0, 0, 0, 0]);
        assert_eq!(&bytes[24..28], &0u32.to_le_bytes());
    }

    #[test]
    fn test_compression_byte_offset() {
        let options = HeaderOptions {
            compression: CompressionType::Rle,
            ..Default::default()
        };
        let bytes = build_header(&options);
        assert_eq!(bytes[23], 1);
        assert_eq!(&bytes[20..23], &[0, 0, 0]);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = build_header(&HeaderOptions::default());
        let err = parse_header(&bytes[..27]).unwrap_err();
        assert!(matches!(err, FormatError::TruncatedHeader(27)));
    }

    #[test]
    fn test_bad_magic() {
        let mut bytes = build_header(&HeaderOptions::default());
        bytes[0] = b'X';
        let err = parse_header(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::BadMagic(_)));
    }

    #[test]
    fn test_unknown_compression_rejected() {
        let mut bytes = build_header(&HeaderOptions::default());
        bytes[23] = 9;
        let err = parse_header(&bytes).unwrap_err();
        assert!(matches!(err, FormatError::UnsupportedCompression(9)));
    }

    #[test]
    fn test_future_version_parses() {
        let mut bytes = build_header(&HeaderOptions::default());
        bytes[4] = 7;
        let header = parse_header(&bytes).unwrap();
        assert_eq!(header.version, 7);
        assert!(header.is_newer_than_supported());
    }

    #[test]
    fn test_dimensions_clamped() {
        let options = HeaderOptions {
            width: 0,
            height: 1000,
            depth: 255,
            ..Default::default()
        };
        let header = parse_header(&build_header(&options)).unwrap();
        assert_eq!((header.width, header.height, header.depth), (1, 255, 255));
    }

    #[test]
    fn test_loop_start_clamped_below_frame_count() {
        let options = HeaderOptions {
            frame_count: 3,
            loop_start_frame: 10,
            ..Default::default()
        };
        let header = Header::from_options(&options);
        assert_eq!(header.loop_start_frame, 2);
    }

    #[test]
    fn test_frame_size_derived() {
        let options = HeaderOptions {
            width: 2,
            height: 3,
            depth: 4,
            frame_count: 5,
            ..Default::default()
        };
        let header = Header::from_options(&options);
        assert_eq!(header.frame_size_bytes(), 2 * 3 * 4 * 4);
        assert_eq!(header.payload_size_bytes().unwrap(), 2 * 3 * 4 * 4 * 5);
    }

    #[test]
    fn test_largest_payload_size_does_not_wrap() {
        let bytes = build_header(&HeaderOptions {
            width: 255,
            height: 255,
            depth: 255,
            frame_count: u32::MAX,
            bytes_per_voxel: 255,
            ..Default::default()
        });
        let header = parse_header(&bytes).unwrap();
        let expected = 255u64.pow(4) * u64::from(u32::MAX);
        match header.payload_size_bytes() {
            Ok(size) => assert_eq!(size as u64, expected),
            Err(FormatError::PayloadTooLarge(size)) => assert_eq!(size, expected),
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    #[test]
    fn test_options_from_json_defaults() {
        let options: HeaderOptions =
            serde_json::from_str(r#"{"width": 8, "loop": false}"#).unwrap();
        assert_eq!(options.width, 8);
        assert_eq!(options.height, 32);
        assert!(!options.looping);
        assert_eq!(options.frame_duration_ms, 100);
    }

    fn options_strategy() -> impl Strategy<Value = HeaderOptions> {
        (
            1u32..=255,
            1u32..=255,
            1u32..=255,
            1u32..=100_000,
            any::<u32>(),
            any::<bool>(),
            any::<prop::sample::Index>(),
            prop_oneof![Just(CompressionType::None), Just(CompressionType::Rle)],
            1u8..=255,
            any::<u8>().prop_map(ColorModel::from_u8),
        )
            .prop_map(
                |(
                    width,
                    height,
                    depth,
                    frame_count,
                    frame_duration_ms,
                    looping,
                    idx,
                    compression,
                    bytes_per_voxel,
                    color_model,
                )| HeaderOptions {
                    width,
                    height,
                    depth,
                    frame_count,
                    frame_duration_ms,
                    looping,
                    loop_start_frame: idx.index(frame_count as usize) as u32,
                    bytes_per_voxel,
                    color_model,
                    compression,
                },
            )
    }

    proptest! {
        #[test]
        fn test_header_roundtrip(options in options_strategy()) {
            let header = parse_header(&build_header(&options)).unwrap();
            prop_assert_eq!(header.to_options(), options);
            prop_assert_eq!(header.version, FORMAT_VERSION);
            prop_assert_eq!(header.header_size as usize, HEADER_SIZE);
        }

        #[test]
        fn test_unknown_color_model_roundtrip(id in 1u8..=255) {
            let options = HeaderOptions {
                color_model: ColorModel::Unknown(id),
                ..Default::default()
            };
            let header = parse_header(&build_header(&options)).unwrap();
            prop_assert_eq!(header.color_model, ColorModel::Unknown(id));
            prop_assert_eq!(header.to_options(), options);
        }
    }
}
