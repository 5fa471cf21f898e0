//! Whole-file compression: header plus payload.

use log::{debug, warn};

use super::header::{CompressionType, HEADER_SIZE, Header};
use super::rle::{self, MismatchPolicy};
use super::FormatError;

/// Result of [`compress_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressOutcome {
    /// Payload was RLE-compressed.
    Compressed(Vec<u8>),
    /// Input was already compressed and is returned untouched.
    AlreadyCompressed(Vec<u8>),
}

impl CompressOutcome {
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            CompressOutcome::Compressed(b) | CompressOutcome::AlreadyCompressed(b) => b,
        }
    }

    pub fn was_already_compressed(&self) -> bool {
        matches!(self, CompressOutcome::AlreadyCompressed(_))
    }
}

/// Compress the payload of an uncompressed file.
///
/// An already-compressed file comes back as [`CompressOutcome::AlreadyCompressed`].
pub fn compress_file(buffer: &[u8]) -> Result<CompressOutcome, FormatError> {
    let header = Header::from_bytes(buffer)?;

    if header.compression == CompressionType::Rle {
        warn!("File is already RLE-compressed; leaving it unchanged");
        return Ok(CompressOutcome::AlreadyCompressed(buffer.to_vec()));
    }

    let payload = &buffer[HEADER_SIZE..];
    let expected = header.payload_size_bytes()?;
    if payload.len() != expected {
        return Err(FormatError::PayloadSize {
            expected,
            actual: payload.len(),
        });
    }

    let packed = rle::compress(payload)?;
    debug!(
        "RLE compressed payload {} -> {} bytes",
        payload.len(),
        packed.len()
    );

    let mut out = Vec::with_capacity(HEADER_SIZE + packed.len());
    out.extend_from_slice(&header.with_compression(CompressionType::Rle).to_bytes());
    out.extend_from_slice(&packed);
    Ok(CompressOutcome::Compressed(out))
}

/// Decompress an RLE file; uncompressed input is returned unchanged.
pub fn decompress_file(buffer: &[u8]) -> Result<Vec<u8>, FormatError> {
    decompress_file_with(buffer, MismatchPolicy::Reject)
}

/// [`decompress_file`] with an explicit length-mismatch policy.
pub fn decompress_file_with(
    buffer: &[u8],
    policy: MismatchPolicy,
) -> Result<Vec<u8>, FormatError> {
    let header = Header::from_bytes(buffer)?;

    match header.compression {
        CompressionType::None => Ok(buffer.to_vec()),
        CompressionType::Rle => {
            let expected = header.payload_size_bytes()?;
            let raw = rle::decompress_with(&buffer[HEADER_SIZE..], expected, policy)?;

            let mut out = Vec::with_capacity(HEADER_SIZE + raw.len());
            out.extend_from_slice(&header.with_compression(CompressionType::None).to_bytes());
            out.extend_from_slice(&raw);
            Ok(out)
        }
    }
}
