//! Run-length codec over 4-byte color records.

use log::warn;

use super::{COLOR_SIZE, FormatError};

/// Size of one `[count, H, S, B, A]` run in bytes.
pub const RUN_SIZE: usize = 1 + COLOR_SIZE;

/// Longest run a single record can describe.
const MAX_RUN: usize = u8::MAX as usize;

/// What to do when a compressed stream expands to the wrong length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MismatchPolicy {
    /// Fail with [`FormatError::DecompressionMismatch`].
    #[default]
    Reject,
    /// Zero-pad a short result or truncate a long one, logging a warning.
    PadOrTruncate,
}

/// Compress a raw voxel stream into `[count, H, S, B, A]` runs.
pub fn compress(raw: &[u8]) -> Result<Vec<u8>, FormatError> {
    if raw.len() % COLOR_SIZE != 0 {
        return Err(FormatError::MisalignedVoxels(raw.len()));
    }

    let mut out = Vec::new();
    let mut records = raw.chunks_exact(COLOR_SIZE).peekable();

    while let Some(color) = records.next() {
        let mut count = 1;
        while count < MAX_RUN && records.peek() == Some(&color) {
            records.next();
            count += 1;
        }
        out.push(count as u8);
        out.extend_from_slice(color);
    }

    Ok(out)
}

/// Decompress runs, requiring exactly `expected_len` output bytes.
pub fn decompress(compressed: &[u8], expected_len: usize) -> Result<Vec<u8>, FormatError> {
    decompress_with(compressed, expected_len, MismatchPolicy::Reject)
}

/// Decompress runs, resolving a length mismatch according to `policy`.
///
/// Malformed runs (zero count, trailing partial run) are always errors.
pub fn decompress_with(
    compressed: &[u8],
    expected_len: usize,
    policy: MismatchPolicy,
) -> Result<Vec<u8>, FormatError> {
    let trailing = compressed.len() % RUN_SIZE;
    if trailing != 0 {
        return Err(FormatError::TruncatedRun(trailing));
    }

    // `expected_len` comes from a header; never reserve more than the runs can fill.
    let max_output = compressed.len() / RUN_SIZE * MAX_RUN * COLOR_SIZE;
    let mut out = Vec::with_capacity(expected_len.min(max_output));
    let mut produced = 0usize;

    for (i, run) in compressed.chunks_exact(RUN_SIZE).enumerate() {
        let count = usize::from(run[0]);
        if count == 0 {
            return Err(FormatError::EmptyRun(i * RUN_SIZE));
        }
        let color = &run[1..];
        produced += count * COLOR_SIZE;

        for _ in 0..count {
            if out.len() >= expected_len {
                break;
            }
            out.extend_from_slice(color);
        }
    }
    out.truncate(expected_len);

    if produced != expected_len {
        match policy {
            MismatchPolicy::Reject => {
                return Err(FormatError::DecompressionMismatch {
                    expected: expected_len,
                    actual: produced,
                });
            }
            MismatchPolicy::PadOrTruncate => {
                warn!(
                    "RLE stream expands to {} bytes, expected {}; {}",
                    produced,
                    expected_len,
                    if produced < expected_len {
                        "zero-padding"
                    } else {
                        "truncating"
                    }
                );
                out.try_reserve_exact(expected_len - out.len())
                    .map_err(|_| FormatError::PayloadTooLarge(expected_len as u64))?;
                out.resize(expected_len, 0);
            }
        }
    }

    Ok(out)
}
