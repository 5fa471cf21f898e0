//! In-memory animation: header plus decompressed voxel stream.

use std::fs;
use std::path::Path;

use super::RangeError;
use crate::format::{
    COLOR_SIZE, CompressOutcome, CompressionType, FormatError, HEADER_SIZE, Header, HeaderOptions,
    Hsba, compress_file, decode_color, decompress_file, encode_color,
};

/// A decoded HGLY animation.
///
/// The header always describes the voxels as uncompressed; compression is
/// chosen when serializing.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    header: Header,
    voxels: Vec<u8>,
}

impl Animation {
    /// Create a blank animation with every voxel transparent.
    ///
    /// A voxel stride below one color record is raised to 4 bytes.
    pub fn new(options: &HeaderOptions) -> Result<Self, FormatError> {
        let options = HeaderOptions {
            bytes_per_voxel: options.bytes_per_voxel.max(COLOR_SIZE as u8),
            compression: CompressionType::None,
            ..options.clone()
        };
        let header = Header::from_options(&options);
        let voxels = vec![0u8; header.payload_size_bytes()?];
        Ok(Self { header, voxels })
    }

    /// Decode a file buffer, decompressing if necessary.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FormatError> {
        let raw = decompress_file(bytes)?;
        let header = Header::from_bytes(&raw)?;

        if usize::from(header.bytes_per_voxel) < COLOR_SIZE {
            return Err(FormatError::UnsupportedVoxelStride(header.bytes_per_voxel));
        }

        if header.frame_count == 0 {
            return Err(FormatError::NoFrames);
        }
        if header.loop_start_frame >= header.frame_count {
            return Err(FormatError::LoopStartOutOfRange {
                loop_start_frame: header.loop_start_frame,
                frame_count: header.frame_count,
            });
        }

        let expected = header.payload_size_bytes()?;
        let payload = &raw[HEADER_SIZE..];
        if payload.len() != expected {
            return Err(FormatError::PayloadSize {
                expected,
                actual: payload.len(),
            });
        }

        Ok(Self {
            header,
            voxels: payload.to_vec(),
        })
    }

    /// Serialize with the requested compression.
    pub fn to_bytes(&self, compression: CompressionType) -> Result<Vec<u8>, FormatError> {
        let mut raw = Vec::with_capacity(HEADER_SIZE + self.voxels.len());
        raw.extend_from_slice(&self.header.to_bytes());
        raw.extend_from_slice(&self.voxels);

        match compression {
            CompressionType::None => Ok(raw),
            CompressionType::Rle => compress_file(&raw).map(CompressOutcome::into_bytes),
        }
    }

    /// Load an animation file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FormatError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    /// Write an animation file.
    pub fn save<P: AsRef<Path>>(
        &self,
        path: P,
        compression: CompressionType,
    ) -> Result<(), FormatError> {
        fs::write(path, self.to_bytes(compression)?)?;
        Ok(())
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Grid dimensions (width, height, depth).
    pub fn dimensions(&self) -> (usize, usize, usize) {
        (
            usize::from(self.header.width),
            usize::from(self.header.height),
            usize::from(self.header.depth),
        )
    }

    /// The whole decompressed voxel stream.
    pub fn voxels(&self) -> &[u8] {
        &self.voxels
    }

    /// Borrow one frame's bytes.
    pub fn frame(&self, index: usize) -> Result<&[u8], RangeError> {
        self.check_frame(index)?;
        let size = self.header.frame_size_bytes();
        Ok(&self.voxels[index * size..(index + 1) * size])
    }

    fn check_frame(&self, index: usize) -> Result<(), RangeError> {
        if index >= self.frame_count() {
            return Err(RangeError::Frame {
                index,
                frame_count: self.frame_count(),
            });
        }
        Ok(())
    }

    /// Byte offset of a voxel in the stream (Z slowest, X fastest).
    fn voxel_offset(
        &self,
        frame: usize,
        x: usize,
        y: usize,
        z: usize,
    ) -> Result<usize, RangeError> {
        self.check_frame(frame)?;
        let (width, height, depth) = self.dimensions();
        if x >= width || y >= height || z >= depth {
            return Err(RangeError::Voxel {
                x,
                y,
                z,
                width,
                height,
                depth,
            });
        }
        let cell = (z * height + y) * width + x;
        Ok(frame * self.header.frame_size_bytes() + cell * usize::from(self.header.bytes_per_voxel))
    }

    /// Read a voxel's color.
    pub fn voxel(&self, frame: usize, x: usize, y: usize, z: usize) -> Result<Hsba, RangeError> {
        let offset = self.voxel_offset(frame, x, y, z)?;
        let mut record = [0u8; COLOR_SIZE];
        record.copy_from_slice(&self.voxels[offset..offset + COLOR_SIZE]);
        Ok(decode_color(record))
    }

    /// Write a voxel's color.
    pub fn set_voxel(
        &mut self,
        frame: usize,
        x: usize,
        y: usize,
        z: usize,
        color: impl Into<Hsba>,
    ) -> Result<(), RangeError> {
        let offset = self.voxel_offset(frame, x, y, z)?;
        self.voxels[offset..offset + COLOR_SIZE].copy_from_slice(&encode_color(color));
        Ok(())
    }

    /// Fill every voxel of a frame with one color.
    pub fn fill_frame(&mut self, frame: usize, color: impl Into<Hsba>) -> Result<(), RangeError> {
        self.check_frame(frame)?;
        let record = encode_color(color);
        let size = self.header.frame_size_bytes();
        let stride = usize::from(self.header.bytes_per_voxel);
        for voxel in self.voxels[frame * size..(frame + 1) * size].chunks_exact_mut(stride) {
            voxel[..COLOR_SIZE].copy_from_slice(&record);
        }
        Ok(())
    }

    /// Append a transparent frame; returns its index.
    pub fn push_frame(&mut self) -> usize {
        let size = self.header.frame_size_bytes();
        self.voxels.resize(self.voxels.len() + size, 0);
        self.header = self.header.with_frame_count(self.header.frame_count + 1);
        self.frame_count() - 1
    }

    /// Insert a copy of `index` right after it; returns the copy's index.
    pub fn duplicate_frame(&mut self, index: usize) -> Result<usize, RangeError> {
        let copy = self.frame(index)?.to_vec();
        let at = (index + 1) * self.header.frame_size_bytes();
        self.voxels.splice(at..at, copy);
        self.header = self.header.with_frame_count(self.header.frame_count + 1);
        Ok(index + 1)
    }

    /// Remove a frame. The last remaining frame cannot be removed.
    pub fn remove_frame(&mut self, index: usize) -> Result<(), RangeError> {
        self.check_frame(index)?;
        if self.frame_count() == 1 {
            return Err(RangeError::LastFrame);
        }
        let size = self.header.frame_size_bytes();
        self.voxels.drain(index * size..(index + 1) * size);
        self.header = self.header.with_frame_count(self.header.frame_count - 1);
        Ok(())
    }

    /// Replace timing metadata.
    pub fn set_timing(&mut self, frame_duration_ms: u32, looping: bool, loop_start_frame: u32) {
        let mut options = self.header.to_options();
        options.frame_duration_ms = frame_duration_ms;
        options.looping = looping;
        options.loop_start_frame = loop_start_frame;
        options.compression = CompressionType::None;
        self.header = Header::from_options(&options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn small_options() -> HeaderOptions {
        HeaderOptions {
            width: 3,
            height: 2,
            depth: 2,
            frame_count: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_is_transparent() {
        let anim = Animation::new(&small_options()).unwrap();
        assert_eq!(anim.voxels().len(), 3 * 2 * 2 * 4 * 2);
        let c = anim.voxel(1, 2, 1, 1).unwrap();
        assert_eq!(c.alpha, 0.0);
    }

    #[test]
    fn test_set_voxel_uses_zyx_order() {
        let mut anim = Animation::new(&small_options()).unwrap();
        anim.set_voxel(1, 2, 1, 1, (10.0, 100.0, 100.0, 100.0)).unwrap();

        let frame = anim.frame(1).unwrap();
        // Last cell of the frame: z=1, y=1, x=2.
        let last = &frame[frame.len() - 4..];
        assert_eq!(last, &[10, 255, 255, 255]);
        assert!(anim.frame(0).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_out_of_bounds_voxel() {
        let mut anim = Animation::new(&small_options()).unwrap();
        assert!(matches!(
            anim.voxel(0, 3, 0, 0),
            Err(RangeError::Voxel { x: 3, .. })
        ));
        assert!(matches!(
            anim.set_voxel(2, 0, 0, 0, Hsba::TRANSPARENT),
            Err(RangeError::Frame { index: 2, .. })
        ));
    }

    #[test]
    fn test_bytes_roundtrip_both_compressions() {
        let mut anim = Animation::new(&small_options()).unwrap();
        anim.fill_frame(0, (0.0, 100.0, 100.0, 100.0)).unwrap();
        anim.set_voxel(1, 0, 0, 0, (90.0, 40.0, 60.0, 80.0)).unwrap();

        for compression in [CompressionType::None, CompressionType::Rle] {
            let bytes = anim.to_bytes(compression).unwrap();
            assert_eq!(bytes[23], compression as u8);
            let loaded = Animation::from_bytes(&bytes).unwrap();
            assert_eq!(loaded, anim);
        }
    }

    #[test]
    fn test_payload_size_checked() {
        let mut bytes = Animation::new(&small_options())
            .unwrap()
            .to_bytes(CompressionType::None)
            .unwrap();
        bytes.truncate(bytes.len() - 4);
        assert!(matches!(
            Animation::from_bytes(&bytes),
            Err(FormatError::PayloadSize { .. })
        ));
    }

    #[test]
    fn test_zero_frame_file_rejected() {
        let mut bytes = Animation::new(&small_options())
            .unwrap()
            .to_bytes(CompressionType::None)
            .unwrap();
        bytes[12..16].copy_from_slice(&0u32.to_le_bytes());
        bytes.truncate(HEADER_SIZE);
        assert!(matches!(
            Animation::from_bytes(&bytes),
            Err(FormatError::NoFrames)
        ));
    }

    #[test]
    fn test_loop_start_beyond_last_frame_rejected() {
        let mut bytes = Animation::new(&small_options())
            .unwrap()
            .to_bytes(CompressionType::Rle)
            .unwrap();
        bytes[24..28].copy_from_slice(&2u32.to_le_bytes());
        assert!(matches!(
            Animation::from_bytes(&bytes),
            Err(FormatError::LoopStartOutOfRange {
                loop_start_frame: 2,
                frame_count: 2
            })
        ));
    }

    #[test]
    fn test_frame_editing() {
        let mut anim = Animation::new(&small_options()).unwrap();
        anim.fill_frame(0, (5.0, 100.0, 100.0, 100.0)).unwrap();

        let copy = anim.duplicate_frame(0).unwrap();
        assert_eq!(copy, 1);
        assert_eq!(anim.frame_count(), 3);
        assert_eq!(anim.frame(0).unwrap(), anim.frame(1).unwrap());

        let pushed = anim.push_frame();
        assert_eq!(pushed, 3);
        assert_eq!(anim.header().frame_count, 4);

        anim.remove_frame(0).unwrap();
        anim.remove_frame(0).unwrap();
        anim.remove_frame(0).unwrap();
        assert_eq!(anim.remove_frame(0), Err(RangeError::LastFrame));
    }

    #[test]
    fn test_remove_frame_keeps_loop_start_in_range() {
        let mut anim = Animation::new(&small_options()).unwrap();
        anim.set_timing(50, true, 1);
        anim.remove_frame(1).unwrap();
        assert_eq!(anim.header().loop_start_frame, 0);
    }

    #[test]
    fn test_save_and_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cube.hgly");

        let mut anim = Animation::new(&small_options()).unwrap();
        anim.set_voxel(0, 1, 1, 0, (30.0, 80.0, 90.0, 100.0)).unwrap();
        anim.save(&path, CompressionType::Rle).unwrap();

        let loaded = Animation::open(&path).unwrap();
        assert_eq!(loaded, anim);
    }
}
