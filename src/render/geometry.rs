//! Voxel frame to cube instances: culling, color conversion and placement.

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use crate::format::{COLOR_SIZE, FormatError, Header, Hsba, decode_color};

/// One visible voxel, ready to draw as a unit cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubeInstance {
    /// World-space center; the grid is centered on the origin.
    pub translation: Vec3,
    /// Normalized RGBA.
    pub rgba: [f32; 4],
    /// Cell index within the frame (Z slowest, X fastest).
    pub source_index: usize,
}

impl CubeInstance {
    pub fn to_raw(&self) -> InstanceRaw {
        InstanceRaw {
            translation: self.translation.to_array(),
            color: self.rgba,
        }
    }
}

/// GPU-layout instance record.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct InstanceRaw {
    pub translation: [f32; 3],
    pub color: [f32; 4],
}

/// View a slice of instance records as bytes for buffer upload.
pub fn instances_as_bytes(instances: &[InstanceRaw]) -> &[u8] {
    bytemuck::cast_slice(instances)
}

/// Convert HSBA to normalized RGBA.
///
/// Hue is the byte-range value (255 wraps to 0°); the rest are percentages.
pub fn hsba_to_rgba(color: &Hsba) -> [f32; 4] {
    let degrees = (color.hue * 360.0 / 255.0).rem_euclid(360.0);
    let s = (color.saturation / 100.0).clamp(0.0, 1.0);
    let v = (color.brightness / 100.0).clamp(0.0, 1.0);
    let a = (color.alpha / 100.0).clamp(0.0, 1.0);

    let chroma = v * s;
    let sector = degrees / 60.0;
    let x = chroma * (1.0 - (sector.rem_euclid(2.0) - 1.0).abs());
    let m = v - chroma;

    let (r, g, b) = match sector as u32 {
        0 => (chroma, x, 0.0),
        1 => (x, chroma, 0.0),
        2 => (0.0, chroma, x),
        3 => (0.0, x, chroma),
        4 => (x, 0.0, chroma),
        _ => (chroma, 0.0, x),
    };

    [r + m, g + m, b + m, a]
}

/// Walks a frame's voxel bytes and emits the visible cubes.
#[derive(Debug, Clone, Copy)]
pub struct GeometryProjector {
    width: usize,
    height: usize,
    depth: usize,
    stride: usize,
}

impl GeometryProjector {
    pub fn new(header: &Header) -> Result<Self, FormatError> {
        if usize::from(header.bytes_per_voxel) < COLOR_SIZE {
            return Err(FormatError::UnsupportedVoxelStride(header.bytes_per_voxel));
        }
        Ok(Self {
            width: usize::from(header.width),
            height: usize::from(header.height),
            depth: usize::from(header.depth),
            stride: usize::from(header.bytes_per_voxel),
        })
    }

    /// Bytes in one frame.
    pub fn frame_size(&self) -> usize {
        self.width * self.height * self.depth * self.stride
    }

    /// Largest grid side, used to fit the projection.
    pub fn scene_extent(&self) -> f32 {
        self.width.max(self.height).max(self.depth) as f32
    }

    /// World-space center of cell (x, y, z).
    pub fn cell_translation(&self, x: usize, y: usize, z: usize) -> Vec3 {
        Vec3::new(
            x as f32 - self.width as f32 / 2.0,
            y as f32 - self.height as f32 / 2.0,
            z as f32 - self.depth as f32 / 2.0,
        )
    }

    /// Lazily project a frame. The slice must be exactly one frame.
    pub fn iter<'a>(
        &self,
        frame: &'a [u8],
    ) -> Result<impl Iterator<Item = CubeInstance> + 'a, FormatError> {
        if frame.len() != self.frame_size() {
            return Err(FormatError::PayloadSize {
                expected: self.frame_size(),
                actual: frame.len(),
            });
        }

        let projector = *self;
        Ok(frame
            .chunks_exact(self.stride)
            .enumerate()
            .filter_map(move |(index, voxel)| {
                let color = decode_color([voxel[0], voxel[1], voxel[2], voxel[3]]);
                if color.is_invisible() {
                    return None;
                }
                let x = index % projector.width;
                let y = (index / projector.width) % projector.height;
                let z = index / (projector.width * projector.height);
                Some(CubeInstance {
                    translation: projector.cell_translation(x, y, z),
                    rgba: hsba_to_rgba(&color),
                    source_index: index,
                })
            }))
    }

    /// Project a frame into a list of visible cubes.
    pub fn project(&self, frame: &[u8]) -> Result<Vec<CubeInstance>, FormatError> {
        Ok(self.iter(frame)?.collect())
    }
}
