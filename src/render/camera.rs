//! Orbit camera: two angles and a zoom factor around the origin.

use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec3, Vec4};

use crate::schema::{CameraConfig, ZOOM_LIMITS};

/// Near clip plane of the orthographic projection.
pub const NEAR_PLANE: f32 = 0.1;
/// Far clip plane of the orthographic projection.
pub const FAR_PLANE: f32 = 1000.0;
/// Margin around the scene in the projection.
const SCENE_MARGIN: f32 = 1.2;

/// Camera orbiting the grid center.
///
/// All setters clamp: pitch to [-π/2, π/2], zoom to the configured range.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    rotation_x: f32,
    rotation_y: f32,
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
    drag_sensitivity: f32,
    zoom_sensitivity: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self::new(&CameraConfig::default())
    }
}

impl OrbitCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let min_zoom = config.min_zoom.max(ZOOM_LIMITS.0);
        let max_zoom = config.max_zoom.min(ZOOM_LIMITS.1).max(min_zoom);
        let mut camera = Self {
            rotation_x: 0.0,
            rotation_y: 0.0,
            zoom: 1.0,
            min_zoom,
            max_zoom,
            drag_sensitivity: config.drag_sensitivity,
            zoom_sensitivity: config.zoom_sensitivity,
        };
        camera.set_rotation(config.initial_rotation_x, config.initial_rotation_y);
        camera.set_zoom(config.initial_zoom);
        camera
    }

    pub fn rotation_x(&self) -> f32 {
        self.rotation_x
    }

    pub fn rotation_y(&self) -> f32 {
        self.rotation_y
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn drag_sensitivity(&self) -> f32 {
        self.drag_sensitivity
    }

    /// Set both angles. Pitch is clamped; yaw is unbounded.
    pub fn set_rotation(&mut self, rotation_x: f32, rotation_y: f32) {
        if rotation_x.is_finite() {
            self.rotation_x = rotation_x.clamp(-FRAC_PI_2, FRAC_PI_2);
        }
        if rotation_y.is_finite() {
            self.rotation_y = rotation_y;
        }
    }

    /// Set zoom, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f32) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        }
    }

    /// Apply a pointer drag of (`dx`, `dy`) pixels.
    pub fn apply_drag_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.set_rotation(
            self.rotation_x + dy * sensitivity,
            self.rotation_y - dx * sensitivity,
        );
    }

    /// Apply a wheel delta; positive deltas zoom out.
    pub fn apply_zoom_delta(&mut self, delta: f32) {
        self.set_zoom(self.zoom - delta * self.zoom_sensitivity);
    }

    /// Apply a pinch gesture's scale factor relative to the previous event.
    pub fn apply_pinch_scale(&mut self, scale: f32) {
        if scale > 0.0 {
            self.set_zoom(self.zoom * scale);
        }
    }

    /// Eye position at `distance` from the origin.
    pub fn eye_position(&self, distance: f32) -> Vec3 {
        let (sin_x, cos_x) = self.rotation_x.sin_cos();
        let (sin_y, cos_y) = self.rotation_y.sin_cos();
        Vec3::new(
            distance * cos_x * sin_y,
            distance * sin_x,
            distance * cos_x * cos_y,
        )
    }

    /// Look-at view matrix from the orbit position toward the origin.
    pub fn view_matrix(&self, distance: f32) -> Mat4 {
        let eye = self.eye_position(distance);
        let forward = eye.try_normalize().unwrap_or(Vec3::Z);
        // Looking straight down or up makes Y parallel to forward.
        let right = Vec3::Y
            .cross(forward)
            .try_normalize()
            .unwrap_or_else(|| Vec3::new(self.rotation_y.cos(), 0.0, -self.rotation_y.sin()));
        let up = forward.cross(right);

        Mat4::from_cols(
            Vec4::new(right.x, up.x, forward.x, 0.0),
            Vec4::new(right.y, up.y, forward.y, 0.0),
            Vec4::new(right.z, up.z, forward.z, 0.0),
            Vec4::new(-right.dot(eye), -up.dot(eye), -forward.dot(eye), 1.0),
        )
    }

    /// Orthographic projection fitted to a scene whose largest side is `scene_extent`.
    pub fn projection_matrix(&self, aspect: f32, scene_extent: f32) -> Mat4 {
        let half_height = scene_extent * SCENE_MARGIN / self.zoom;
        let aspect = if aspect.is_finite() && aspect > 0.0 {
            aspect
        } else {
            1.0
        };
        let half_width = half_height * aspect;
        Mat4::orthographic_rh_gl(
            -half_width,
            half_width,
            -half_height,
            half_height,
            NEAR_PLANE,
            FAR_PLANE,
        )
    }
}
