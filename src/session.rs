//! Playback session: one animation, its clock, a camera and a renderer.
//!
//! The host forwards ticks and input deltas; the session redraws whenever
//! the visible frame or the camera changes.

use glam::Vec3;

use crate::animation::{Animation, PlaybackEngine, PlaybackStatus, RangeError};
use crate::format::FormatError;
use crate::render::{
    CubeInstance, FrameGeometry, GeometryProjector, OrbitCamera, RenderError, Renderer,
    RendererBackend, select_renderer,
};
use crate::schema::{ConfigError, SessionConfig};

/// Errors from the composition layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A playing animation bound to a renderer.
pub struct Session {
    animation: Animation,
    engine: PlaybackEngine,
    camera: OrbitCamera,
    projector: GeometryProjector,
    renderer: Box<dyn Renderer>,
    light_direction: Vec3,
    camera_distance: f32,
    viewport: (u32, u32),
    instances: Vec<CubeInstance>,
}

impl Session {
    /// Bind an animation to a renderer and draw frame 0.
    pub fn new(
        animation: Animation,
        renderer: Box<dyn Renderer>,
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        config.validate()?;
        let projector = GeometryProjector::new(animation.header())?;
        let engine = PlaybackEngine::new(animation.header());
        let camera_distance = projector.scene_extent() * config.camera_distance_factor;

        let mut session = Self {
            animation,
            engine,
            camera: OrbitCamera::new(&config.camera),
            projector,
            renderer,
            light_direction: Vec3::from_array(config.light_direction).normalize(),
            camera_distance,
            viewport: (1, 1),
            instances: Vec::new(),
        };
        session.render()?;
        Ok(session)
    }

    /// Like [`Session::new`], picking the first backend that is available.
    pub fn with_backends(
        animation: Animation,
        backends: &[&dyn RendererBackend],
        config: &SessionConfig,
    ) -> Result<Self, SessionError> {
        let renderer = select_renderer(backends)?;
        Self::new(animation, renderer, config)
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn engine(&self) -> &PlaybackEngine {
        &self.engine
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn renderer(&self) -> &dyn Renderer {
        self.renderer.as_ref()
    }

    pub fn status(&self) -> PlaybackStatus {
        self.engine.status()
    }

    pub fn current_frame(&self) -> usize {
        self.engine.current_frame()
    }

    /// Cubes drawn by the last render.
    pub fn instances(&self) -> &[CubeInstance] {
        &self.instances
    }

    pub fn play(&mut self) {
        self.engine.play();
    }

    pub fn pause(&mut self) {
        self.engine.pause();
    }

    pub fn toggle(&mut self) {
        self.engine.toggle();
    }

    /// Stop and redraw frame 0.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        self.engine.stop();
        self.render()
    }

    /// Jump to a frame and redraw.
    pub fn seek(&mut self, frame: usize) -> Result<(), SessionError> {
        self.engine.seek(frame);
        self.render()
    }

    /// Advance the clock; redraws if the frame changed. Returns steps applied.
    pub fn tick(&mut self, elapsed_ms: f64) -> Result<usize, SessionError> {
        let before = self.engine.current_frame();
        let steps = self.engine.tick(elapsed_ms);
        if self.engine.current_frame() != before {
            self.render()?;
        }
        Ok(steps)
    }

    /// Pointer drag in pixels, using the configured sensitivity.
    pub fn drag(&mut self, dx: f32, dy: f32) -> Result<(), SessionError> {
        let sensitivity = self.camera.drag_sensitivity();
        self.camera.apply_drag_delta(dx, dy, sensitivity);
        self.render()
    }

    /// Wheel zoom delta.
    pub fn zoom(&mut self, delta: f32) -> Result<(), SessionError> {
        self.camera.apply_zoom_delta(delta);
        self.render()
    }

    /// Pinch gesture scale.
    pub fn pinch(&mut self, scale: f32) -> Result<(), SessionError> {
        self.camera.apply_pinch_scale(scale);
        self.render()
    }

    /// Viewport resized; the aspect ratio feeds the projection.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        self.viewport = (width.max(1), height.max(1));
        self.renderer.resize(self.viewport.0, self.viewport.1);
        self.render()
    }

    /// Project the current frame and hand it to the renderer.
    pub fn render(&mut self) -> Result<(), SessionError> {
        let frame_index = self.engine.current_frame();
        let frame = self.animation.frame(frame_index)?;

        self.instances.clear();
        self.instances.extend(self.projector.iter(frame)?);

        let aspect = self.viewport.0 as f32 / self.viewport.1 as f32;
        let geometry = FrameGeometry {
            frame_index,
            instances: &self.instances,
            view: self.camera.view_matrix(self.camera_distance),
            projection: self
                .camera
                .projection_matrix(aspect, self.projector.scene_extent()),
            light_direction: self.light_direction,
        };
        self.renderer.draw(&geometry)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::HeaderOptions;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct Log {
        frames: Vec<(usize, usize)>,
        sizes: Vec<(u32, u32)>,
    }

    struct RecordingRenderer(Rc<RefCell<Log>>);

    impl Renderer for RecordingRenderer {
        fn name(&self) -> &str {
            "recording"
        }

        fn draw(&mut self, frame: &FrameGeometry<'_>) -> Result<(), RenderError> {
            assert!(frame.view.is_finite());
            assert!(frame.projection.is_finite());
            self.0
                .borrow_mut()
                .frames
                .push((frame.frame_index, frame.instances.len()));
            Ok(())
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.0.borrow_mut().sizes.push((width, height));
        }
    }

    /// Frame i has i + 1 visible voxels.
    fn counting_animation(frames: u32, looping: bool) -> Animation {
        let mut anim = Animation::new(&HeaderOptions {
            width: 4,
            height: 2,
            depth: 1,
            frame_count: frames,
            frame_duration_ms: 100,
            looping,
            ..Default::default()
        })
        .unwrap();
        for f in 0..frames as usize {
            for i in 0..=f {
                anim.set_voxel(f, i % 4, i / 4, 0, (30.0, 80.0, 90.0, 100.0))
                    .unwrap();
            }
        }
        anim
    }

    fn session(frames: u32, looping: bool) -> (Session, Rc<RefCell<Log>>) {
        let log = Rc::new(RefCell::new(Log::default()));
        let session = Session::new(
            counting_animation(frames, looping),
            Box::new(RecordingRenderer(log.clone())),
            &SessionConfig::default(),
        )
        .unwrap();
        (session, log)
    }

    #[test]
    fn test_renders_frame_zero_on_creation() {
        let (session, log) = session(3, true);
        assert_eq!(log.borrow().frames, vec![(0, 1)]);
        assert_eq!(session.instances().len(), 1);
    }

    #[test]
    fn test_tick_redraws_on_frame_change() {
        let (mut session, log) = session(3, true);
        session.play();
        session.tick(50.0).unwrap();
        assert_eq!(log.borrow().frames.len(), 1);
        session.tick(50.0).unwrap();
        assert_eq!(log.borrow().frames.last(), Some(&(1, 2)));
    }

    #[test]
    fn test_stop_redraws_frame_zero() {
        let (mut session, log) = session(3, false);
        session.play();
        session.tick(1000.0).unwrap();
        assert_eq!(session.status(), PlaybackStatus::Paused);
        assert_eq!(session.current_frame(), 2);

        session.stop().unwrap();
        assert_eq!(session.status(), PlaybackStatus::Stopped);
        assert_eq!(log.borrow().frames.last(), Some(&(0, 1)));
    }

    #[test]
    fn test_input_redraws_and_clamps() {
        let (mut session, log) = session(2, true);
        session.drag(0.0, 10_000.0).unwrap();
        session.zoom(-1e6).unwrap();
        session.pinch(0.5).unwrap();
        assert_eq!(log.borrow().frames.len(), 4);
        assert!(session.camera().rotation_x() <= std::f32::consts::FRAC_PI_2);
        assert!((session.camera().zoom() - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_resize_forwarded() {
        let (mut session, log) = session(2, true);
        session.resize(800, 0).unwrap();
        assert_eq!(log.borrow().sizes, vec![(800, 1)]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = SessionConfig {
            light_direction: [0.0; 3],
            ..Default::default()
        };
        let log = Rc::new(RefCell::new(Log::default()));
        let result = Session::new(
            counting_animation(1, true),
            Box::new(RecordingRenderer(log)),
            &config,
        );
        assert!(matches!(result, Err(SessionError::Config(_))));
    }
}
