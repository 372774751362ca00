//! Smoothed viewport that follows a target through the level.

use macroquad::math::{vec2, Vec2};

use crate::config::CameraConfig;
use crate::geom::Rect;

/// How far the camera closes on its target per update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Smoothing {
    /// Fixed fraction per call, regardless of `dt`.
    PerFrame(f32),
    /// Frame-rate independent: `1 - exp(-rate * dt)` per call.
    TimeScaled {
        /// Decay rate per second.
        rate: f32,
    },
}

impl Smoothing {
    /// Reads the smoothing mode from the camera config.
    pub fn from_config(config: &CameraConfig) -> Self {
        if config.time_scaled {
            Smoothing::TimeScaled {
                rate: config.smoothing_rate,
            }
        } else {
            Smoothing::PerFrame(config.smoothing)
        }
    }

    /// Interpolation factor for one update, in `[0, 1]`.
    pub fn factor(self, dt: f32) -> f32 {
        let f = match self {
            Smoothing::PerFrame(f) => f,
            Smoothing::TimeScaled { rate } => 1.0 - (-rate * dt.max(0.0)).exp(),
        };
        f.clamp(0.0, 1.0)
    }
}

impl Default for Smoothing {
    fn default() -> Self {
        Smoothing::PerFrame(0.1)
    }
}

/// Viewport position in world pixels, eased toward a target.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec2,
    target: Vec2,
    viewport: Vec2,
    smoothing: Smoothing,
}

impl Camera {
    /// Camera at the origin with default smoothing.
    pub fn new(viewport_w: f32, viewport_h: f32) -> Self {
        Camera {
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            viewport: vec2(viewport_w, viewport_h),
            smoothing: Smoothing::default(),
        }
    }

    /// Camera using the smoothing mode from `config`.
    pub fn from_config(viewport_w: f32, viewport_h: f32, config: &CameraConfig) -> Self {
        Camera::new(viewport_w, viewport_h).with_smoothing(Smoothing::from_config(config))
    }

    /// Builder form of [`Camera::set_smoothing`].
    pub fn with_smoothing(mut self, smoothing: Smoothing) -> Self {
        self.smoothing = smoothing;
        self
    }

    /// Replaces the smoothing mode.
    pub fn set_smoothing(&mut self, smoothing: Smoothing) {
        self.smoothing = smoothing;
    }

    /// Current smoothing mode.
    pub fn smoothing(&self) -> Smoothing {
        self.smoothing
    }

    /// Top-left world position of the viewport.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Position the camera is easing toward.
    pub fn target(&self) -> Vec2 {
        self.target
    }

    /// Viewport width and height in pixels.
    pub fn viewport_size(&self) -> Vec2 {
        self.viewport
    }

    /// Resizes the viewport, e.g. after a window resize.
    pub fn set_viewport_size(&mut self, w: f32, h: f32) {
        self.viewport = vec2(w, h);
    }

    fn centred(&self, focus: Vec2) -> Vec2 {
        focus - (self.viewport / 2.0).floor()
    }

    fn clamp(&self, p: Vec2, bounds: Option<Vec2>) -> Vec2 {
        match bounds {
            // a level smaller than the viewport pins the camera to 0
            Some(level) => vec2(
                p.x.min(level.x - self.viewport.x).max(0.0),
                p.y.min(level.y - self.viewport.y).max(0.0),
            ),
            None => p,
        }
    }

    /// Moves toward `focus` (which ends up mid-screen) by one smoothing
    /// step, then clamps into `bounds` (level size in pixels) if given.
    pub fn update(&mut self, dt: f32, focus: Vec2, bounds: Option<Vec2>) {
        self.target = self.centred(focus);
        let t = self.smoothing.factor(dt);
        self.position += (self.target - self.position) * t;
        self.position = self.clamp(self.position, bounds);
    }

    /// Sets the focus without moving; the next `update` heads there.
    pub fn follow_target(&mut self, focus: Vec2) {
        self.target = self.centred(focus);
    }

    /// Jumps straight to `focus`, skipping smoothing.
    pub fn center_on(&mut self, focus: Vec2, bounds: Option<Vec2>) {
        self.target = self.centred(focus);
        self.position = self.clamp(self.target, bounds);
    }

    /// Jumps to `(x, y)` and stops easing.
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = vec2(x, y);
        self.target = self.position;
    }

    /// Integer pixel offset used for drawing.
    pub fn offset(&self) -> (i32, i32) {
        (self.position.x as i32, self.position.y as i32)
    }

    /// Visible world area.
    pub fn viewport_rect(&self) -> Rect {
        let (x, y) = self.offset();
        Rect::new(x, y, self.viewport.x as i32, self.viewport.y as i32)
    }

    /// World pixel position to screen pixels.
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        world - self.position
    }

    /// Inverse of [`Camera::world_to_screen`].
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen + self.position
    }

    /// Whether the box intersects the viewport; shared edges count.
    pub fn is_visible(&self, x: f32, y: f32, w: f32, h: f32) -> bool {
        let p = self.position;
        x + w >= p.x && x <= p.x + self.viewport.x && y + h >= p.y && y <= p.y + self.viewport.y
    }
}
