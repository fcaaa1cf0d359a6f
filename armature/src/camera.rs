use glam::{Mat4, Vec3};

/// Vertical field of view, degrees
const FOV_Y: f32 = 60.0;
const Z_NEAR: f32 = 0.1;
const Z_FAR: f32 = 100.0;

/// Degrees of orbit per pixel of drag
const DRAG_SENSITIVITY: f32 = 0.5;
const MIN_DISTANCE: f32 = 0.02;
const MAX_DISTANCE: f32 = 100.0;

/// A pitch/yaw/distance orbit camera, driven by mouse drag and wheel events.
///
/// Pitch is clamped to straight-up/straight-down; yaw and joint-style state
/// are unclamped. The wheel zooms exponentially so each notch scales the
/// distance by the same factor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitCamera {
    /// Orbit pitch in degrees, clamped to [-90, 90]
    pub pitch: f32,
    /// Orbit yaw in degrees, unclamped
    pub yaw: f32,
    /// Distance from the orbit center
    pub distance: f32,
    /// The point the camera orbits
    pub look_at: Vec3,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            pitch: 0.0,
            yaw: 0.0,
            distance: 5.0,
            look_at: Vec3::ZERO,
        }
    }
}

impl OrbitCamera {
    /// Create a camera orbiting the origin
    pub fn new(pitch: f32, yaw: f32, distance: f32) -> Self {
        Self {
            pitch,
            yaw,
            distance,
            look_at: Vec3::ZERO,
        }
    }

    /// Orbit a point other than the origin
    pub fn with_look_at(mut self, look_at: Vec3) -> Self {
        self.look_at = look_at;
        self
    }

    /// Apply a mouse drag of `(dx, dy)` pixels.
    pub fn drag(&mut self, dx: f32, dy: f32) {
        self.pitch = (self.pitch + dy * DRAG_SENSITIVITY).clamp(-90.0, 90.0);
        self.yaw += dx * DRAG_SENSITIVITY;
    }

    /// Apply a wheel delta: positive scrolls zoom out.
    pub fn wheel(&mut self, delta: f32) {
        let zoomed = self.distance * 2.0_f32.powf(delta * -0.01);
        self.distance = zoomed.clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    /// The view matrix for the current orbit state.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(Vec3::new(0.0, 0.0, -self.distance))
            * Mat4::from_rotation_x(self.pitch.to_radians())
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_translation(-self.look_at)
    }

    /// A 60 degree perspective projection for the given aspect ratio.
    pub fn projection(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh_gl(FOV_Y.to_radians(), aspect, Z_NEAR, Z_FAR)
    }
}
