use glam::{Quat, Vec2, Vec3};

use super::core::Camera;
use crate::options::CameraOptions;

/// Closest the eye may get to the focus point.
const MIN_DISTANCE: f32 = 0.1;
/// Farthest the eye may get from the focus point.
const MAX_DISTANCE: f32 = 1000.0;

/// Orbits a [`Camera`] around a focus point.
pub struct CameraController {
    orientation: Quat,
    distance: f32,
    focus_point: Vec3,
    rotate_speed: f32,

    /// The camera being driven.
    pub camera: Camera,
    /// Whether the orbit button is held.
    pub mouse_pressed: bool,
}

impl CameraController {
    /// Controller with the camera on +Z looking at the origin.
    #[must_use]
    pub fn new(options: &CameraOptions, width: u32, height: u32) -> Self {
        let mut controller = Self {
            orientation: Quat::IDENTITY,
            distance: options.distance.clamp(MIN_DISTANCE, MAX_DISTANCE),
            focus_point: Vec3::ZERO,
            rotate_speed: options.orbit_speed,
            camera: Camera::from_options(options, aspect(width, height)),
            mouse_pressed: false,
        };
        controller.update_camera_pos();
        controller
    }

    fn update_camera_pos(&mut self) {
        let dir = self.orientation * Vec3::Z;

        self.camera.eye = self.focus_point + (dir * self.distance);
        self.camera.target = self.focus_point;
        self.camera.up = self.orientation * Vec3::Y;
    }

    /// Track the new viewport aspect ratio.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera.aspect = aspect(width, height);
    }

    /// Orbit by a mouse delta in pixels.
    pub fn rotate(&mut self, delta: Vec2) {
        // Horizontal rotation around camera's up vector
        let up = self.orientation * Vec3::Y;
        let horizontal =
            Quat::from_axis_angle(up, -delta.x * self.rotate_speed);
        self.orientation = horizontal * self.orientation;

        // Vertical rotation around camera's right vector (after horizontal
        // rotation)
        let right = self.orientation * Vec3::X;
        let vertical =
            Quat::from_axis_angle(right, -delta.y * self.rotate_speed);
        self.orientation = (vertical * self.orientation).normalize();

        self.update_camera_pos();
    }

    /// Scale the orbit distance; positive `delta` moves closer.
    pub fn zoom(&mut self, delta: f32) {
        self.distance *= 1.0 - delta * 0.1;
        self.distance = self.distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        self.update_camera_pos();
    }

    /// Current orbit distance.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// Center on the centroid of `positions` and back off until their
    /// bounding sphere is in view.
    pub fn fit_to_positions(&mut self, positions: &[Vec3]) {
        if positions.is_empty() {
            return;
        }

        let centroid: Vec3 =
            positions.iter().copied().sum::<Vec3>() / positions.len() as f32;
        let radius = positions
            .iter()
            .map(|p| (*p - centroid).length())
            .fold(0.0f32, f32::max);

        self.focus_point = centroid;

        let fovy_rad = self.camera.fovy.to_radians();
        let fit_distance = radius / (fovy_rad / 2.0).tan();
        // 1.5x padding for comfortable view
        self.distance = (fit_distance * 1.5).clamp(MIN_DISTANCE, MAX_DISTANCE);

        self.update_camera_pos();
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> CameraController {
        CameraController::new(&CameraOptions::default(), 800, 600)
    }

    #[test]
    fn zoom_is_clamped() {
        let mut c = controller();
        for _ in 0..200 {
            c.zoom(5.0);
        }
        assert_eq!(c.distance(), MIN_DISTANCE);
        for _ in 0..200 {
            c.zoom(-5.0);
        }
        assert_eq!(c.distance(), MAX_DISTANCE);
    }

    #[test]
    fn rotate_keeps_distance_to_focus() {
        let mut c = controller();
        let before = c.distance();
        c.rotate(Vec2::new(37.0, -12.0));
        let eye_distance = (c.camera.eye - c.camera.target).length();
        assert!((eye_distance - before).abs() < 1e-4);
    }

    #[test]
    fn fit_centers_on_centroid() {
        let mut c = controller();
        c.fit_to_positions(&[Vec3::new(2.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0)]);
        assert_eq!(c.camera.target, Vec3::new(3.0, 0.0, 0.0));
        assert!(c.distance() > 1.0);
    }

    #[test]
    fn resize_ignores_zero_height() {
        let mut c = controller();
        c.resize(1024, 0);
        assert_eq!(c.camera.aspect, 1024.0);
    }
}
