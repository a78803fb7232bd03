//! Orbit camera driven by mouse drag and scroll.

use glam::{Mat4, Quat, Vec2, Vec3};

use crate::options::CameraOptions;

/// Camera orbiting a focus point at a distance, with a quaternion
/// orientation so it never gimbal-locks at the poles.
#[derive(Debug, Clone, Copy)]
pub struct OrbitCamera {
    orientation: Quat,
    distance: f32,
    focus: Vec3,
    min_distance: f32,
    max_distance: f32,
}

impl Default for OrbitCamera {
    fn default() -> Self {
        Self {
            orientation: Quat::IDENTITY,
            distance: 10.0,
            focus: Vec3::ZERO,
            min_distance: 0.1,
            max_distance: 1000.0,
        }
    }
}

impl OrbitCamera {
    /// Frame a bounding sphere so it fills the vertical field of view,
    /// backed off by `options.fit_padding`.
    pub fn fit(&mut self, center: Vec3, radius: f32, options: &CameraOptions) {
        let radius = radius.max(1e-3);
        let fit_distance = radius / (options.fovy.to_radians() * 0.5).tan();
        self.focus = center;
        self.distance = fit_distance * options.fit_padding.max(1.0);
        self.min_distance = radius * 0.1;
        self.max_distance = fit_distance * 20.0;
    }

    /// Eye position in world space.
    pub fn eye(&self) -> Vec3 {
        self.focus + self.orientation * Vec3::Z * self.distance
    }

    /// Point the camera orbits around.
    pub fn focus(&self) -> Vec3 {
        self.focus
    }

    /// Distance from eye to focus.
    pub fn distance(&self) -> f32 {
        self.distance
    }

    /// World → eye transform.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye(), self.focus, self.orientation * Vec3::Y)
    }

    /// Perspective projection for a viewport of `aspect`.
    pub fn projection(&self, aspect: f32, options: &CameraOptions) -> Mat4 {
        let near = options.znear.min(self.distance * 0.5).max(1e-3);
        Mat4::perspective_rh(
            options.fovy.to_radians(),
            aspect.max(1e-3),
            near,
            options.zfar.max(near * 2.0),
        )
    }

    /// Rotate by a mouse delta in pixels. `speed` is degrees per pixel.
    pub fn rotate(&mut self, delta: Vec2, speed: f32) {
        let up = self.orientation * Vec3::Y;
        let yaw = Quat::from_axis_angle(up, (-delta.x * speed).to_radians());
        self.orientation = yaw * self.orientation;

        let right = self.orientation * Vec3::X;
        let pitch =
            Quat::from_axis_angle(right, (-delta.y * speed).to_radians());
        self.orientation = (pitch * self.orientation).normalize();
    }

    /// Slide the focus in the view plane by a mouse delta in pixels.
    /// `speed` is the fraction of the focus distance moved per pixel.
    pub fn pan(&mut self, delta: Vec2, speed: f32) {
        let right = self.orientation * Vec3::X;
        let up = self.orientation * Vec3::Y;
        let scale = self.distance * speed;
        self.focus += right * (-delta.x * scale) + up * (delta.y * scale);
    }

    /// Dolly toward (positive `delta`) or away from the focus.
    pub fn zoom(&mut self, delta: f32, speed: f32) {
        self.distance = (self.distance * (1.0 - delta * speed))
            .clamp(self.min_distance, self.max_distance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(fovy: f32) -> CameraOptions {
        CameraOptions {
            fovy,
            ..CameraOptions::default()
        }
    }

    #[test]
    fn fit_centers_on_sphere() {
        let mut camera = OrbitCamera::default();
        camera.fit(Vec3::new(1.0, 2.0, 3.0), 10.0, &options(45.0));
        assert_eq!(camera.focus(), Vec3::new(1.0, 2.0, 3.0));
        let expected = 10.0 / (22.5_f32.to_radians()).tan() * 1.5;
        assert!((camera.distance() - expected).abs() < 1e-3);
        assert!(((camera.eye() - camera.focus()).length() - expected).abs() < 1e-3);
    }

    #[test]
    fn rotation_keeps_distance() {
        let mut camera = OrbitCamera::default();
        camera.fit(Vec3::ZERO, 5.0, &options(45.0));
        let before = camera.distance();
        camera.rotate(Vec2::new(120.0, -45.0), 0.5);
        assert!(((camera.eye() - camera.focus()).length() - before).abs() < 1e-3);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = OrbitCamera::default();
        camera.fit(Vec3::ZERO, 1.0, &options(45.0));
        for _ in 0..200 {
            camera.zoom(1.0, 0.5);
        }
        assert!((camera.distance() - 0.1).abs() < 1e-5);
        for _ in 0..200 {
            camera.zoom(-1.0, 0.5);
        }
        let max = 1.0 / (22.5_f32.to_radians()).tan() * 20.0;
        assert!((camera.distance() - max).abs() < 1e-2);
    }

    #[test]
    fn view_looks_at_focus() {
        let mut camera = OrbitCamera::default();
        camera.fit(Vec3::new(0.0, 0.0, -4.0), 2.0, &options(60.0));
        let eye_space = camera.view_matrix().transform_point3(camera.focus());
        assert!(eye_space.x.abs() < 1e-4);
        assert!(eye_space.y.abs() < 1e-4);
        assert!(eye_space.z < 0.0);
    }

    #[test]
    fn pan_moves_focus_in_view_plane() {
        let mut camera = OrbitCamera::default();
        camera.fit(Vec3::ZERO, 2.0, &options(45.0));
        let distance = camera.distance();
        camera.pan(Vec2::new(-100.0, 0.0), 0.002);
        assert!((camera.focus().x - distance * 0.2).abs() < 1e-4);
        assert_eq!(camera.focus().z, 0.0);
        assert_eq!(camera.distance(), distance);
    }
}
