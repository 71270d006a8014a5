use glam::Vec2;

use crate::canvas::Camera;

/// Smoothed camera that trails a target in world pixels.
///
/// `update` moves the camera a fixed fraction of the remaining distance each
/// call, so repeated updates converge on the target without overshooting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowCamera {
    position: Vec2,
    target: Vec2,
    scale: f32,
    target_scale: f32,
    /// Fraction of the remaining distance covered per update, in `(0, 1]`.
    pub smoothing: f32,
    /// Viewport size in screen pixels.
    pub viewport: Vec2,
}

impl FollowCamera {
    pub const DEFAULT_SMOOTHING: f32 = 0.1;

    pub fn new(viewport: Vec2) -> Self {
        Self {
            position: Vec2::ZERO,
            target: Vec2::ZERO,
            scale: 1.0,
            target_scale: 1.0,
            smoothing: Self::DEFAULT_SMOOTHING,
            viewport,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Track `target`; `instant` snaps instead of easing.
    pub fn follow(&mut self, target: Vec2, instant: bool) {
        self.target = target;
        if instant {
            self.position = target;
        }
    }

    /// Change zoom; non-positive or non-finite scales are ignored.
    pub fn zoom(&mut self, scale: f32, instant: bool) {
        if !(scale.is_finite() && scale > 0.0) {
            tracing::warn!(scale, "ignoring invalid camera zoom");
            return;
        }
        self.target_scale = scale;
        if instant {
            self.scale = scale;
        }
    }

    /// Ease one step towards the current target position and zoom.
    pub fn update(&mut self) {
        let k = self.smoothing.clamp(0.0, 1.0);
        self.position += (self.target - self.position) * k;
        self.scale += (self.target_scale - self.scale) * k;
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.viewport * 0.5) / self.scale + self.position
    }
}

impl Camera for FollowCamera {
    fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.position) * self.scale + self.viewport * 0.5
    }

    fn is_on_screen(&self, screen: Vec2, size: f32) -> bool {
        screen.x + size > 0.0
            && screen.y + size > 0.0
            && screen.x < self.viewport.x
            && screen.y < self.viewport.y
    }

    fn scale(&self) -> f32 {
        self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centred_target_maps_to_viewport_centre() {
        let mut cam = FollowCamera::new(Vec2::new(640.0, 480.0));
        cam.follow(Vec2::new(1000.0, -200.0), true);
        assert_eq!(
            cam.world_to_screen(Vec2::new(1000.0, -200.0)),
            Vec2::new(320.0, 240.0)
        );
    }

    #[test]
    fn screen_to_world_inverts_world_to_screen() {
        let mut cam = FollowCamera::new(Vec2::new(800.0, 600.0));
        cam.follow(Vec2::new(50.0, 75.0), true);
        cam.zoom(2.0, true);
        let world = Vec2::new(123.0, -45.0);
        let back = cam.screen_to_world(cam.world_to_screen(world));
        assert!((back - world).length() < 1e-3);
    }

    #[test]
    fn update_eases_towards_target() {
        let mut cam = FollowCamera::new(Vec2::new(100.0, 100.0));
        cam.follow(Vec2::new(100.0, 0.0), false);
        cam.update();
        assert!((cam.position().x - 10.0).abs() < 1e-4);
        for _ in 0..200 {
            cam.update();
        }
        assert!((cam.position().x - 100.0).abs() < 0.01);
    }

    #[test]
    fn partially_visible_squares_count_as_on_screen() {
        let cam = FollowCamera::new(Vec2::new(100.0, 100.0));
        assert!(cam.is_on_screen(Vec2::new(-31.0, 10.0), 32.0));
        assert!(!cam.is_on_screen(Vec2::new(-32.0, 10.0), 32.0));
        assert!(!cam.is_on_screen(Vec2::new(100.0, 10.0), 32.0));
    }

    #[test]
    fn invalid_zoom_is_ignored() {
        let mut cam = FollowCamera::new(Vec2::new(10.0, 10.0));
        cam.zoom(0.0, true);
        cam.zoom(f32::NAN, true);
        assert_eq!(cam.scale(), 1.0);
    }
}
