use crate::geometry::Vec3;

/// Linear move from `start` to `target` over `duration` seconds, driven by [`SnapTween::advance`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapTween {
    pub start: Vec3,
    pub target: Vec3,
    pub duration: f32,
    pub elapsed: f32,
}

impl SnapTween {
    pub fn new(start: Vec3, target: Vec3, duration: f32) -> Self {
        Self {
            start,
            target,
            duration,
            elapsed: 0.0,
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Steps the clock and returns the new position. Lands exactly on `target` once done.
    pub fn advance(&mut self, dt: f32) -> Vec3 {
        self.elapsed += dt.max(0.0);
        self.current()
    }

    pub fn current(&self) -> Vec3 {
        if self.is_finished() {
            self.target
        } else {
            self.start.lerp(self.target, self.progress())
        }
    }

    pub fn finish(&mut self) -> Vec3 {
        self.elapsed = self.duration.max(0.0);
        self.target
    }
}
