//! Detects the camera ending up inside a placed model.

use glam::Vec3;
use web_time::{Duration, Instant};

/// Rate-limited inside-the-model detector, checked once per frame.
#[derive(Debug, Clone)]
pub struct ProximityMonitor {
    buffer: f32,
    min_radius: f32,
    cooldown: Duration,
    last_warning: Option<Instant>,
}

impl ProximityMonitor {
    #[must_use]
    pub fn new(buffer: f32, min_radius: f32, cooldown: Duration) -> Self {
        Self {
            buffer,
            min_radius,
            cooldown,
            last_warning: None,
        }
    }

    /// Distance below which the camera counts as inside a body of `rendered_radius`.
    #[must_use]
    pub fn threshold(&self, rendered_radius: f32) -> f32 {
        (rendered_radius - self.buffer).max(self.min_radius)
    }

    /// Index of the first body the camera is inside, if a warning is due.
    ///
    /// `bodies` yields `(index, world position, rendered radius)`. Only the
    /// first body found inside is considered. Returns `None` during the
    /// cooldown even if the camera is still inside.
    pub fn check(
        &mut self,
        now: Instant,
        camera: Vec3,
        bodies: impl IntoIterator<Item = (usize, Vec3, f32)>,
    ) -> Option<usize> {
        if self
            .last_warning
            .is_some_and(|last| now.saturating_duration_since(last) < self.cooldown)
        {
            return None;
        }

        let (index, _, _) = bodies
            .into_iter()
            .find(|&(_, position, radius)| camera.distance(position) < self.threshold(radius))?;
        self.last_warning = Some(now);
        Some(index)
    }

    /// Forget the last warning so the next check may fire immediately.
    pub fn reset(&mut self) {
        self.last_warning = None;
    }
}
