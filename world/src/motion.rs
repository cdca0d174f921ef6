//! Time-bounded interpolation of the agent's position and heading.

use std::time::Duration;

use glam::Vec2;

use delve_core::Pose;

/// Single interpolation from `from` to `to` that starts at a clock reading.
#[derive(Clone, Copy, Debug, PartialEq)]
struct Tween<T> {
    start: Duration,
    duration: Duration,
    from: T,
    to: T,
}

impl<T: Copy> Tween<T> {
    /// Fraction of the tween that has elapsed at `now`, clamped to `[0, 1]`.
    fn progress(&self, now: Duration) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.start);
        (elapsed.as_secs_f32() / self.duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}

/// In-flight translation and rotation of the agent.
///
/// At most one of each may run at a time. Samples are taken from the world
/// clock, so the result depends only on elapsed time and not on how many
/// ticks were used to cover it.
#[derive(Clone, Debug, Default)]
pub(crate) struct Motion {
    translation: Option<Tween<Vec2>>,
    rotation: Option<Tween<f32>>,
}

impl Motion {
    pub(crate) fn is_animating(&self) -> bool {
        self.translation.is_some() || self.rotation.is_some()
    }

    pub(crate) fn clear(&mut self) {
        self.translation = None;
        self.rotation = None;
    }

    /// Starts moving from the pose's position to `(x, z)`.
    pub(crate) fn translate(
        &mut self,
        now: Duration,
        duration: Duration,
        pose: Pose,
        x: f32,
        z: f32,
    ) {
        self.translation = Some(Tween {
            start: now,
            duration,
            from: Vec2::new(pose.x(), pose.z()),
            to: Vec2::new(x, z),
        });
    }

    /// Starts turning by `delta_degrees` from the pose's heading.
    pub(crate) fn rotate(
        &mut self,
        now: Duration,
        duration: Duration,
        pose: Pose,
        delta_degrees: f32,
    ) {
        let from = pose.heading_degrees();
        self.rotation = Some(Tween {
            start: now,
            duration,
            from,
            to: from + delta_degrees,
        });
    }

    /// Samples both tweens at `now` and returns the resulting pose.
    ///
    /// The flag is set when a tween finished during this call and nothing
    /// else is still running.
    pub(crate) fn sample(&mut self, now: Duration, pose: Pose) -> (Pose, bool) {
        let mut pose = pose;
        let mut finished = false;

        if let Some(tween) = self.translation {
            let t = tween.progress(now);
            let position = tween.from.lerp(tween.to, t);
            pose = pose.with_position(position.x, position.y);
            if t >= 1.0 {
                self.translation = None;
                finished = true;
            }
        }

        if let Some(tween) = self.rotation {
            let t = tween.progress(now);
            pose = pose.with_heading(tween.from + (tween.to - tween.from) * t);
            if t >= 1.0 {
                self.rotation = None;
                finished = true;
            }
        }

        (pose, finished && !self.is_animating())
    }
}

/// Scales a per-unit duration by a distance or angle ratio.
pub(crate) fn scaled(unit: Duration, ratio: f32) -> Duration {
    if !ratio.is_finite() || ratio <= 0.0 {
        return Duration::ZERO;
    }
    let nanos = (unit.as_nanos() as f64 * f64::from(ratio)).round();
    Duration::from_nanos(nanos as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_interpolates_linearly_and_finishes() {
        let mut motion = Motion::default();
        let pose = Pose::new(1.5, 1.5, 0.0);
        motion.translate(Duration::ZERO, Duration::from_millis(200), pose, 2.5, 1.5);

        let (halfway, finished) = motion.sample(Duration::from_millis(100), pose);
        assert!(!finished);
        assert!((halfway.x() - 2.0).abs() < 1e-5);
        assert!(motion.is_animating());

        let (arrived, finished) = motion.sample(Duration::from_millis(250), halfway);
        assert!(finished);
        assert!((arrived.x() - 2.5).abs() < 1e-6);
        assert!(!motion.is_animating());
    }

    #[test]
    fn rotation_follows_shortest_arc_across_north() {
        let mut motion = Motion::default();
        let pose = Pose::new(0.5, 0.5, 350.0);
        motion.rotate(Duration::ZERO, Duration::from_millis(100), pose, 20.0);

        let (turning, _) = motion.sample(Duration::from_millis(50), pose);
        assert!(turning.heading_degrees() < 1e-3 || turning.heading_degrees() > 359.999);

        let (done, finished) = motion.sample(Duration::from_millis(100), turning);
        assert!(finished);
        assert!((done.heading_degrees() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn zero_duration_completes_on_first_sample() {
        let mut motion = Motion::default();
        let pose = Pose::default();
        motion.translate(Duration::from_secs(1), Duration::ZERO, pose, 3.0, 4.0);
        let (moved, finished) = motion.sample(Duration::from_secs(1), pose);
        assert!(finished);
        assert_eq!((moved.x(), moved.z()), (3.0, 4.0));
    }

    #[test]
    fn scaled_durations_ignore_degenerate_ratios() {
        assert_eq!(scaled(Duration::from_millis(150), 2.0), Duration::from_millis(300));
        assert_eq!(scaled(Duration::from_millis(150), 0.0), Duration::ZERO);
        assert_eq!(scaled(Duration::from_millis(150), f32::NAN), Duration::ZERO);
    }
}
