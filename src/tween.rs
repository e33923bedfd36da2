use glam::Vec3;
use serde::{Deserialize, Serialize};

pub const DEFAULT_DURATION: f32 = 1.0;

/// Easing curve applied to normalized tween progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Ease {
    Linear,
    #[default]
    Power1Out,
    Power1In,
    Power1InOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear => t,
            Ease::Power1Out => 1.0 - (1.0 - t) * (1.0 - t),
            Ease::Power1In => t * t,
            Ease::Power1InOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - 2.0 * (1.0 - t) * (1.0 - t)
                }
            }
        }
    }
}

pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: Self, t: f32) -> Self {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(self, to: Self, t: f32) -> Self {
        Vec3::lerp(self, to, t)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tween<T: Lerp> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
    ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: f32, ease: Ease) -> Self {
        Self {
            from,
            to,
            duration: duration.max(0.0),
            elapsed: 0.0,
            ease,
        }
    }

    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed = (self.elapsed + dt.max(0.0)).min(self.duration);
        self.value()
    }

    pub fn value(&self) -> T {
        let progress = self.progress();
        if progress >= 1.0 {
            self.to
        } else {
            self.from.lerp(self.to, self.ease.apply(progress))
        }
    }

    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    pub fn target(&self) -> T {
        self.to
    }
}

/// Holds at most one running tween; a new target replaces it, starting from
/// the current value.
#[derive(Debug, Clone, PartialEq)]
pub struct TweenSlot<T: Lerp> {
    current: T,
    active: Option<Tween<T>>,
}

impl<T: Lerp> TweenSlot<T> {
    pub fn new(value: T) -> Self {
        Self {
            current: value,
            active: None,
        }
    }

    pub fn retarget(&mut self, to: T, duration: f32, ease: Ease) {
        self.active = Some(Tween::new(self.current, to, duration, ease));
    }

    /// Advances the running tween, if any, and returns the live value.
    pub fn advance(&mut self, dt: f32) -> T {
        if let Some(tween) = self.active.as_mut() {
            self.current = tween.advance(dt);
            if tween.is_finished() {
                self.active = None;
            }
        }
        self.current
    }

    pub fn value(&self) -> T {
        self.current
    }

    pub fn target(&self) -> Option<T> {
        self.active.as_ref().map(Tween::target)
    }

    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power1_out_decelerates() {
        assert_eq!(Ease::Power1Out.apply(0.0), 0.0);
        assert_eq!(Ease::Power1Out.apply(1.0), 1.0);
        assert!((Ease::Power1Out.apply(0.5) - 0.75).abs() < 1e-6);
        assert!(Ease::Power1Out.apply(0.25) > 0.25);
    }

    #[test]
    fn tween_lands_exactly_on_target() {
        let mut tween = Tween::new(0.0_f32, 0.3, 1.0, Ease::Power1Out);
        for _ in 0..59 {
            tween.advance(1.0 / 60.0);
        }
        assert!(!tween.is_finished());
        assert!(tween.value() < 0.3);
        tween.advance(0.5);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), 0.3);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let tween = Tween::new(Vec3::ZERO, Vec3::ONE, 0.0, Ease::Linear);
        assert!(tween.is_finished());
        assert_eq!(tween.value(), Vec3::ONE);
    }

    #[test]
    fn retarget_supersedes_from_live_value() {
        let mut slot = TweenSlot::new(0.0_f32);
        slot.retarget(1.0, 1.0, Ease::Linear);
        let halfway = slot.advance(0.5);
        assert!((halfway - 0.5).abs() < 1e-6);

        slot.retarget(-1.0, 1.0, Ease::Linear);
        assert_eq!(slot.value(), halfway);
        assert_eq!(slot.target(), Some(-1.0));
        slot.advance(1.0);
        assert_eq!(slot.value(), -1.0);
        assert!(!slot.is_animating());
    }

    #[test]
    fn idle_slot_keeps_value() {
        let mut slot = TweenSlot::new(Vec3::X);
        assert_eq!(slot.advance(10.0), Vec3::X);
        assert_eq!(slot.target(), None);
    }
}
