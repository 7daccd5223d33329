/// Easing curves for sprite and overlay animations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Ease {
    Linear,
    #[default]
    InOutCubic,
}

impl Ease {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::InOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - ((-2.0 * t + 2.0).powi(3) / 2.0)
                }
            }
        }
    }
}

/// Values a [`Tween`] can interpolate.
pub trait Lerp: Copy {
    /// Value at eased progress `t` in `[0, 1)`. Completion always yields the exact target.
    fn lerp(self, to: Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(self, to: Self, t: f64) -> Self {
        self + (to - self) * t
    }
}

/// Fixed-duration eased animation from one value to another, advanced by frame time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween<T> {
    from: T,
    to: T,
    elapsed: f64,
    duration: f64,
    ease: Ease,
}

impl<T: Lerp> Tween<T> {
    pub fn new(from: T, to: T, duration: f64, ease: Ease) -> Self {
        Self {
            from,
            to,
            elapsed: 0.0,
            duration: duration.max(0.0),
            ease,
        }
    }

    /// A finished tween resting at `value`.
    pub fn settled(value: T) -> Self {
        Self::new(value, value, 0.0, Ease::Linear)
    }

    pub fn advance(&mut self, dt: f64) -> T {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed = (self.elapsed + dt).min(self.duration);
        }
        self.value()
    }

    pub fn value(&self) -> T {
        if self.is_finished() {
            return self.to;
        }
        self.from.lerp(self.to, self.ease.apply(self.elapsed / self.duration))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn target(&self) -> T {
        self.to
    }

    /// Replace the animation with one running from the current value to `to`.
    pub fn retarget(&mut self, to: T, duration: f64, ease: Ease) {
        *self = Self::new(self.value(), to, duration, ease);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/tween.rs"]
mod tests;
