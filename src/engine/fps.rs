/// Length of one FPS measurement window, in seconds.
pub const FPS_WINDOW_S: f64 = 1.0;

/// Frame counter over rolling one-second windows.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FpsMeter {
    elapsed: f64,
    frames: u32,
    last: Option<f64>,
}

impl FpsMeter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one frame that took `dt` seconds. Returns the FPS when a window closes.
    pub fn record(&mut self, dt: f64) -> Option<f64> {
        if !dt.is_finite() || dt < 0.0 {
            return None;
        }
        self.elapsed += dt;
        self.frames += 1;
        if self.elapsed < FPS_WINDOW_S {
            return None;
        }
        let fps = f64::from(self.frames) / self.elapsed;
        self.elapsed = 0.0;
        self.frames = 0;
        self.last = Some(fps);
        Some(fps)
    }

    /// FPS of the most recently closed window.
    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Raised when measured FPS falls below the configured floor with auto quality enabled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QualitySignal {
    pub fps: f64,
    pub floor: f64,
}

#[cfg(test)]
#[path = "../../tests/unit/engine/fps.rs"]
mod tests;
