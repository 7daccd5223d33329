use crate::config::ScrollDirection;

/// Scalar scroll offset of the whole scene.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollState {
    offset: f64,
    loop_width: f64,
    paused: bool,
}

impl ScrollState {
    pub fn new(loop_width: f64) -> Self {
        Self {
            offset: 0.0,
            loop_width,
            paused: false,
        }
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn loop_width(&self) -> f64 {
        self.loop_width
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    /// Advance by `speed * dt` in `direction`. Returns `true` when the offset was reset.
    ///
    /// The reset is exact: once `|offset|` exceeds one loop width it goes back to zero.
    pub fn advance(&mut self, speed: f64, dt: f64, direction: ScrollDirection) -> bool {
        if self.paused || !(dt > 0.0) {
            return false;
        }
        self.offset += speed * dt * direction.sign();
        if self.offset.abs() > self.loop_width {
            self.offset = 0.0;
            return true;
        }
        false
    }

    /// Horizontal translation applied to scene coordinates to get screen coordinates.
    ///
    /// Scrolling left moves the scene from `0` toward `-loop_width`; scrolling right starts one
    /// loop to the left so the duplicate slides into view from the other side.
    pub fn translate_x(&self, direction: ScrollDirection) -> f64 {
        match direction {
            ScrollDirection::Left => self.offset,
            ScrollDirection::Right => self.offset - self.loop_width,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/scroll.rs"]
mod tests;
