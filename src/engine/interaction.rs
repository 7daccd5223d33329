use std::collections::HashMap;

use crate::config::InteractionOpts;
use crate::engine::scene::{Scene, SpriteHandle, SpriteTransform, TOP_Z};
use crate::engine::tween::{Ease, Tween};
use crate::foundation::core::Rect;

/// Hover-zoom state: the focused sprite, running sprite animations and the dimming overlay.
///
/// Rest transforms live in a side table keyed by sprite handle; an entry exists from the moment a
/// sprite leaves its rest state until its restore animation has finished.
#[derive(Clone, Debug)]
pub struct Interaction {
    opts: InteractionOpts,
    target: Option<SpriteHandle>,
    rest: HashMap<SpriteHandle, SpriteTransform>,
    tweens: HashMap<SpriteHandle, Tween<SpriteTransform>>,
    overlay: Tween<f64>,
    resume_at: Option<f64>,
}

impl Interaction {
    pub fn new(opts: InteractionOpts) -> Self {
        Self {
            opts,
            target: None,
            rest: HashMap::new(),
            tweens: HashMap::new(),
            overlay: Tween::settled(0.0),
            resume_at: None,
        }
    }

    pub fn target(&self) -> Option<SpriteHandle> {
        self.target
    }

    pub fn rest_transform(&self, handle: SpriteHandle) -> Option<SpriteTransform> {
        self.rest.get(&handle).copied()
    }

    pub fn overlay_alpha(&self) -> f64 {
        self.overlay.value()
    }

    /// No focus, no running animation and no visible overlay.
    pub fn is_idle(&self) -> bool {
        self.target.is_none() && self.tweens.is_empty() && self.overlay.value() == 0.0
    }

    /// Whether scrolling may continue at animation time `now`.
    pub fn may_resume(&self, now: f64) -> bool {
        self.target.is_none() && self.tweens.is_empty() && self.resume_at.is_none_or(|t| now >= t)
    }

    /// Scene-space bounds of the focused sprite.
    pub fn target_bounds(&self, scene: &Scene) -> Option<Rect> {
        self.target.and_then(|h| scene.bounds(h))
    }

    /// Zoom `handle` to the screen center. Any previously focused sprite starts restoring.
    ///
    /// `translate_x` is the scene-to-screen translation in effect while scrolling is paused.
    pub fn focus(&mut self, scene: &mut Scene, handle: SpriteHandle, translate_x: f64) {
        if self.target == Some(handle) {
            return;
        }
        let Some(current) = scene.sprite(handle).map(|s| s.transform) else {
            return;
        };
        if let Some(prev) = self.target.take() {
            self.restore(scene, prev);
        }

        let rest = *self.rest.entry(handle).or_insert(current);
        let viewport = scene.viewport();
        let size = self.opts.zoom_fraction * viewport.short_side();
        let center = viewport.center();
        let zoomed = SpriteTransform {
            x: center.x - size / 2.0 - translate_x,
            y: center.y - size / 2.0,
            scale: size / f64::from(scene.tile_px()),
            z: TOP_Z.max(rest.z + 1),
        };
        self.animate(scene, handle, zoomed);
        self.overlay.retarget(
            f64::from(self.opts.overlay_alpha),
            self.opts.duration_s,
            Ease::InOutCubic,
        );
        self.target = Some(handle);
        self.resume_at = None;
        tracing::debug!(sprite = handle.0, "sprite focused");
    }

    /// Restore the focused sprite and fade the overlay out. Scrolling may resume once the
    /// animation duration has passed after `now`.
    pub fn release(&mut self, scene: &mut Scene, now: f64) {
        let Some(handle) = self.target.take() else {
            return;
        };
        self.restore(scene, handle);
        self.overlay
            .retarget(0.0, self.opts.duration_s, Ease::InOutCubic);
        self.resume_at = Some(now + self.opts.duration_s);
        tracing::debug!(sprite = handle.0, "sprite released");
    }

    fn restore(&mut self, scene: &mut Scene, handle: SpriteHandle) {
        if let Some(rest) = self.rest.get(&handle).copied() {
            self.animate(scene, handle, rest);
        }
    }

    fn animate(&mut self, scene: &Scene, handle: SpriteHandle, to: SpriteTransform) {
        let Some(from) = scene.sprite(handle).map(|s| s.transform) else {
            return;
        };
        // A new request replaces whatever was running on this sprite.
        self.tweens.insert(
            handle,
            Tween::new(from, to, self.opts.duration_s, Ease::InOutCubic),
        );
    }

    /// Step every running animation and write the results into `scene`.
    pub fn advance(&mut self, scene: &mut Scene, dt: f64) {
        self.overlay.advance(dt);
        let mut finished = Vec::new();
        for (&handle, tween) in self.tweens.iter_mut() {
            let value = tween.advance(dt);
            if let Some(sprite) = scene.sprite_mut(handle) {
                sprite.transform = value;
            }
            if tween.is_finished() {
                finished.push(handle);
            }
        }
        for handle in finished {
            self.tweens.remove(&handle);
            if self.target != Some(handle) {
                self.rest.remove(&handle);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/interaction.rs"]
mod tests;
