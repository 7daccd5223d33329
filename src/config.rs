//! Configuration objects passed explicitly into each component.
//!
//! The settings collaborator hands over a flat key/value snapshot ([`Settings`]); the engine turns
//! it into a validated [`EngineConfig`]. Pipeline tunables ([`AtlasOpts`], [`GlyphOpts`],
//! [`ScoreWeights`], [`InteractionOpts`]) are plain values with defaults, never process-wide state.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Context;

use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};

/// Flat key/value configuration snapshot as provided by the settings store.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Settings(pub BTreeMap<String, String>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a settings snapshot from a JSON object. Non-string scalar values are stringified.
    pub fn from_path(path: &Path) -> PhotoglyphResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    pub fn from_json_str(text: &str) -> PhotoglyphResult<Self> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        let serde_json::Value::Object(map) = value else {
            return Err(PhotoglyphError::serde("settings must be a JSON object"));
        };
        let mut out = BTreeMap::new();
        for (k, v) in map {
            let s = match v {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => continue,
                other => other.to_string(),
            };
            out.insert(k, s);
        }
        Ok(Self(out))
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.0.insert(key.to_string(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    fn parse_f64(&self, key: &str) -> PhotoglyphResult<Option<f64>> {
        self.get(key)
            .map(|s| {
                s.trim().parse::<f64>().map_err(|_| {
                    PhotoglyphError::validation(format!("setting '{key}' is not a number: '{s}'"))
                })
            })
            .transpose()
    }

    fn parse_bool(&self, key: &str) -> PhotoglyphResult<Option<bool>> {
        self.get(key)
            .map(|s| match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(PhotoglyphError::validation(format!(
                    "setting '{key}' is not a boolean: '{s}'"
                ))),
            })
            .transpose()
    }
}

/// Horizontal scroll direction of the ticker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollDirection {
    /// Content moves toward negative x.
    #[default]
    Left,
    /// Content moves toward positive x.
    Right,
}

impl ScrollDirection {
    pub fn sign(self) -> f64 {
        match self {
            Self::Left => -1.0,
            Self::Right => 1.0,
        }
    }

    fn parse(s: &str) -> PhotoglyphResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" | "-1" | "rtl" => Ok(Self::Left),
            "right" | "1" | "ltr" => Ok(Self::Right),
            other => Err(PhotoglyphError::validation(format!(
                "unknown scroll direction '{other}'"
            ))),
        }
    }
}

/// Typed, validated engine configuration.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EngineConfig {
    /// Ticker text spelled out by the mosaic.
    pub text: String,
    /// Scroll speed in pixels per second.
    pub scroll_speed: f64,
    pub direction: ScrollDirection,
    /// Render tile edge as a percentage of viewport width.
    pub tile_base_vw: f64,
    /// Multiplier applied to the glyph font size.
    pub glyph_scale: f64,
    /// Measured FPS below this value raises a degradation signal.
    pub fps_floor: f64,
    pub auto_quality: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            text: "HELLO".to_string(),
            scroll_speed: 60.0,
            direction: ScrollDirection::Left,
            tile_base_vw: 1.5,
            glyph_scale: 1.0,
            fps_floor: 30.0,
            auto_quality: false,
        }
    }
}

impl EngineConfig {
    /// Build a config from a settings snapshot, falling back to defaults for absent keys.
    pub fn from_settings(settings: &Settings) -> PhotoglyphResult<Self> {
        let partial = PartialConfig {
            text: settings.get("ticker_text").map(str::to_string),
            scroll_speed: settings.parse_f64("scroll_speed")?,
            direction: settings
                .get("scroll_direction")
                .map(ScrollDirection::parse)
                .transpose()?,
            tile_base_vw: settings.parse_f64("tile_base_vw")?,
            glyph_scale: settings.parse_f64("glyph_scale")?,
            fps_floor: settings.parse_f64("fps_floor")?,
            auto_quality: settings.parse_bool("auto_quality")?,
        };
        Self::default().merged(&partial)
    }

    /// Return a copy with every `Some` field of `partial` applied, validated.
    pub fn merged(&self, partial: &PartialConfig) -> PhotoglyphResult<Self> {
        let mut out = self.clone();
        if let Some(t) = &partial.text {
            out.text = t.clone();
        }
        if let Some(v) = partial.scroll_speed {
            out.scroll_speed = v;
        }
        if let Some(v) = partial.direction {
            out.direction = v;
        }
        if let Some(v) = partial.tile_base_vw {
            out.tile_base_vw = v;
        }
        if let Some(v) = partial.glyph_scale {
            out.glyph_scale = v;
        }
        if let Some(v) = partial.fps_floor {
            out.fps_floor = v;
        }
        if let Some(v) = partial.auto_quality {
            out.auto_quality = v;
        }
        out.validate()?;
        Ok(out)
    }

    pub fn validate(&self) -> PhotoglyphResult<()> {
        if self.text.trim().is_empty() {
            return Err(PhotoglyphError::validation("ticker text must be non-empty"));
        }
        if !self.scroll_speed.is_finite() || self.scroll_speed < 0.0 {
            return Err(PhotoglyphError::validation(
                "scroll_speed must be finite and >= 0",
            ));
        }
        if !self.tile_base_vw.is_finite() || self.tile_base_vw <= 0.0 || self.tile_base_vw > 100.0
        {
            return Err(PhotoglyphError::validation(
                "tile_base_vw must be in (0, 100]",
            ));
        }
        if !self.glyph_scale.is_finite() || self.glyph_scale <= 0.0 {
            return Err(PhotoglyphError::validation(
                "glyph_scale must be finite and > 0",
            ));
        }
        if !self.fps_floor.is_finite() || self.fps_floor < 0.0 {
            return Err(PhotoglyphError::validation(
                "fps_floor must be finite and >= 0",
            ));
        }
        Ok(())
    }

    /// Render tile edge in pixels for a viewport of `viewport_width` pixels.
    pub fn tile_px(&self, viewport_width: u32) -> u32 {
        let px = (f64::from(viewport_width) * self.tile_base_vw / 100.0).round();
        (px as u32).max(MIN_TILE_PX)
    }
}

/// Smallest render tile edge the engine will lay out.
pub const MIN_TILE_PX: u32 = 4;

/// Partial update for [`EngineConfig`]; `None` fields keep their current value.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PartialConfig {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub scroll_speed: Option<f64>,
    #[serde(default)]
    pub direction: Option<ScrollDirection>,
    #[serde(default)]
    pub tile_base_vw: Option<f64>,
    #[serde(default)]
    pub glyph_scale: Option<f64>,
    #[serde(default)]
    pub fps_floor: Option<f64>,
    #[serde(default)]
    pub auto_quality: Option<bool>,
}

impl PartialConfig {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Linear blend weights for tile desirability scoring.
///
/// Foreground: `fg_luma * luma + fg_saturation * 100 * saturation`, ranked descending.
/// Background: `bg_luma * luma + bg_desaturation * 100 * (1 - saturation)`, ranked ascending.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoreWeights {
    pub fg_luma: f64,
    pub fg_saturation: f64,
    pub bg_luma: f64,
    pub bg_desaturation: f64,
    /// Fraction of the atlas drawn into each ranked pool (at least one tile).
    pub pool_fraction: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            fg_luma: 0.7,
            fg_saturation: 0.3,
            bg_luma: 0.5,
            bg_desaturation: 0.5,
            pool_fraction: 0.5,
        }
    }
}

/// Atlas packing parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AtlasOpts {
    /// Edge of one square atlas cell in pixels.
    pub cell_size: u32,
    /// Upper bound on atlas width in pixels.
    pub max_width: u32,
}

impl Default for AtlasOpts {
    fn default() -> Self {
        Self {
            cell_size: 64,
            max_width: 4096,
        }
    }
}

impl AtlasOpts {
    pub fn validate(&self) -> PhotoglyphResult<()> {
        if self.cell_size == 0 {
            return Err(PhotoglyphError::validation("atlas cell_size must be > 0"));
        }
        if self.max_width < self.cell_size {
            return Err(PhotoglyphError::validation(
                "atlas max_width must fit at least one cell",
            ));
        }
        Ok(())
    }

    /// Maximum tiles per row allowed by `max_width`.
    pub fn row_cap(&self) -> u32 {
        (self.max_width / self.cell_size.max(1)).max(1)
    }
}

/// Variant generation parameters: square edge per size class and encoder settings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct VariantOpts {
    pub small_px: u32,
    pub medium_px: u32,
    pub large_px: u32,
    /// JPEG quality, 1..=100.
    pub jpeg_quality: u8,
    /// AVIF quality, 1..=100.
    pub avif_quality: u8,
    /// AVIF encoder speed, 1 (slow) ..= 10 (fast).
    pub avif_speed: u8,
}

impl Default for VariantOpts {
    fn default() -> Self {
        Self {
            small_px: 160,
            medium_px: 320,
            large_px: 960,
            jpeg_quality: 82,
            avif_quality: 60,
            avif_speed: 8,
        }
    }
}

impl VariantOpts {
    /// Square edge in pixels after the cover fit.
    pub fn edge_px(&self, size: crate::photo::record::VariantSize) -> u32 {
        use crate::photo::record::VariantSize;
        match size {
            VariantSize::Small => self.small_px,
            VariantSize::Medium => self.medium_px,
            VariantSize::Large => self.large_px,
        }
    }

    pub fn validate(&self) -> PhotoglyphResult<()> {
        if self.small_px == 0 || self.medium_px == 0 || self.large_px == 0 {
            return Err(PhotoglyphError::validation("variant edges must be > 0"));
        }
        if !(1..=100).contains(&self.jpeg_quality) || !(1..=100).contains(&self.avif_quality) {
            return Err(PhotoglyphError::validation(
                "variant qualities must be in 1..=100",
            ));
        }
        if !(1..=10).contains(&self.avif_speed) {
            return Err(PhotoglyphError::validation("avif_speed must be in 1..=10"));
        }
        Ok(())
    }
}

/// Glyph rasterization parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GlyphOpts {
    /// Font size at scale 1.0.
    pub base_font_px: f32,
    /// Padding around the text box at scale 1.0.
    pub padding_px: f32,
    /// Font weight (CSS scale, 700 = bold).
    pub weight: f32,
}

impl Default for GlyphOpts {
    fn default() -> Self {
        Self {
            base_font_px: 192.0,
            padding_px: 8.0,
            weight: 700.0,
        }
    }
}

/// Hover-zoom and scene layout parameters.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InteractionOpts {
    /// Duration of the zoom and restore animations, in seconds.
    pub duration_s: f64,
    /// Enlarged sprite edge as a fraction of the viewport's short side.
    pub zoom_fraction: f64,
    /// Opacity of the dimming overlay behind the enlarged sprite.
    pub overlay_alpha: f32,
    /// Gap between scene copies, in render tiles.
    pub loop_gap_tiles: u32,
    /// Desaturation applied to background-assigned sprites.
    pub background_desaturate: f32,
    /// Brightness multiplier applied to background-assigned sprites.
    pub background_brightness: f32,
}

impl Default for InteractionOpts {
    fn default() -> Self {
        Self {
            duration_s: 0.35,
            zoom_fraction: 0.4,
            overlay_alpha: 0.6,
            loop_gap_tiles: 2,
            background_desaturate: 0.85,
            background_brightness: 0.45,
        }
    }
}

/// Degradation policy an embedding layer may apply when the engine reports low FPS.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct QualityPolicy {
    pub tile_growth: f64,
    pub max_tile_base_vw: f64,
    pub glyph_shrink: f64,
    pub min_glyph_scale: f64,
}

impl Default for QualityPolicy {
    fn default() -> Self {
        Self {
            tile_growth: 1.25,
            max_tile_base_vw: 8.0,
            glyph_shrink: 0.9,
            min_glyph_scale: 0.5,
        }
    }
}

impl QualityPolicy {
    /// Fewer, larger sprites: returns the partial update to feed back into the engine.
    pub fn degrade(&self, cfg: &EngineConfig) -> PartialConfig {
        let tile = (cfg.tile_base_vw * self.tile_growth).min(self.max_tile_base_vw);
        let scale = (cfg.glyph_scale * self.glyph_shrink).max(self.min_glyph_scale);
        PartialConfig {
            tile_base_vw: (tile != cfg.tile_base_vw).then_some(tile),
            glyph_scale: (scale != cfg.glyph_scale).then_some(scale),
            ..PartialConfig::default()
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/config.rs"]
mod tests;
