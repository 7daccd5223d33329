use crate::config::GlyphOpts;
use crate::foundation::core::PixelRect;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::glyph::font::FontSource;

/// Alpha strictly above this value counts as ink (coverage > 50%).
const INK_THRESHOLD: u8 = 127;

/// Binary occupancy grid, one bit per pixel, row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphMask {
    width: u32,
    height: u32,
    words: Vec<u64>,
}

impl GlyphMask {
    pub fn new(width: u32, height: u32) -> Self {
        let bits = width as usize * height as usize;
        Self {
            width,
            height,
            words: vec![0; bits.div_ceil(64)],
        }
    }

    /// Threshold an alpha plane (one byte per pixel) into a mask.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> PhotoglyphResult<Self> {
        if alpha.len() != width as usize * height as usize {
            return Err(PhotoglyphError::validation("alpha plane length mismatch"));
        }
        let mut mask = Self::new(width, height);
        for (i, &a) in alpha.iter().enumerate() {
            if a > INK_THRESHOLD {
                mask.words[i / 64] |= 1 << (i % 64);
            }
        }
        Ok(mask)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Ink at `(x, y)`; out-of-range coordinates read as empty.
    pub fn get(&self, x: u32, y: u32) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let i = y as usize * self.width as usize + x as usize;
        self.words[i / 64] & (1 << (i % 64)) != 0
    }

    pub fn set(&mut self, x: u32, y: u32, ink: bool) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        if ink {
            self.words[i / 64] |= 1 << (i % 64);
        } else {
            self.words[i / 64] &= !(1 << (i % 64));
        }
    }

    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Tightest rectangle containing every ink pixel.
    pub fn ink_bounds(&self) -> Option<PixelRect> {
        let (mut x0, mut y0, mut x1, mut y1) = (u32::MAX, u32::MAX, 0, 0);
        let mut any = false;
        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    any = true;
                    x0 = x0.min(x);
                    y0 = y0.min(y);
                    x1 = x1.max(x);
                    y1 = y1.max(y);
                }
            }
        }
        any.then(|| PixelRect::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// White-on-black preview image.
    pub fn to_image(&self) -> image::GrayImage {
        image::GrayImage::from_fn(self.width, self.height, |x, y| {
            image::Luma([if self.get(x, y) { 255 } else { 0 }])
        })
    }
}

/// Brush for mask layouts; ink is always opaque white.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ink;

/// Lays out text with parley and rasterizes it with vello_cpu into [`GlyphMask`]s.
pub struct GlyphRasterizer {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Ink>,
    font: FontSource,
    font_data: vello_cpu::peniko::FontData,
    opts: GlyphOpts,
}

impl GlyphRasterizer {
    pub fn new(font: FontSource, opts: GlyphOpts) -> PhotoglyphResult<Self> {
        if !opts.base_font_px.is_finite() || opts.base_font_px <= 0.0 {
            return Err(PhotoglyphError::validation(
                "glyph base_font_px must be finite and > 0",
            ));
        }
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font.bytes().to_vec()), None);
        if families.is_empty() {
            return Err(PhotoglyphError::font_unavailable(format!(
                "font family '{}' did not register",
                font.family()
            )));
        }
        let font_data = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font.bytes().to_vec()),
            0,
        );
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            font,
            font_data,
            opts,
        })
    }

    pub fn font(&self) -> &FontSource {
        &self.font
    }

    fn layout(&mut self, text: &str, size_px: f32) -> parley::Layout<Ink> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(
                self.font.family().to_string(),
            )),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(self.opts.weight),
        ));
        builder.push_default(parley::style::StyleProperty::Brush(Ink));

        let mut layout: parley::Layout<Ink> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Rasterize `text` at `base_font_px * scale` and threshold its coverage.
    ///
    /// The mask bounds the laid-out text box plus `ceil(padding_px * scale)` on every side.
    #[tracing::instrument(skip(self))]
    pub fn rasterize(&mut self, text: &str, scale: f64) -> PhotoglyphResult<GlyphMask> {
        if text.trim().is_empty() {
            return Err(PhotoglyphError::validation("glyph text must be non-empty"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PhotoglyphError::validation(
                "glyph scale must be finite and > 0",
            ));
        }
        let size_px = self.opts.base_font_px * scale as f32;
        let pad = (f64::from(self.opts.padding_px.max(0.0)) * scale).ceil() as u32;

        let layout = self.layout(text, size_px);
        let width = (layout.width().ceil().max(1.0) as u32).saturating_add(2 * pad);
        let height = (layout.height().ceil().max(1.0) as u32).saturating_add(2 * pad);
        let w: u16 = width
            .try_into()
            .map_err(|_| PhotoglyphError::validation("glyph mask width exceeds u16"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| PhotoglyphError::validation("glyph mask height exceeds u16"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_transform(vello_cpu::kurbo::Affine::translate((
            f64::from(pad),
            f64::from(pad),
        )));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font_data)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }

        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);
        let alpha: Vec<u8> = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();

        let mask = GlyphMask::from_alpha(width, height, &alpha)?;
        tracing::debug!(width, height, ink = mask.count_ones(), "glyph mask rasterized");
        Ok(mask)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/glyph/mask.rs"]
mod tests;
