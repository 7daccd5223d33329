use std::sync::Arc;

use crate::engine::scene::{Scene, sprite_rect};
use crate::foundation::core::Viewport;
use crate::foundation::error::{PhotoglyphError, PhotoglyphResult};
use crate::foundation::math::{color_matrix_rgba8_premul, dim_matrix, premultiply_rgba8_in_place};

/// One rendered frame of premultiplied RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy for image encoders.
    pub fn to_rgba_image(&self) -> PhotoglyphResult<image::RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            for px in data.chunks_exact_mut(4) {
                let a = u16::from(px[3]);
                if a == 0 || a == 255 {
                    continue;
                }
                for c in &mut px[..3] {
                    *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| PhotoglyphError::validation("frame byte length mismatch"))
    }
}

/// GPU-style texture pair for one atlas: as packed, and desaturated/darkened for background cells.
#[derive(Clone)]
pub struct AtlasTextures {
    normal: vello_cpu::Image,
    dimmed: vello_cpu::Image,
    width: u32,
    height: u32,
}

impl std::fmt::Debug for AtlasTextures {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AtlasTextures")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl AtlasTextures {
    /// Upload a straight-alpha atlas image and derive its background treatment.
    pub fn from_image(
        atlas: &image::RgbaImage,
        desaturate: f32,
        brightness: f32,
    ) -> PhotoglyphResult<Self> {
        let (width, height) = atlas.dimensions();
        let mut premul = atlas.as_raw().clone();
        premultiply_rgba8_in_place(&mut premul);
        let mut dimmed = vec![0u8; premul.len()];
        color_matrix_rgba8_premul(&premul, &mut dimmed, dim_matrix(desaturate, brightness));

        Ok(Self {
            normal: image_paint(&premul, width, height)?,
            dimmed: image_paint(&dimmed, width, height)?,
            width,
            height,
        })
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

fn image_paint(rgba8_premul: &[u8], width: u32, height: u32) -> PhotoglyphResult<vello_cpu::Image> {
    let w: u16 = width
        .try_into()
        .map_err(|_| PhotoglyphError::validation("atlas width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| PhotoglyphError::validation("atlas height exceeds u16"))?;
    if rgba8_premul.len() != width as usize * height as usize * 4 {
        return Err(PhotoglyphError::validation("atlas byte length mismatch"));
    }

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in rgba8_premul.chunks_exact(4) {
        may_have_opacities |= px[3] != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        });
    }
    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

/// Draw the scene at horizontal translation `translate_x` into a viewport-sized frame.
///
/// Sprites at or below z 0 are drawn first, then the dimming overlay, then raised sprites.
/// Sprites entirely outside the viewport are culled.
pub fn render_scene(
    scene: &Scene,
    textures: &AtlasTextures,
    translate_x: f64,
    overlay_alpha: f64,
    viewport: Viewport,
) -> PhotoglyphResult<FrameRGBA> {
    let w: u16 = viewport
        .width
        .try_into()
        .map_err(|_| PhotoglyphError::surface_init("viewport width exceeds u16"))?;
    let h: u16 = viewport
        .height
        .try_into()
        .map_err(|_| PhotoglyphError::surface_init("viewport height exceeds u16"))?;
    let (vw, vh) = (f64::from(viewport.width), f64::from(viewport.height));
    let full = vello_cpu::kurbo::Rect::new(0.0, 0.0, vw, vh);

    let mut ctx = vello_cpu::RenderContext::new(w, h);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, 255));
    ctx.fill_rect(&full);

    let mut order: Vec<usize> = (0..scene.sprites().len()).collect();
    order.sort_by_key(|&i| scene.sprites()[i].transform.z);
    let split = order.partition_point(|&i| scene.sprites()[i].transform.z <= 0);

    let draw = |ctx: &mut vello_cpu::RenderContext, idx: &[usize]| {
        for &i in idx {
            let s = &scene.sprites()[i];
            let r = sprite_rect(s, scene.tile_px());
            let (x0, x1) = (r.x0 + translate_x, r.x1 + translate_x);
            if x1 <= 0.0 || x0 >= vw || r.y1 <= 0.0 || r.y0 >= vh || s.source.width == 0 {
                continue;
            }
            let k = r.width() / f64::from(s.source.width);
            ctx.set_transform(
                vello_cpu::kurbo::Affine::translate((x0, r.y0)) * vello_cpu::kurbo::Affine::scale(k),
            );
            ctx.set_paint(if s.foreground {
                textures.normal.clone()
            } else {
                textures.dimmed.clone()
            });
            ctx.set_paint_transform(vello_cpu::kurbo::Affine::translate((
                -f64::from(s.source.x),
                -f64::from(s.source.y),
            )));
            ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
                0.0,
                0.0,
                f64::from(s.source.width),
                f64::from(s.source.height),
            ));
        }
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
    };

    draw(&mut ctx, &order[..split]);
    if overlay_alpha > 0.0 {
        let a = (overlay_alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(0, 0, 0, a));
        ctx.fill_rect(&full);
    }
    draw(&mut ctx, &order[split..]);

    let mut pixmap = vello_cpu::Pixmap::new(w, h);
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    Ok(FrameRGBA {
        width: viewport.width,
        height: viewport.height,
        data: pixmap.data_as_u8_slice().to_vec(),
        premultiplied: true,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/engine/raster.rs"]
mod tests;
