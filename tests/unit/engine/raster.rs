use super::*;
use crate::atlas::document::AtlasTile;
use crate::engine::scene::{SpriteHandle, TOP_Z};
use crate::foundation::core::Rgb8;
use crate::mapper::assign::{CellAssignment, TileAssignment};

fn atlas() -> image::RgbaImage {
    image::RgbaImage::from_fn(16, 8, |x, _| {
        if x < 8 {
            image::Rgba([240, 20, 20, 255])
        } else {
            image::Rgba([20, 240, 20, 255])
        }
    })
}

fn scene(viewport: Viewport) -> Scene {
    let tiles: Vec<AtlasTile> = (0..2)
        .map(|i| AtlasTile {
            id: i + 1,
            filename: format!("{i}.jpg"),
            x: i as u32 * 8,
            y: 0,
            width: 8,
            height: 8,
            avg_color: Rgb8::default(),
            luma: 0.0,
            saturation: 0.0,
        })
        .collect();
    let assignment = TileAssignment {
        cols: 2,
        rows: 1,
        cell_size: 20,
        cells: vec![
            CellAssignment {
                tile: 0,
                foreground: true,
            },
            CellAssignment {
                tile: 1,
                foreground: false,
            },
        ],
        foreground_pool: vec![0],
        background_pool: vec![1],
    };
    Scene::build(&assignment, &tiles, viewport, 20, 0).unwrap()
}

#[test]
fn foreground_is_untouched_and_background_is_dimmed() {
    let vp = Viewport::new(60, 40).unwrap();
    let tex = AtlasTextures::from_image(&atlas(), 0.85, 0.45).unwrap();
    assert_eq!(tex.size(), (16, 8));
    let frame = render_scene(&scene(vp), &tex, 0.0, 0.0, vp).unwrap();
    assert_eq!((frame.width, frame.height), (60, 40));
    assert!(frame.premultiplied);

    let fg = frame.pixel(10, 20).unwrap();
    assert!(fg[0] > 200 && fg[1] < 60, "{fg:?}");
    let bg = frame.pixel(30, 20).unwrap();
    assert!(bg[1] < 140, "{bg:?}");
    // Desaturated: channels are much closer together than in the source.
    assert!(i32::from(bg[1]) - i32::from(bg[0]) < 60, "{bg:?}");
    // Rows are vertically centered; above them is the black background.
    assert_eq!(frame.pixel(10, 2).unwrap(), [0, 0, 0, 255]);
    // The duplicate starts one loop width (40px) later.
    let dup = frame.pixel(50, 20).unwrap();
    assert!(dup[0] > 200, "{dup:?}");
}

#[test]
fn translation_moves_content_and_culls_offscreen() {
    let vp = Viewport::new(60, 40).unwrap();
    let tex = AtlasTextures::from_image(&atlas(), 0.85, 0.45).unwrap();
    let frame = render_scene(&scene(vp), &tex, -20.0, 0.0, vp).unwrap();
    // Background sprite now sits at screen x 0..20.
    let p = frame.pixel(10, 20).unwrap();
    assert!(p[0] < 120, "{p:?}");
}

#[test]
fn overlay_dims_everything_below_raised_sprites() {
    let vp = Viewport::new(60, 40).unwrap();
    let tex = AtlasTextures::from_image(&atlas(), 0.0, 1.0).unwrap();
    let mut sc = scene(vp);
    sc.sprite_mut(SpriteHandle(0)).unwrap().transform.z = TOP_Z;
    let frame = render_scene(&sc, &tex, 0.0, 0.5, vp).unwrap();

    let raised = frame.pixel(10, 20).unwrap();
    assert!(raised[0] > 200, "{raised:?}");
    let dimmed = frame.pixel(30, 20).unwrap();
    assert!(dimmed[1] > 90 && dimmed[1] < 150, "{dimmed:?}");
}

#[test]
fn straight_alpha_export() {
    let frame = FrameRGBA {
        width: 1,
        height: 1,
        data: vec![64, 0, 0, 128],
        premultiplied: true,
    };
    let img = frame.to_rgba_image().unwrap();
    assert_eq!(img.get_pixel(0, 0).0, [128, 0, 0, 128]);
    assert_eq!(frame.pixel(1, 0), None);
}
