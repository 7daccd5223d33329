use std::cell::RefCell;
use std::io::Cursor;
use std::rc::Rc;

use super::*;
use crate::atlas::document::AtlasTile;
use crate::engine::assets::MemoryAssetLoader;
use crate::engine::surface::InMemorySurface;
use crate::foundation::core::Rgb8;

const DT: f64 = 1.0 / 60.0;

fn loader() -> MemoryAssetLoader {
    let colors = [[250, 60, 40], [230, 200, 30], [60, 60, 70], [20, 25, 20]];
    let stats = [(200.0, 0.8), (180.0, 0.6), (50.0, 0.2), (30.0, 0.1)];
    let img = image::RgbaImage::from_fn(16, 16, |x, y| {
        let i = (y / 8 * 2 + x / 8) as usize;
        let [r, g, b] = colors[i];
        image::Rgba([r, g, b, 255])
    });
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    let tiles = (0..4)
        .map(|i| AtlasTile {
            id: i as u64 + 1,
            filename: format!("p{i}.jpg"),
            x: (i as u32 % 2) * 8,
            y: (i as u32 / 2) * 8,
            width: 8,
            height: 8,
            avg_color: Rgb8::new(colors[i][0], colors[i][1], colors[i][2]),
            luma: stats[i].0,
            saturation: stats[i].1,
        })
        .collect();
    let metadata = AtlasMetadata {
        tiles,
        width: 16,
        height: 16,
        tile_size: 8,
    };
    MemoryAssetLoader {
        font: std::fs::read("tests/data/fonts/DejaVuSans-Bold.ttf").unwrap(),
        atlas_png: png,
        metadata_json: metadata.to_json_vec().unwrap(),
    }
}

fn config() -> EngineConfig {
    EngineConfig {
        text: "AB".to_string(),
        tile_base_vw: 5.0,
        glyph_scale: 0.25,
        ..EngineConfig::default()
    }
}

fn options() -> EngineOptions {
    EngineOptions {
        seed: Some(42),
        ..EngineOptions::default()
    }
}

fn engine(config: EngineConfig) -> Engine<InMemorySurface> {
    let surface = InMemorySurface::new(Viewport::new(200, 100).unwrap());
    Engine::with_options(surface, config, options())
}

async fn ready_engine(config: EngineConfig) -> Engine<InMemorySurface> {
    let mut e = engine(config);
    e.initialize(&loader()).await.unwrap();
    e
}

#[tokio::test]
async fn initialize_reaches_ready_and_fires_callbacks() {
    let mut e = engine(config());
    let fired = Rc::new(RefCell::new(0));
    let f = Rc::clone(&fired);
    e.on_ready(move || *f.borrow_mut() += 1);
    assert_eq!(e.state(), EngineState::Initializing);
    assert!(e.tick(DT).is_err());

    e.initialize(&loader()).await.unwrap();
    assert_eq!(e.state(), EngineState::Ready);
    assert_eq!(*fired.borrow(), 1);

    let late = Rc::clone(&fired);
    e.on_ready(move || *late.borrow_mut() += 10);
    assert_eq!(*fired.borrow(), 11);

    let scene = e.scene().unwrap();
    assert_eq!(scene.tile_px(), 10);
    assert!(scene.copies() >= 2);
    let a = e.assignment().unwrap();
    assert!(a.foreground_cells() > 0);
    for c in a.cells.iter().filter(|c| c.foreground) {
        assert!(c.tile == 0 || c.tile == 1);
    }

    e.tick(DT).unwrap();
    assert_eq!(e.state(), EngineState::Scrolling);
    assert!(e.scroll_offset() < 0.0);
    let probe = e.surface().probe();
    assert_eq!(probe.lock().unwrap().presents, 1);
    assert!(e.initialize(&loader()).await.is_err());
}

#[tokio::test]
async fn hover_round_trip_restores_rest_transform() {
    let mut e = ready_engine(config()).await;
    for _ in 0..3 {
        e.tick(DT).unwrap();
    }
    let tx = e.translate_x();
    let scene = e.scene().unwrap();
    let (_, rows) = scene.grid();
    let y = scene.sprites()[0].transform.y + f64::from(rows) * 5.0;
    let x = 15.0;
    let handle = scene
        .hit_test(crate::foundation::core::Point::new(x - tx, y))
        .expect("a sprite under the pointer");
    let rest = scene.sprite(handle).unwrap().transform;

    e.pointer_move(x, y);
    assert_eq!(e.state(), EngineState::Interacting);
    assert_eq!(e.focused_sprite(), Some(handle));
    assert_eq!(e.rest_transform(handle), Some(rest));

    let paused_at = e.scroll_offset();
    for _ in 0..30 {
        e.tick(DT).unwrap();
    }
    assert_eq!(e.scroll_offset(), paused_at);
    let zoomed = e.scene().unwrap().sprite(handle).unwrap().transform;
    assert!((zoomed.scale - 4.0).abs() < 1e-9);
    assert!(e.overlay_alpha() > 0.5);

    // Moving elsewhere keeps the focus; leaving releases it.
    e.pointer_move(190.0, 5.0);
    assert_eq!(e.focused_sprite(), Some(handle));
    e.pointer_leave();
    assert_eq!(e.focused_sprite(), None);

    let mut ticks_until_resume = 0;
    while e.state() == EngineState::Interacting {
        assert_eq!(e.scroll_offset(), paused_at);
        e.tick(DT).unwrap();
        ticks_until_resume += 1;
        assert!(ticks_until_resume < 100);
    }
    // Resume waits for the full restore animation.
    assert!(f64::from(ticks_until_resume) * DT >= 0.35 - 1e-9);
    let back = e.scene().unwrap().sprite(handle).unwrap().transform;
    assert!((back.x - rest.x).abs() < 1e-9);
    assert!((back.y - rest.y).abs() < 1e-9);
    assert!((back.scale - rest.scale).abs() < 1e-9);
    assert_eq!(back.z, rest.z);
    assert!(e.rest_transform(handle).is_none());
    assert_eq!(e.overlay_alpha(), 0.0);
}

#[tokio::test]
async fn hover_before_the_first_tick_is_honoured() {
    let mut e = ready_engine(config()).await;
    assert_eq!(e.state(), EngineState::Ready);
    let s = &e.scene().unwrap().sprites()[0];
    let (handle, rest) = (s.handle, s.transform);

    e.pointer_move(rest.x + 5.0, rest.y + 5.0);
    assert_eq!(e.state(), EngineState::Interacting);
    assert_eq!(e.focused_sprite(), Some(handle));

    for _ in 0..30 {
        e.tick(DT).unwrap();
    }
    assert_eq!(e.scroll_offset(), 0.0);
    e.pointer_leave();
    for _ in 0..60 {
        e.tick(DT).unwrap();
        if e.state() == EngineState::Scrolling {
            break;
        }
    }
    assert_eq!(e.state(), EngineState::Scrolling);
    let back = e.scene().unwrap().sprite(handle).unwrap().transform;
    assert!((back.x - rest.x).abs() < 1e-9 && (back.y - rest.y).abs() < 1e-9);
    assert!((back.scale - rest.scale).abs() < 1e-9);
}

#[tokio::test]
async fn press_outside_the_enlarged_sprite_releases() {
    let mut e = ready_engine(config()).await;
    e.tick(DT).unwrap();
    let scene = e.scene().unwrap();
    let s = &scene.sprites()[0];
    let (x, y) = (s.transform.x + e.translate_x() + 5.0, s.transform.y + 5.0);
    e.pointer_down(x, y);
    let target = e.focused_sprite().expect("tap focuses");
    for _ in 0..30 {
        e.tick(DT).unwrap();
    }
    // Inside the enlarged sprite (screen center): stays focused.
    e.pointer_down(100.0, 50.0);
    assert_eq!(e.focused_sprite(), Some(target));
    e.pointer_down(2.0, 2.0);
    assert_eq!(e.focused_sprite(), None);
}

#[tokio::test]
async fn seamless_loop_never_shows_past_the_duplicate() {
    let cfg = EngineConfig {
        scroll_speed: 900.0,
        ..config()
    };
    let mut e = ready_engine(cfg).await;
    let loop_width = e.scene().unwrap().loop_width();
    let (lo, hi) = e.scene().unwrap().extent();
    let mut resets = 0;
    let mut prev = 0.0_f64;
    for _ in 0..200 {
        e.tick(DT).unwrap();
        let off = e.scroll_offset();
        assert!(off.abs() <= loop_width);
        if off.abs() < prev.abs() {
            resets += 1;
            // Reset only happens once the previous offset plus one step exceeded the loop.
            assert!(prev.abs() + 900.0 * DT > loop_width);
        }
        prev = off;
        let (start, end) = e.visible_span().unwrap();
        assert!(start >= lo - 1e-9, "{start}");
        assert!(end <= hi + 1e-9, "{end} > {hi}");
    }
    assert!(resets >= 2);
}

#[tokio::test]
async fn right_scroll_stays_inside_the_pattern() {
    let cfg = EngineConfig {
        scroll_speed: 900.0,
        direction: crate::config::ScrollDirection::Right,
        ..config()
    };
    let mut e = ready_engine(cfg).await;
    let (lo, hi) = e.scene().unwrap().extent();
    for _ in 0..120 {
        e.tick(DT).unwrap();
        assert!(e.scroll_offset() >= 0.0);
        let (start, end) = e.visible_span().unwrap();
        assert!(start >= lo - 1e-9 && end <= hi + 1e-9);
    }
}

#[tokio::test]
async fn low_fps_raises_degradation_only_with_auto_quality() {
    for auto in [true, false] {
        let cfg = EngineConfig {
            auto_quality: auto,
            fps_floor: 30.0,
            ..config()
        };
        let mut e = ready_engine(cfg).await;
        let fps_seen = Rc::new(RefCell::new(Vec::new()));
        let signals = Rc::new(RefCell::new(Vec::new()));
        let f = Rc::clone(&fps_seen);
        e.on_fps_update(move |fps| f.borrow_mut().push(fps));
        let s = Rc::clone(&signals);
        e.on_degrade(move |sig| s.borrow_mut().push(sig));

        for _ in 0..16 {
            e.tick(0.125).unwrap();
        }
        assert_eq!(fps_seen.borrow().len(), 2);
        assert!((fps_seen.borrow()[0] - 8.0).abs() < 1e-9);
        if auto {
            assert_eq!(signals.borrow().len(), 2);
            assert_eq!(signals.borrow()[0].floor, 30.0);
        } else {
            assert!(signals.borrow().is_empty());
        }
    }
}

#[tokio::test]
async fn update_config_rebuilds_and_keeps_scrolling() {
    let mut e = ready_engine(config()).await;
    e.tick(DT).unwrap();
    let before = e.glyph_mask().unwrap().width();
    e.update_config(&PartialConfig {
        text: Some("ABCD".to_string()),
        ..PartialConfig::default()
    })
    .unwrap();
    assert_eq!(e.state(), EngineState::Scrolling);
    assert!(e.glyph_mask().unwrap().width() > before);
    assert_eq!(e.scroll_offset(), 0.0);
    assert_eq!(e.config().text, "ABCD");

    let bad = e.update_config(&PartialConfig {
        glyph_scale: Some(-1.0),
        ..PartialConfig::default()
    });
    assert!(matches!(bad, Err(PhotoglyphError::Validation(_))));
    assert_eq!(e.config().text, "ABCD");

    e.resize(400, 100).unwrap();
    assert_eq!(e.scene().unwrap().tile_px(), 20);
    assert_eq!(e.viewport().unwrap().width, 400);
}

#[tokio::test]
async fn destroy_is_idempotent() {
    let mut e = ready_engine(config()).await;
    e.tick(DT).unwrap();
    let probe = e.surface().probe();
    let token = e.cancel_token();
    e.destroy();
    e.destroy();
    assert_eq!(e.state(), EngineState::Destroyed);
    assert!(token.is_cancelled());
    assert!(e.scene().is_none());
    e.tick(DT).unwrap();
    drop(e);
    let p = probe.lock().unwrap();
    assert_eq!(p.detaches, 1);
    assert_eq!(p.presents, 1);
}

#[tokio::test]
async fn surface_failure_is_terminal() {
    let surface = InMemorySurface::unavailable(Viewport::new(10, 10).unwrap());
    let probe = surface.probe();
    let mut e = Engine::with_options(surface, config(), options());
    let err = e.initialize(&loader()).await.unwrap_err();
    assert!(matches!(err, PhotoglyphError::SurfaceInit(_)));
    assert_eq!(e.state(), EngineState::Failed);
    assert!(e.last_error().unwrap().starts_with("surface init error"));
    e.tick(DT).unwrap();
    e.destroy();
    assert_eq!(probe.lock().unwrap().detaches, 0);
}

#[tokio::test]
async fn missing_font_fails_initialization() {
    let mut bad = loader();
    bad.font = b"not a font".to_vec();
    let mut e = engine(config());
    let err = e.initialize(&bad).await.unwrap_err();
    assert!(matches!(err, PhotoglyphError::FontUnavailable(_)));
    assert_eq!(e.state(), EngineState::Failed);
    let probe = e.surface().probe();
    e.destroy();
    assert_eq!(probe.lock().unwrap().detaches, 1);
}

#[tokio::test]
async fn cancelled_session_never_becomes_ready() {
    let mut e = engine(config());
    e.cancel_token().cancel();
    let err = e.initialize(&loader()).await.unwrap_err();
    assert!(matches!(err, PhotoglyphError::Engine(_)));
    assert_eq!(e.state(), EngineState::Failed);
    assert!(e.scene().is_none());
}
