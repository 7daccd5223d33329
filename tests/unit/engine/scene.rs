use super::*;
use crate::foundation::core::Rgb8;
use crate::mapper::assign::CellAssignment;

fn tiles() -> Vec<AtlasTile> {
    (0..2)
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
        .collect()
}

fn assignment(cols: u32, rows: u32) -> TileAssignment {
    let cells = (0..cols * rows)
        .map(|i| CellAssignment {
            tile: (i % 2) as usize,
            foreground: i % 3 == 0,
        })
        .collect();
    TileAssignment {
        cols,
        rows,
        cell_size: 10,
        cells,
        foreground_pool: vec![0],
        background_pool: vec![1],
    }
}

#[test]
fn wide_content_gets_exactly_one_duplicate() {
    let vp = Viewport::new(100, 60).unwrap();
    let scene = Scene::build(&assignment(20, 3), &tiles(), vp, 10, 2).unwrap();
    assert_eq!(scene.content_width(), 200.0);
    assert_eq!(scene.loop_width(), 220.0);
    assert_eq!(scene.copies(), 2);
    assert_eq!(scene.sprites().len(), 120);

    let first = &scene.sprites()[0];
    let dup = &scene.sprites()[60];
    assert_eq!(dup.copy, 1);
    assert_eq!(dup.tile, first.tile);
    assert_eq!(dup.foreground, first.foreground);
    assert_eq!(dup.transform.x - first.transform.x, 220.0);
    // Rows are centered vertically: (60 - 30) / 2.
    assert_eq!(first.transform.y, 15.0);
    assert_eq!(scene.extent(), (0.0, 440.0));
}

#[test]
fn short_content_is_repeated_to_cover_the_viewport() {
    let vp = Viewport::new(500, 40).unwrap();
    let scene = Scene::build(&assignment(3, 2), &tiles(), vp, 10, 2).unwrap();
    assert_eq!(scene.loop_width(), 50.0);
    assert_eq!(scene.copies(), 11);
    assert!(f64::from(scene.copies() - 1) * scene.loop_width() >= 500.0);
}

#[test]
fn sprite_sources_follow_the_atlas() {
    let vp = Viewport::new(100, 100).unwrap();
    let scene = Scene::build(&assignment(2, 1), &tiles(), vp, 10, 0).unwrap();
    assert_eq!(scene.sprites()[1].source, PixelRect::new(8, 0, 8, 8));

    let mut bad = assignment(2, 1);
    bad.cells[0].tile = 9;
    assert!(Scene::build(&bad, &tiles(), vp, 10, 0).is_err());
}

#[test]
fn hit_test_prefers_raised_sprites() {
    let vp = Viewport::new(100, 20).unwrap();
    let mut scene = Scene::build(&assignment(4, 1), &tiles(), vp, 10, 0).unwrap();
    let y = scene.sprites()[0].transform.y + 5.0;
    assert_eq!(scene.hit_test(Point::new(15.0, y)), Some(SpriteHandle(1)));
    assert_eq!(scene.hit_test(Point::new(15.0, -50.0)), None);

    let s0 = scene.sprite_mut(SpriteHandle(0)).unwrap();
    s0.transform.scale = 3.0;
    s0.transform.z = TOP_Z;
    assert_eq!(scene.hit_test(Point::new(15.0, y)), Some(SpriteHandle(0)));
    assert_eq!(
        scene.bounds(SpriteHandle(0)).unwrap().width(),
        30.0
    );
}

#[test]
fn transform_lerp_keeps_the_higher_z_until_done() {
    let a = SpriteTransform {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        z: 0,
    };
    let b = SpriteTransform {
        x: 10.0,
        y: 20.0,
        scale: 3.0,
        z: TOP_Z,
    };
    let mid = b.lerp(a, 0.5);
    assert_eq!((mid.x, mid.y, mid.scale, mid.z), (5.0, 10.0, 2.0, TOP_Z));
}
