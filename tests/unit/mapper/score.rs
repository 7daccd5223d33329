use rand::SeedableRng;
use rand::rngs::StdRng;

use super::*;
use crate::foundation::core::Rgb8;

fn tile(luma: f64, saturation: f64) -> AtlasTile {
    AtlasTile {
        id: 0,
        filename: String::new(),
        x: 0,
        y: 0,
        width: 1,
        height: 1,
        avg_color: Rgb8::default(),
        luma,
        saturation,
    }
}

fn four() -> Vec<AtlasTile> {
    vec![tile(200.0, 0.8), tile(180.0, 0.6), tile(50.0, 0.2), tile(30.0, 0.1)]
}

#[test]
fn scores_use_configured_weights() {
    let w = ScoreWeights::default();
    let t = tile(200.0, 0.8);
    assert!((foreground_score(&t, &w) - 164.0).abs() < 1e-9);
    assert!((background_score(&t, &w) - 110.0).abs() < 1e-9);

    let luma_only = ScoreWeights {
        fg_luma: 1.0,
        fg_saturation: 0.0,
        ..w
    };
    assert_eq!(foreground_score(&t, &luma_only), 200.0);
}

#[test]
fn rankings_prefer_bright_fg_and_dark_bg() {
    let w = ScoreWeights::default();
    assert_eq!(rank_foreground(&four(), &w), vec![0, 1, 2, 3]);
    assert_eq!(rank_background(&four(), &w), vec![3, 2, 0, 1]);
}

#[test]
fn pool_len_bounds() {
    assert_eq!(pool_len(0, 0.5), 0);
    assert_eq!(pool_len(1, 0.0), 1);
    assert_eq!(pool_len(4, 0.5), 2);
    assert_eq!(pool_len(5, 0.5), 3);
    assert_eq!(pool_len(5, 2.0), 5);
    assert_eq!(pool_len(5, f64::NAN), 5);
}

#[test]
fn pools_hold_the_best_share_in_any_order() {
    let w = ScoreWeights::default();
    let mut rng = StdRng::seed_from_u64(7);
    let pools = TilePools::build(&four(), &w, &mut rng);
    let mut fg = pools.foreground.clone();
    fg.sort();
    let mut bg = pools.background.clone();
    bg.sort();
    assert_eq!(fg, vec![0, 1]);
    assert_eq!(bg, vec![2, 3]);
}
