use super::*;

#[test]
fn defaults_apply_for_missing_keys() {
    let cfg = EngineConfig::from_settings(&Settings::new()).unwrap();
    assert_eq!(cfg, EngineConfig::default());
}

#[test]
fn settings_snapshot_is_parsed_and_unknown_keys_ignored() {
    let settings = Settings::from_json_str(
        r#"{
            "ticker_text": "AB",
            "scroll_speed": 120,
            "scroll_direction": "right",
            "tile_base_vw": "2.5",
            "glyph_scale": 0.75,
            "fps_floor": 45,
            "auto_quality": true,
            "rotate_words": "a,b,c"
        }"#,
    )
    .unwrap();
    let cfg = EngineConfig::from_settings(&settings).unwrap();
    assert_eq!(cfg.text, "AB");
    assert_eq!(cfg.scroll_speed, 120.0);
    assert_eq!(cfg.direction, ScrollDirection::Right);
    assert_eq!(cfg.tile_base_vw, 2.5);
    assert_eq!(cfg.glyph_scale, 0.75);
    assert_eq!(cfg.fps_floor, 45.0);
    assert!(cfg.auto_quality);
}

#[test]
fn bad_values_are_validation_errors() {
    let s = Settings::new().with("scroll_speed", "fast");
    assert!(matches!(
        EngineConfig::from_settings(&s),
        Err(PhotoglyphError::Validation(_))
    ));
    let s = Settings::new().with("glyph_scale", "0");
    assert!(EngineConfig::from_settings(&s).is_err());
    let s = Settings::new().with("ticker_text", "   ");
    assert!(EngineConfig::from_settings(&s).is_err());
    assert!(Settings::from_json_str("[1, 2]").is_err());
}

#[test]
fn merge_keeps_unset_fields() {
    let base = EngineConfig::default();
    let merged = base
        .merged(&PartialConfig {
            text: Some("XYZ".to_string()),
            ..PartialConfig::default()
        })
        .unwrap();
    assert_eq!(merged.text, "XYZ");
    assert_eq!(merged.scroll_speed, base.scroll_speed);
    assert!(PartialConfig::default().is_empty());
}

#[test]
fn tile_px_follows_viewport_width() {
    let cfg = EngineConfig {
        tile_base_vw: 2.0,
        ..EngineConfig::default()
    };
    assert_eq!(cfg.tile_px(1000), 20);
    assert_eq!(cfg.tile_px(10), MIN_TILE_PX);
}

#[test]
fn atlas_row_cap() {
    let opts = AtlasOpts {
        cell_size: 64,
        max_width: 200,
    };
    assert_eq!(opts.row_cap(), 3);
    assert!(
        AtlasOpts {
            cell_size: 64,
            max_width: 32
        }
        .validate()
        .is_err()
    );
}

#[test]
fn quality_policy_grows_tiles_and_respects_bounds() {
    let policy = QualityPolicy::default();
    let cfg = EngineConfig::default();
    let p = policy.degrade(&cfg);
    assert_eq!(p.tile_base_vw, Some(cfg.tile_base_vw * 1.25));
    assert_eq!(p.glyph_scale, Some(0.9));

    let floor = EngineConfig {
        tile_base_vw: policy.max_tile_base_vw,
        glyph_scale: policy.min_glyph_scale,
        ..EngineConfig::default()
    };
    assert!(policy.degrade(&floor).is_empty());
}

#[test]
fn variant_opts_edges_and_validation() {
    use crate::photo::record::VariantSize;
    let opts = VariantOpts::default();
    assert_eq!(opts.edge_px(VariantSize::Small), 160);
    assert_eq!(opts.edge_px(VariantSize::Medium), 320);
    assert_eq!(opts.edge_px(VariantSize::Large), 960);
    assert!(opts.validate().is_ok());
    assert!(
        VariantOpts {
            avif_speed: 0,
            ..opts
        }
        .validate()
        .is_err()
    );
}
