use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        PhotoglyphError::decode("x")
            .to_string()
            .contains("decode error:")
    );
    assert!(
        PhotoglyphError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        PhotoglyphError::empty_atlas("x")
            .to_string()
            .contains("empty atlas:")
    );
    assert!(
        PhotoglyphError::font_unavailable("x")
            .to_string()
            .contains("font unavailable:")
    );
    assert!(
        PhotoglyphError::surface_init("x")
            .to_string()
            .contains("surface init error:")
    );
    assert!(
        PhotoglyphError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = PhotoglyphError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}

#[test]
fn per_item_classification() {
    assert!(PhotoglyphError::decode("x").is_per_item());
    assert!(PhotoglyphError::encode("x").is_per_item());
    assert!(!PhotoglyphError::empty_atlas("x").is_per_item());
    assert!(!PhotoglyphError::font_unavailable("x").is_per_item());
}

#[test]
fn serde_json_errors_map_to_serde_variant() {
    let err: PhotoglyphError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, PhotoglyphError::Serde(_)));
}
