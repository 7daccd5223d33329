use super::*;

fn entry(size: VariantSize, encoding: VariantEncoding, bytes: u64) -> VariantEntry {
    VariantEntry {
        size,
        encoding,
        bytes,
        path: variant_rel_path("a.jpg", size, encoding),
    }
}

#[test]
fn matrix_has_nine_distinct_pairs() {
    let pairs: Vec<_> = variant_matrix().collect();
    assert_eq!(pairs.len(), 9);
    let unique: std::collections::HashSet<_> = pairs.iter().collect();
    assert_eq!(unique.len(), 9);
}

#[test]
fn variant_paths_are_deterministic() {
    let a = variant_rel_path("Beach Day.JPG", VariantSize::Medium, VariantEncoding::Webp);
    assert_eq!(
        a,
        variant_rel_path("Beach Day.JPG", VariantSize::Medium, VariantEncoding::Webp)
    );
    assert!(a.starts_with("variants/beach_day-"), "{a}");
    assert!(a.ends_with("/medium.webp"), "{a}");

    let b = variant_rel_path("noext", VariantSize::Large, VariantEncoding::Avif);
    assert!(b.starts_with("variants/noext-") && b.ends_with("/large.avif"), "{b}");
}

#[test]
fn names_sharing_a_slug_get_distinct_variant_dirs() {
    let names = [
        "beach.jpg",
        "beach.png",
        "Beach.jpg",
        "a b.jpg",
        "a_b.jpg",
        "beach",
    ];
    let paths: std::collections::HashSet<_> = names
        .iter()
        .map(|n| variant_rel_path(n, VariantSize::Medium, VariantEncoding::Jpeg))
        .collect();
    assert_eq!(paths.len(), names.len());
}

#[test]
fn insert_replaces_same_pair() {
    let mut set = VariantSet::new();
    set.insert(entry(VariantSize::Small, VariantEncoding::Jpeg, 10));
    set.insert(entry(VariantSize::Small, VariantEncoding::Jpeg, 20));
    assert_eq!(set.len(), 1);
    assert_eq!(
        set.get(VariantSize::Small, VariantEncoding::Jpeg)
            .unwrap()
            .bytes,
        20
    );
}

#[test]
fn completeness_tracks_missing_pairs() {
    let mut set = VariantSet::new();
    assert_eq!(set.missing().len(), 9);
    for (s, e) in variant_matrix() {
        if (s, e) != (VariantSize::Large, VariantEncoding::Avif) {
            set.insert(entry(s, e, 1));
        }
    }
    assert!(!set.is_complete());
    assert_eq!(
        set.missing(),
        vec![(VariantSize::Large, VariantEncoding::Avif)]
    );
    set.insert(entry(VariantSize::Large, VariantEncoding::Avif, 1));
    assert!(set.is_complete());
}
