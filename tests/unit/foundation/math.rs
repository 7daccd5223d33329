use super::*;

#[test]
fn fnv_hash_is_stable_across_chunking() {
    let mut a = Fnv1a64::new_default();
    a.write_bytes(b"photoglyph");
    let mut b = Fnv1a64::new_default();
    b.write_u8(b'p');
    b.write_bytes(b"hotoglyph");
    assert_eq!(a.finish(), b.finish());
}

#[test]
fn premultiply_zero_alpha_clears_color() {
    let mut px = vec![200u8, 100, 50, 0, 200, 100, 50, 255];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(&px[..4], &[0, 0, 0, 0]);
    assert_eq!(&px[4..], &[200, 100, 50, 255]);
}

#[test]
fn identity_dim_matrix_preserves_pixels() {
    let src = vec![10u8, 200, 30, 255];
    let mut dst = vec![0u8; 4];
    color_matrix_rgba8_premul(&src, &mut dst, dim_matrix(0.0, 1.0));
    assert_eq!(dst, src);
}

#[test]
fn full_desaturation_yields_grey() {
    let src = vec![255u8, 0, 0, 255];
    let mut dst = vec![0u8; 4];
    color_matrix_rgba8_premul(&src, &mut dst, dim_matrix(1.0, 0.5));
    assert_eq!(dst[0], dst[1]);
    assert_eq!(dst[1], dst[2]);
    assert!(dst[0] < 60);
    assert_eq!(dst[3], 255);
}
