use super::*;

#[test]
fn endpoints_are_stable() {
    for ease in [Ease::Linear, Ease::InOutCubic] {
        assert_eq!(ease.apply(0.0), 0.0);
        assert_eq!(ease.apply(1.0), 1.0);
    }
}

#[test]
fn monotonic_spot_check() {
    for ease in [Ease::Linear, Ease::InOutCubic] {
        let a = ease.apply(0.25);
        let b = ease.apply(0.5);
        let c = ease.apply(0.75);
        assert!(a < b);
        assert!(b < c);
    }
    assert_eq!(Ease::InOutCubic.apply(0.5), 0.5);
}

#[test]
fn tween_snaps_to_target_when_done() {
    let mut t = Tween::new(0.0, 10.0, 0.3, Ease::InOutCubic);
    let mid = t.advance(0.15);
    assert!((mid - 5.0).abs() < 1e-9);
    assert!(!t.is_finished());
    t.advance(0.1);
    t.advance(0.1);
    assert!(t.is_finished());
    assert_eq!(t.value(), 10.0);
}

#[test]
fn retarget_starts_from_current_value() {
    let mut t = Tween::new(0.0, 10.0, 1.0, Ease::Linear);
    t.advance(0.4);
    t.retarget(0.0, 1.0, Ease::Linear);
    assert!((t.value() - 4.0).abs() < 1e-9);
    t.advance(0.5);
    assert!((t.value() - 2.0).abs() < 1e-9);
}

#[test]
fn zero_duration_and_bad_dt_are_harmless() {
    let mut t = Tween::new(1.0, 2.0, 0.0, Ease::Linear);
    assert!(t.is_finished());
    assert_eq!(t.value(), 2.0);
    let mut u = Tween::new(1.0, 2.0, 1.0, Ease::Linear);
    u.advance(f64::NAN);
    u.advance(-1.0);
    assert_eq!(u.value(), 1.0);
    assert_eq!(Tween::settled(3.0).value(), 3.0);
}
