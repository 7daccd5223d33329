use super::*;

#[test]
fn reports_once_per_window() {
    let mut m = FpsMeter::new();
    let mut reports = Vec::new();
    for _ in 0..130 {
        if let Some(fps) = m.record(1.0 / 60.0) {
            reports.push(fps);
        }
    }
    assert_eq!(reports.len(), 2);
    for fps in &reports {
        assert!((fps - 60.0).abs() < 1.0, "{fps}");
    }
    assert_eq!(m.last(), reports.last().copied());
}

#[test]
fn slow_frames_measure_low_fps() {
    let mut m = FpsMeter::new();
    for _ in 0..7 {
        assert_eq!(m.record(0.125), None);
    }
    assert_eq!(m.record(0.125), Some(8.0));
    assert_eq!(m.record(-1.0), None);
}
