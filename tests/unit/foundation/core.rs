use super::*;

#[test]
fn frame_range_rejects_inverted_bounds() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(4)).is_err());
    let r = FrameRange::new(FrameIndex(2), FrameIndex(6)).unwrap();
    assert_eq!(r.len_frames(), 4);
    assert!(r.contains(FrameIndex(2)));
    assert!(!r.contains(FrameIndex(6)));
}

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn frame_time_is_exact_for_round_rates() {
    let fps = Fps::new(10, 1).unwrap();
    assert_eq!(fps.frame_time_secs(FrameIndex(0)), 0.0);
    assert_eq!(fps.frame_time_secs(FrameIndex(5)), 0.5);
    assert_eq!(fps.frame_time_secs(FrameIndex(10)), 1.0);

    let ntsc = Fps::new(30000, 1001).unwrap();
    assert!((ntsc.frame_time_secs(FrameIndex(30000)) - 1001.0).abs() < 1e-9);
}

#[test]
fn secs_to_frames_rounds_up_partial_frames() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(0.5), 15);
    assert_eq!(fps.secs_to_frames_ceil(0.51), 16);
    assert_eq!(fps.secs_to_frames_ceil(0.0), 0);
}

#[test]
fn canvas_validation_bounds() {
    assert!(Canvas { width: 0, height: 10 }.validate().is_err());
    assert!(Canvas { width: 70_000, height: 10 }.validate().is_err());
    Canvas { width: 1080, height: 1920 }.validate().unwrap();
}

#[test]
fn rgba8_premul_and_lerp() {
    assert_eq!(Rgba8::rgba(255, 128, 0, 128).to_premul(), [128, 64, 0, 128]);
    assert_eq!(Rgba8::rgb(1, 2, 3).to_premul(), [1, 2, 3, 255]);

    let black = Rgba8::rgb(0, 0, 0);
    let white = Rgba8::rgb(255, 255, 255);
    assert_eq!(black.lerp(white, 0.0), black);
    assert_eq!(black.lerp(white, 1.0), white);
    assert_eq!(black.lerp(white, 0.5), Rgba8::rgb(128, 128, 128));
    assert_eq!(black.lerp(white, 7.0), white);
}
