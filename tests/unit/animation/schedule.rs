use super::*;

fn sched(start: f64, duration: f64, mode: EntranceMode) -> AnimationSchedule {
    AnimationSchedule {
        start,
        duration,
        ease: Ease::Linear,
        mode,
        exit: None,
    }
}

#[test]
fn phases_follow_time() {
    let s = sched(1.0, 2.0, EntranceMode::FadeIn);
    assert_eq!(s.phase(0.5), LayerPhase::Pending);
    assert_eq!(s.phase(1.0), LayerPhase::Entering(0.0));
    assert_eq!(s.phase(2.0), LayerPhase::Entering(0.5));
    assert_eq!(s.phase(3.0), LayerPhase::Settled);
    assert_eq!(s.phase(30.0), LayerPhase::Settled);
}

#[test]
fn zero_duration_is_a_cut() {
    let s = sched(1.0, 0.0, EntranceMode::FadeIn);
    assert_eq!(s.phase(0.999), LayerPhase::Pending);
    assert_eq!(s.phase(1.0), LayerPhase::Settled);
    assert_eq!(s.progress(1.0), Some(1.0));
}

#[test]
fn exit_is_symmetric_to_entry() {
    let mut s = sched(0.0, 1.0, EntranceMode::FadeIn);
    s.exit = Some(ExitSchedule {
        start: 3.0,
        duration: 1.0,
        ease: Ease::Linear,
    });
    assert_eq!(s.phase(2.0), LayerPhase::Settled);
    assert_eq!(s.phase(3.5), LayerPhase::Exiting(0.5));
    assert_eq!(s.progress(3.5), Some(0.5));
    assert_eq!(s.progress(0.5), Some(0.5));
    assert_eq!(s.phase(4.0), LayerPhase::Gone);
    assert!(s.phase(3.5).is_visible());
    assert!(!s.phase(4.0).is_visible());
    assert_eq!(s.visual_state(4.5), None);
}

#[test]
fn modes_map_progress_to_state() {
    let fade = sched(0.0, 2.0, EntranceMode::FadeIn).visual_state(1.0).unwrap();
    assert_eq!(fade.opacity, 0.5);
    assert_eq!(fade.scale, 1.0);

    let slide = sched(0.0, 2.0, EntranceMode::SlideIn { dx: 0.0, dy: 100.0 })
        .visual_state(1.0)
        .unwrap();
    assert_eq!(slide.offset, Vec2::new(0.0, 50.0));
    assert_eq!(slide.opacity, 1.0);

    let scale = sched(0.0, 2.0, EntranceMode::ScaleIn).visual_state(0.5).unwrap();
    assert_eq!(scale.scale, 0.25);

    let reveal = sched(0.0, 1.0, EntranceMode::Reveal).visual_state(0.5).unwrap();
    assert_eq!(reveal.reveal, Some(0.5));

    let pulse = sched(
        0.0,
        0.0,
        EntranceMode::Pulsate {
            amplitude: 0.1,
            angular_speed: std::f64::consts::PI,
        },
    )
    .visual_state(0.5)
    .unwrap();
    assert!((pulse.scale - 1.1).abs() < 1e-12);
}

#[test]
fn settled_state_is_stable() {
    let s = sched(0.25, 0.5, EntranceMode::SlideIn { dx: 40.0, dy: 0.0 });
    let a = s.visual_state(0.75).unwrap();
    let b = s.visual_state(9.0).unwrap();
    assert_eq!(a, b);
    assert_eq!(a, VisualState::SETTLED);
}

#[test]
fn validation_rejects_bad_schedules() {
    assert!(sched(-1.0, 1.0, EntranceMode::FadeIn).validate(5.0).is_err());
    assert!(sched(0.0, -1.0, EntranceMode::FadeIn).validate(5.0).is_err());
    assert!(sched(6.0, 1.0, EntranceMode::FadeIn).validate(5.0).is_err());
    assert!(sched(f64::NAN, 1.0, EntranceMode::FadeIn).validate(5.0).is_err());
    sched(5.0, 1.0, EntranceMode::FadeIn).validate(5.0).unwrap();

    let mut bouncy_reveal = sched(0.0, 1.0, EntranceMode::Reveal);
    bouncy_reveal.ease = Ease::OutElastic;
    let err = bouncy_reveal.validate(5.0).unwrap_err();
    assert!(matches!(err, PromoError::InvalidSchedule(_)));

    let mut early_exit = sched(0.0, 2.0, EntranceMode::FadeIn);
    early_exit.exit = Some(ExitSchedule {
        start: 1.0,
        duration: 0.5,
        ease: Ease::Linear,
    });
    assert!(early_exit.validate(5.0).is_err());
}

#[test]
fn missing_schedule_means_always_settled() {
    assert_eq!(visual_state_at(None, 0.0), Some(VisualState::SETTLED));
    assert_eq!(phase_at(None, 0.0), LayerPhase::Settled);
}

#[test]
fn oscillation_is_a_sine() {
    let o = Oscillation {
        amplitude: 10.0,
        angular_speed: std::f64::consts::FRAC_PI_2,
    };
    assert_eq!(o.value_at(0.0), 0.0);
    assert!((o.value_at(1.0) - 10.0).abs() < 1e-12);
}

#[test]
fn schedule_json_shape() {
    let s: AnimationSchedule = serde_json::from_value(serde_json::json!({
        "start": 0.5,
        "duration": 1.0,
        "ease": "out_cubic",
        "mode": { "type": "slide_in", "dy": 80.0 },
        "exit": { "start": 4.0, "duration": 0.5 }
    }))
    .unwrap();
    assert_eq!(s.mode, EntranceMode::SlideIn { dx: 0.0, dy: 80.0 });
    assert_eq!(s.ease, Ease::OutCubic);
    assert_eq!(s.exit.unwrap().ease, Ease::Linear);
}
