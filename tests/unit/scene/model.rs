use super::*;
use crate::animation::schedule::{EntranceMode, ExitSchedule};
use crate::assets::font::FontLibrary;
use crate::assets::provider::MemoryAssets;
use crate::scene::def::SceneDef;

fn sale_scene(exit: bool) -> Scene {
    let exit = if exit {
        r#","exit":{"start":2,"duration":1}"#
    } else {
        ""
    };
    let json = format!(
        r#"{{"canvas":{{"width":64,"height":16}},"fps":{{"num":10}},"duration_secs":3,
            "layers":[{{"kind":"text","text":"SALE","x":32,"y":4,"size_px":8,
              "schedule":{{"start":0,"duration":1,"mode":{{"type":"reveal"}}{exit}}}}}]}}"#
    );
    let def = SceneDef::from_json_str(&json).unwrap();
    Scene::build(&def, &MemoryAssets::new(), &FontLibrary::builtin()).unwrap()
}

fn text_layer(scene: &Scene) -> &TextLayer {
    match &scene.layers()[0] {
        Layer::AnimatedText(t) => t,
        other => panic!("expected text, got {}", other.kind_name()),
    }
}

#[test]
fn sale_reveal_at_ten_fps() {
    let scene = sale_scene(false);
    let text = text_layer(&scene);
    let at = |f: u64| text.visible_text(scene.time_of(FrameIndex(f)));
    assert_eq!(at(0), "");
    assert_eq!(at(5), "SA");
    assert_eq!(at(10), "SALE");
    assert_eq!(at(25), "SALE");
}

#[test]
fn reveal_is_monotonic_until_exit() {
    let scene = sale_scene(true);
    let text = text_layer(&scene);
    let mut prev = String::new();
    for f in 0..20 {
        let cur = text.visible_text(scene.time_of(FrameIndex(f)));
        assert!(cur.starts_with(&prev), "frame {f}: {prev:?} -> {cur:?}");
        prev = cur;
    }
    // Exit mirrors the entrance.
    assert_eq!(text.visible_text(2.5), "SA");
    assert_eq!(text.revealed_chars(3.0), None);
}

#[test]
fn scene_accessors() {
    let scene = sale_scene(false);
    assert_eq!(scene.total_frames(), 30);
    assert_eq!(scene.canvas().width, 64);
    assert_eq!(scene.fps().num, 10);
    assert_eq!(scene.duration_secs(), 3.0);
    assert!(scene.clear().is_none());
    assert!(scene.audio().is_none());
    assert!(scene.require_complete().is_ok());
    assert_eq!(scene.layers()[0].kind_name(), "text");
}

#[test]
fn layer_without_schedule_is_always_settled() {
    let scene = sale_scene(false);
    let mut text = text_layer(&scene).clone();
    text.schedule = None;
    let layer = Layer::AnimatedText(text);
    assert_eq!(layer.phase(0.0), LayerPhase::Settled);
    assert_eq!(layer.visual_state(0.0), Some(VisualState::SETTLED));
}

#[test]
fn warning_display_names_the_asset() {
    let w = SceneWarning::MissingAsset {
        layer: 2,
        asset: "logo.png".to_owned(),
    };
    assert_eq!(w.to_string(), "layer 2: asset 'logo.png' not found, layer skipped");
}

#[test]
fn shape_center_and_openness() {
    let arc = Shape::Arc {
        center: Point::new(1.0, 2.0),
        radii: Vec2::new(3.0, 3.0),
        start_angle: 0.0,
        sweep_angle: 1.0,
    };
    assert_eq!(arc.center(), Point::new(1.0, 2.0));
    assert!(arc.is_open());
    let ellipse = Shape::Ellipse {
        center: Point::ZERO,
        radii: Vec2::new(1.0, 1.0),
    };
    assert!(!ellipse.is_open());
}

#[test]
fn schedule_accessor_matches_layer_kind() {
    let sched = AnimationSchedule {
        start: 0.0,
        duration: 1.0,
        ease: Default::default(),
        mode: EntranceMode::FadeIn,
        exit: Some(ExitSchedule {
            start: 2.0,
            duration: 0.0,
            ease: Default::default(),
        }),
    };
    let shape = Layer::ShapeDecoration(ShapeLayer {
        shape: Shape::Ellipse {
            center: Point::ZERO,
            radii: Vec2::new(1.0, 1.0),
        },
        fill: None,
        stroke: None,
        pulsate: None,
        opacity: 1.0,
        schedule: Some(sched),
    });
    assert_eq!(shape.schedule(), Some(&sched));
    assert_eq!(shape.phase(2.0), LayerPhase::Gone);
}
