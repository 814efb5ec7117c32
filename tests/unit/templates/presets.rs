use super::*;
use crate::assets::font::FontLibrary;
use crate::assets::provider::{MemoryAssets, Raster};
use crate::render::compositor::render;
use crate::scene::model::{Layer, Scene};

fn canvas() -> Canvas {
    Canvas {
        width: 108,
        height: 192,
    }
}

fn fps() -> Fps {
    Fps::new(10, 1).unwrap()
}

fn full_request() -> AdRequest {
    AdRequest {
        hook: "Fresh beans".to_string(),
        price: Some("$9.99".to_string()),
        contact: Some("call 555-0100".to_string()),
        ad_copy: Some("Roasted this morning, delivered by noon.".to_string()),
        product_asset: Some("product.png".to_string()),
        logo_asset: Some("logo.png".to_string()),
        audio: Some("music/upbeat.mp3".to_string()),
    }
}

fn assets() -> MemoryAssets {
    let mut assets = MemoryAssets::new();
    assets.insert(
        "product.png",
        Raster::solid(40, 30, Rgba8::rgb(200, 120, 40)).unwrap(),
    );
    assets.insert("logo.png", Raster::solid(20, 10, Rgba8::rgb(255, 255, 255)).unwrap());
    assets
}

#[test]
fn presets_are_named_in_order() {
    let names: Vec<&str> = Template::presets().iter().map(|t| t.name).collect();
    assert_eq!(names, PRESET_NAMES);
    assert_eq!(Template::by_name("Luxury").unwrap(), Template::luxury());
    assert_eq!(Template::by_name(" festive ").unwrap().decoration, Decoration::Confetti);
    assert!(Template::by_name("brutalist").is_none());
}

#[test]
fn every_preset_builds_and_renders() {
    for template in Template::presets() {
        let def = template
            .scene_def(&full_request(), canvas(), fps(), 3.0)
            .unwrap();
        assert_eq!(def.units, Units::Fraction);
        assert_eq!(def.audio.as_deref(), Some("music/upbeat.mp3"));

        let scene = Scene::build(&def, &assets(), &FontLibrary::builtin()).unwrap();
        assert!(scene.warnings().is_empty(), "{}", template.name);
        let texts = scene
            .layers()
            .iter()
            .filter(|l| matches!(l, Layer::AnimatedText(_)))
            .count();
        assert_eq!(texts, 4, "{}", template.name);

        let start = render(&scene, 0.0).unwrap();
        let settled = render(&scene, 2.9).unwrap();
        assert_eq!((settled.width, settled.height), (108, 192));
        assert_ne!(start.data, settled.data, "{}", template.name);
    }
}

#[test]
fn optional_fields_are_skipped_when_blank() {
    let req = AdRequest {
        price: Some("   ".to_string()),
        ..AdRequest::new("Open today")
    };
    let def = Template::minimal()
        .scene_def(&req, canvas(), fps(), 2.0)
        .unwrap();
    let texts = def
        .layers
        .iter()
        .filter(|l| matches!(l, LayerDef::Text(_)))
        .count();
    let images = def
        .layers
        .iter()
        .filter(|l| matches!(l, LayerDef::Image(_)))
        .count();
    assert_eq!((texts, images), (1, 0));
    assert!(def.audio.is_none());
}

#[test]
fn headline_follows_template_animation() {
    let def = Template::modern()
        .scene_def(&AdRequest::new("SALE"), canvas(), fps(), 2.0)
        .unwrap();
    let headline = def
        .layers
        .iter()
        .find_map(|l| match l {
            LayerDef::Text(t) => Some(t),
            _ => None,
        })
        .unwrap();
    let schedule = headline.schedule.unwrap();
    assert_eq!(schedule.mode, EntranceMode::Reveal);
    assert!((schedule.start - 0.2).abs() < 1e-12);
    assert!((schedule.duration - 0.4).abs() < 1e-12);
}

#[test]
fn rejects_invalid_requests() {
    let t = Template::modern();
    assert!(t.scene_def(&AdRequest::new("  "), canvas(), fps(), 2.0).is_err());
    assert!(
        t.scene_def(&AdRequest::new("hi"), canvas(), fps(), 0.0)
            .is_err()
    );
    assert!(
        t.scene_def(&AdRequest::new("hi"), canvas(), fps(), f64::NAN)
            .is_err()
    );
}

#[test]
fn pick_template_is_deterministic_and_seeded() {
    assert_eq!(pick_template("SALE", 7), pick_template("SALE", 7));
    let distinct: std::collections::BTreeSet<&str> =
        (0..64).map(|seed| pick_template("SALE", seed).name).collect();
    assert!(distinct.len() > 1, "{distinct:?}");
}
