use std::io::Cursor;

use super::*;

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "promoframe_{tag}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn normalize_path_slash_normalization() {
    assert_eq!(normalize_rel_path("a/b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("./a//b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("/abs.png").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn raster_constructors_check_lengths() {
    assert!(Raster::from_premul_rgba8(2, 2, vec![0; 15]).is_err());
    assert!(Raster::from_premul_rgba8(0, 2, vec![]).is_err());
    let solid = Raster::solid(2, 1, Rgba8::rgba(255, 0, 0, 128)).unwrap();
    assert_eq!(solid.rgba8_premul.as_slice(), &[128, 0, 0, 128, 128, 0, 0, 128]);
}

#[test]
fn memory_assets_signal_not_found() {
    let mut assets = MemoryAssets::new();
    assert!(assets.is_empty());
    assets.insert("logo", Raster::solid(1, 1, Rgba8::rgb(1, 2, 3)).unwrap());
    assert_eq!(assets.len(), 1);
    assert!(assets.get_raster("logo").is_some());
    assert!(assets.get_raster("product").is_none());

    let img = image::RgbaImage::from_raw(1, 1, vec![255, 0, 0, 128]).unwrap();
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();
    assets.insert_encoded("badge", &png).unwrap();
    let badge = assets.get_raster("badge").unwrap();
    assert_eq!(badge.rgba8_premul.as_slice(), &[128, 0, 0, 128]);
    assert!(assets.insert_encoded("junk", b"nope").is_err());
}

#[test]
fn dir_assets_loads_caches_and_degrades() {
    let dir = temp_dir("dir_assets");
    let img = image::RgbaImage::from_raw(2, 1, vec![1, 2, 3, 255, 4, 5, 6, 255]).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    std::fs::write(dir.join("logo.png"), &buf).unwrap();
    std::fs::write(dir.join("broken.png"), b"nope").unwrap();

    let assets = DirAssets::new(&dir);
    let logo = assets.get_raster("logo.png").unwrap();
    assert_eq!((logo.width, logo.height), (2, 1));
    let again = assets.get_raster("./logo.png");
    assert!(again.is_some());
    assert!(Arc::ptr_eq(&logo, &assets.get_raster("logo.png").unwrap()));

    assert!(assets.get_raster("broken.png").is_none());
    assert!(assets.get_raster("missing.png").is_none());
    assert!(assets.get_raster("../escape.png").is_none());

    std::fs::remove_dir_all(&dir).ok();
}
