use std::io::Cursor;

use super::*;

fn png_bytes(w: u32, h: u32, rgba: Vec<u8>) -> Vec<u8> {
    let img = image::RgbaImage::from_raw(w, h, rgba).unwrap();
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn decode_image_png_dimensions_and_premul() {
    let buf = png_bytes(1, 1, vec![100u8, 50u8, 200u8, 128u8]);
    let raster = decode_image(&buf).unwrap();
    assert_eq!(raster.width, 1);
    assert_eq!(raster.height, 1);
    assert_eq!(
        raster.rgba8_premul.as_slice(),
        &[
            ((100u16 * 128 + 127) / 255) as u8,
            ((50u16 * 128 + 127) / 255) as u8,
            ((200u16 * 128 + 127) / 255) as u8,
            128u8
        ]
    );
}

#[test]
fn decode_image_rejects_garbage() {
    assert!(decode_image(b"definitely not an image").is_err());
}

#[test]
fn decode_svg_rasterizes_at_intrinsic_size() {
    let svg = br##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="2">
        <rect x="0" y="0" width="4" height="2" fill="#ff0000"/>
    </svg>"##;
    let raster = decode_svg(svg).unwrap();
    assert_eq!((raster.width, raster.height), (4, 2));
    assert_eq!(&raster.rgba8_premul[0..4], &[255, 0, 0, 255]);

    assert!(decode_svg(b"<svg").is_err());
}

#[test]
fn unpremultiply_inverts_premultiply_for_opaque_and_clear() {
    let mut px = vec![10, 20, 30, 255, 9, 9, 9, 0];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);
    unpremultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![10, 20, 30, 255, 0, 0, 0, 0]);

    let mut half = vec![64, 32, 0, 128];
    unpremultiply_rgba8_in_place(&mut half);
    assert_eq!(half, vec![128, 64, 0, 128]);
}
