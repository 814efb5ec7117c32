use super::*;

#[test]
fn over_opaque_replaces_and_transparent_keeps() {
    let dst = [10, 20, 30, 255];
    assert_eq!(over(dst, [200, 100, 50, 255], 1.0), [200, 100, 50, 255]);
    assert_eq!(over(dst, [0, 0, 0, 0], 1.0), dst);
    assert_eq!(over(dst, [200, 100, 50, 255], 0.0), dst);
}

#[test]
fn over_half_alpha_blends() {
    let out = over([0, 0, 0, 255], [128, 128, 128, 128], 1.0);
    assert_eq!(out[3], 255);
    assert!((127..=129).contains(&out[0]));
}

#[test]
fn tint_scales_all_channels() {
    assert_eq!(tint([255, 128, 0, 255], 255), [255, 128, 0, 255]);
    assert_eq!(tint([255, 128, 0, 255], 0), [0, 0, 0, 0]);
    assert_eq!(tint([255, 255, 255, 255], 128), [128, 128, 128, 128]);
}

fn dot_mask() -> GlyphMask {
    // Single opaque pixel in a 3x3 mask.
    let mut alpha = vec![0u8; 9];
    alpha[4] = 255;
    GlyphMask {
        width: 3,
        height: 3,
        alpha,
    }
}

#[test]
fn sprite_without_outline_is_tinted_mask() {
    let (raster, pad) =
        compose_text_sprite(&dot_mask(), Rgba8::rgb(255, 0, 0), Rgba8::rgb(0, 0, 0), 0.0)
            .unwrap()
            .unwrap();
    assert_eq!(pad, 0);
    assert_eq!((raster.width, raster.height), (3, 3));
    let px = &raster.rgba8_premul[4 * 4..4 * 4 + 4];
    assert_eq!(px, &[255, 0, 0, 255]);
    assert_eq!(&raster.rgba8_premul[0..4], &[0, 0, 0, 0]);
}

#[test]
fn sprite_outline_rings_the_fill() {
    let (raster, pad) = compose_text_sprite(
        &dot_mask(),
        Rgba8::rgb(255, 255, 255),
        Rgba8::rgb(0, 0, 255),
        1.0,
    )
    .unwrap()
    .unwrap();
    assert_eq!(pad, 1);
    assert_eq!((raster.width, raster.height), (5, 5));
    let at = |x: usize, y: usize| {
        let i = (y * 5 + x) * 4;
        [
            raster.rgba8_premul[i],
            raster.rgba8_premul[i + 1],
            raster.rgba8_premul[i + 2],
            raster.rgba8_premul[i + 3],
        ]
    };
    // Fill at the center, outline on the 4-neighbourhood, nothing on the diagonals.
    assert_eq!(at(2, 2), [255, 255, 255, 255]);
    assert_eq!(at(1, 2), [0, 0, 255, 255]);
    assert_eq!(at(2, 3), [0, 0, 255, 255]);
    assert_eq!(at(1, 1), [0, 0, 0, 0]);
}

#[test]
fn blank_mask_has_no_sprite() {
    let mask = GlyphMask {
        width: 4,
        height: 2,
        alpha: vec![0; 8],
    };
    assert!(
        compose_text_sprite(&mask, Rgba8::rgb(1, 1, 1), Rgba8::rgb(0, 0, 0), 2.0)
            .unwrap()
            .is_none()
    );
}
