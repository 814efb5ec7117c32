use crate::assets::font::GlyphMask;
use crate::assets::provider::Raster;
use crate::foundation::core::Rgba8;
use crate::foundation::error::PromoResult;
use crate::foundation::math::mul_div255_u8 as mul_div255;

pub(crate) type PremulRgba8 = [u8; 4];

/// Source-over of premultiplied `src` onto `dst`, with `src` scaled by `opacity`.
pub(crate) fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Solid premultiplied `color` scaled by 8-bit `coverage`.
pub(crate) fn tint(color: PremulRgba8, coverage: u8) -> PremulRgba8 {
    let c = u16::from(coverage);
    [
        mul_div255(u16::from(color[0]), c),
        mul_div255(u16::from(color[1]), c),
        mul_div255(u16::from(color[2]), c),
        mul_div255(u16::from(color[3]), c),
    ]
}

/// Compose a text mask into an outlined sprite.
///
/// The outline is the mask dilated over every integer offset within `outline_px` of the
/// origin, painted in `outline`; the fill pass is painted over it in `fill`. The sprite is padded
/// by `ceil(outline_px)` on every side. Returns `None` when the mask has no ink.
pub(crate) fn compose_text_sprite(
    mask: &GlyphMask,
    fill: Rgba8,
    outline: Rgba8,
    outline_px: f32,
) -> PromoResult<Option<(Raster, u32)>> {
    if mask.width == 0 || mask.height == 0 || mask.alpha.iter().all(|&a| a == 0) {
        return Ok(None);
    }
    let pad = if outline_px > 0.0 && outline.a > 0 {
        outline_px.ceil() as u32
    } else {
        0
    };
    let w = mask.width + 2 * pad;
    let h = mask.height + 2 * pad;
    let (wu, hu) = (w as usize, h as usize);

    let mut ring = vec![0u8; wu * hu];
    if pad > 0 {
        let r = pad as i64;
        let r2 = f64::from(outline_px) * f64::from(outline_px);
        for dy in -r..=r {
            for dx in -r..=r {
                if ((dx * dx + dy * dy) as f64) > r2 {
                    continue;
                }
                for my in 0..i64::from(mask.height) {
                    let ty = (my + r + dy) as usize;
                    for mx in 0..i64::from(mask.width) {
                        let a = mask.at(mx, my);
                        if a == 0 {
                            continue;
                        }
                        let tx = (mx + r + dx) as usize;
                        let cov = &mut ring[ty * wu + tx];
                        *cov = (*cov).max(a);
                    }
                }
            }
        }
    }

    let outline_premul = outline.to_premul();
    let fill_premul = fill.to_premul();
    let mut bytes = vec![0u8; wu * hu * 4];
    for y in 0..hu {
        for x in 0..wu {
            let base = tint(outline_premul, ring[y * wu + x]);
            let ink = mask.at(x as i64 - i64::from(pad), y as i64 - i64::from(pad));
            let px = over(base, tint(fill_premul, ink), 1.0);
            let i = (y * wu + x) * 4;
            bytes[i..i + 4].copy_from_slice(&px);
        }
    }

    Ok(Some((Raster::from_premul_rgba8(w, h, bytes)?, pad)))
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/render/composite.rs"]
mod tests;
