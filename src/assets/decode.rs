use anyhow::Context;

use crate::assets::provider::Raster;
use crate::foundation::error::{PromoError, PromoResult};

/// Decode PNG/JPEG/WebP/... bytes into a premultiplied raster, keeping any alpha channel.
pub fn decode_image(bytes: &[u8]) -> PromoResult<Raster> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Raster::from_straight_rgba8(width, height, rgba.into_raw())
}

/// Parse an SVG document and rasterize it at its intrinsic size.
pub fn decode_svg(bytes: &[u8]) -> PromoResult<Raster> {
    let opts = usvg::Options::default();
    let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;

    let size = tree.size();
    let to_px = |v: f32| -> PromoResult<u32> {
        if !v.is_finite() || v <= 0.0 {
            return Err(PromoError::validation("svg has invalid width/height"));
        }
        Ok((v.ceil() as u32).max(1))
    };
    let width = to_px(size.width())?;
    let height = to_px(size.height())?;

    const MAX_DIM: u32 = 8_192;
    if width > MAX_DIM || height > MAX_DIM {
        return Err(PromoError::validation(format!(
            "svg raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| PromoError::render("failed to allocate svg pixmap"))?;
    let sx = (width as f32) / size.width();
    let sy = (height as f32) / size.height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    // tiny-skia pixmaps are already premultiplied.
    Raster::from_premul_rgba8(width, height, pixmap.data().to_vec())
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

pub(crate) fn unpremultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 || a == 255 {
            continue;
        }
        for c in &mut px[..3] {
            *c = ((*c as u16 * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
