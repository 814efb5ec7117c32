use kurbo::Shape as _;

use crate::animation::schedule::VisualState;
use crate::foundation::core::{Affine, BezPath, FrameIndex, Point, Rect, Vec2};
use crate::foundation::error::{PromoError, PromoResult};
use crate::render::frame::{Frame, RasterPaint, affine_to_cpu, bezpath_to_cpu};
use crate::scene::model::{ImageLayer, Layer, Scene, Shape, ShapeLayer, TextLayer};

const PATH_TOLERANCE: f64 = 0.1;

/// Render the frame at `t` seconds.
///
/// Pure: the same scene and `t` always yield byte-identical frames. Callers rendering many
/// frames should keep a [`FrameRenderer`] to reuse its raster context.
pub fn render(scene: &Scene, t: f64) -> PromoResult<Frame> {
    FrameRenderer::new().render(scene, t)
}

/// Reusable CPU compositor.
///
/// Holds only a scratch raster context; output never depends on what was rendered before.
#[derive(Default)]
pub struct FrameRenderer {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("ctx", &self.ctx.as_ref().map(|c| (c.width(), c.height())))
            .finish()
    }
}

impl FrameRenderer {
    /// Renderer with no cached context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the frame at `frame`, i.e. at `t = frame * fps.den / fps.num`.
    pub fn render_frame(&mut self, scene: &Scene, frame: FrameIndex) -> PromoResult<Frame> {
        self.render(scene, scene.time_of(frame))
    }

    /// Render the frame at `t` seconds; `t` must be finite and `>= 0`.
    pub fn render(&mut self, scene: &Scene, t: f64) -> PromoResult<Frame> {
        if !t.is_finite() || t < 0.0 {
            return Err(PromoError::validation(format!(
                "render time must be finite and >= 0 (got {t})"
            )));
        }
        let canvas = scene.canvas();
        let w: u16 = canvas
            .width
            .try_into()
            .map_err(|_| PromoError::render("canvas width exceeds u16"))?;
        let h: u16 = canvas
            .height
            .try_into()
            .map_err(|_| PromoError::render("canvas height exceeds u16"))?;

        self.with_ctx_mut(w, h, |ctx| {
            let full = Rect::new(0.0, 0.0, f64::from(w), f64::from(h));
            if let Some(c) = scene.clear() {
                ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
                ctx.fill_rect(&rect_to_cpu(full));
            }
            for layer in scene.layers() {
                draw_layer(ctx, layer, t, full);
            }
            ctx.flush();
            let mut pixmap = vello_cpu::Pixmap::new(w, h);
            ctx.render_to_pixmap(&mut pixmap);
            Ok(Frame {
                width: canvas.width,
                height: canvas.height,
                data: pixmap.data_as_u8_slice().to_vec(),
                premultiplied: true,
            })
        })
    }

    fn with_ctx_mut<R>(
        &mut self,
        width: u16,
        height: u16,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> PromoResult<R>,
    ) -> PromoResult<R> {
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        let out = f(&mut ctx)?;
        self.ctx = Some(ctx);
        Ok(out)
    }
}

fn draw_layer(ctx: &mut vello_cpu::RenderContext, layer: &Layer, t: f64, full: Rect) {
    let Some(state) = layer.visual_state(t) else {
        return;
    };
    ctx.set_blend_mode(vello_cpu::peniko::BlendMode::default());
    ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);

    match layer {
        Layer::Background(bg) => {
            ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
            ctx.set_paint(bg.paint.paint.clone());
            ctx.fill_rect(&rect_to_cpu(full));
        }
        Layer::StaticImage(img) => draw_image(ctx, img, &state, t),
        Layer::AnimatedText(text) => draw_text(ctx, text, &state),
        Layer::ShapeDecoration(shape) => draw_shape(ctx, shape, &state, t),
    }
}

fn draw_image(ctx: &mut vello_cpu::RenderContext, img: &ImageLayer, state: &VisualState, t: f64) {
    if state.scale <= 0.0 {
        return;
    }
    let mut center = img.center + state.offset;
    if let Some(float) = img.float {
        center.y += float.value_at(t);
    }
    let (dw, dh) = (img.width * state.scale, img.height * state.scale);
    let tr = Affine::translate((center.x - dw / 2.0, center.y - dh / 2.0))
        * Affine::scale_non_uniform(
            dw / f64::from(img.paint.width),
            dh / f64::from(img.paint.height),
        );

    with_opacity(ctx, img.opacity * state.opacity, |ctx| {
        paint_raster(ctx, &img.paint, tr);
    });
}

fn draw_text(ctx: &mut vello_cpu::RenderContext, text: &TextLayer, state: &VisualState) {
    if state.scale <= 0.0 {
        return;
    }
    let revealed = text.revealed_for(state);
    if revealed == 0 {
        return;
    }
    let base = Affine::translate(state.offset) * scale_about(text.bounds.center(), state.scale);

    with_opacity(ctx, text.opacity * state.opacity, |ctx| {
        for line in &text.lines {
            let visible = revealed.saturating_sub(line.char_start).min(line.char_len);
            let Some(sprite) = line.sprite_for(visible) else {
                continue;
            };
            // Whole-pixel placement keeps settled text crisp.
            let origin = Point::new(line.origin.x.round(), line.origin.y.round()) + sprite.offset;
            paint_raster(ctx, &sprite.paint, base * Affine::translate(origin.to_vec2()));
        }
    });
}

fn draw_shape(ctx: &mut vello_cpu::RenderContext, layer: &ShapeLayer, state: &VisualState, t: f64) {
    let pulse = layer.pulsate.map_or(1.0, |o| 1.0 + o.value_at(t));
    let scale = state.scale * pulse;
    if scale <= 0.0 {
        return;
    }
    let path = shape_path(&layer.shape, scale);

    with_opacity(ctx, layer.opacity * state.opacity, |ctx| {
        ctx.set_transform(affine_to_cpu(Affine::translate(state.offset)));
        if let Some(c) = layer.fill {
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_path(&bezpath_to_cpu(&path));
        }
        if let Some((c, width)) = layer.stroke {
            let outline = kurbo::stroke(
                path.elements().iter().copied(),
                &kurbo::Stroke::new(width),
                &kurbo::StrokeOpts::default(),
                PATH_TOLERANCE,
            );
            ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
            ctx.fill_path(&bezpath_to_cpu(&outline));
        }
    });
}

/// Outline of `shape` with its radii (or size) multiplied by `scale` about its center.
pub(crate) fn shape_path(shape: &Shape, scale: f64) -> BezPath {
    match *shape {
        Shape::Ellipse { center, radii } => {
            kurbo::Ellipse::new(center, radii * scale, 0.0).to_path(PATH_TOLERANCE)
        }
        Shape::Arc {
            center,
            radii,
            start_angle,
            sweep_angle,
        } => kurbo::Arc::new(center, radii * scale, start_angle, sweep_angle, 0.0)
            .to_path(PATH_TOLERANCE),
        Shape::RoundedRect {
            center,
            size,
            radius,
        } => {
            let size = size * scale;
            let r = (radius * scale).min(size.x / 2.0).min(size.y / 2.0).max(0.0);
            kurbo::RoundedRect::from_rect(Rect::from_center_size(center, (size.x, size.y)), r)
                .to_path(PATH_TOLERANCE)
        }
    }
}

fn paint_raster(ctx: &mut vello_cpu::RenderContext, paint: &RasterPaint, tr: Affine) {
    ctx.set_transform(affine_to_cpu(tr));
    ctx.set_paint(paint.paint.clone());
    ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
        0.0,
        0.0,
        f64::from(paint.width),
        f64::from(paint.height),
    ));
}

fn with_opacity(
    ctx: &mut vello_cpu::RenderContext,
    opacity: f64,
    draw: impl FnOnce(&mut vello_cpu::RenderContext),
) {
    let opacity = opacity.clamp(0.0, 1.0) as f32;
    if opacity <= 0.0 {
        return;
    }
    if opacity < 1.0 {
        ctx.push_opacity_layer(opacity);
    }
    draw(ctx);
    if opacity < 1.0 {
        ctx.pop_layer();
    }
}

fn scale_about(center: Point, scale: f64) -> Affine {
    if scale == 1.0 {
        return Affine::IDENTITY;
    }
    let c: Vec2 = center.to_vec2();
    Affine::translate(c) * Affine::scale(scale) * Affine::translate(-c)
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
