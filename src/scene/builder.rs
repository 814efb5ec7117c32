use crate::animation::schedule::{AnimationSchedule, EntranceMode, Oscillation};
use crate::assets::font::{FontHandle, FontProvider};
use crate::assets::provider::{AssetProvider, Raster};
use crate::foundation::core::{Canvas, Fps, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{PromoError, PromoResult};
use crate::render::composite::compose_text_sprite;
use crate::render::frame::RasterPaint;
use crate::scene::def::{
    BackgroundDef, GradientDirection, ImageDef, LayerDef, SceneDef, ShapeDef, ShapeLayerDef,
    TextAlign, TextDef, Units,
};
use crate::scene::model::{
    BackgroundLayer, ImageLayer, Layer, LineSprite, Scene, SceneWarning, Shape, ShapeLayer,
    TextLayer, TextLine,
};
use crate::text::wrap::{WrappedLine, wrap_text};

impl Scene {
    /// Validate `def`, resolve its assets and fonts, and build the immutable scene.
    ///
    /// Image layers whose asset the provider cannot resolve are skipped and reported through
    /// [`Scene::warnings`]. Every other problem (bad geometry, invalid schedules, font failures)
    /// is an error, so a built scene always renders.
    #[tracing::instrument(skip_all, fields(layers = def.layers.len()))]
    pub fn build(
        def: &SceneDef,
        assets: &dyn AssetProvider,
        fonts: &dyn FontProvider,
    ) -> PromoResult<Self> {
        def.canvas.validate()?;
        let fps = Fps::new(def.fps.num, def.fps.den)?;
        if !def.duration_secs.is_finite() || def.duration_secs <= 0.0 {
            return Err(PromoError::validation(
                "scene duration_secs must be finite and > 0",
            ));
        }

        let ctx = BuildCtx {
            units: def.units,
            canvas: def.canvas,
            duration_secs: def.duration_secs,
        };

        let mut layers = Vec::with_capacity(def.layers.len());
        let mut warnings = Vec::new();
        for (i, layer) in def.layers.iter().enumerate() {
            let built = match layer {
                LayerDef::Background(bg) => Some(Layer::Background(ctx.background(bg)?)),
                LayerDef::Image(img) => {
                    // Validated before the lookup so a skipped layer still fails fast.
                    let placement = ctx.image_placement(img)?;
                    match assets.get_raster(&img.asset) {
                        Some(raster) => {
                            Some(Layer::StaticImage(ctx.image(img, placement, raster)?))
                        }
                        None => {
                            tracing::warn!(
                                layer = i,
                                asset = %img.asset,
                                "asset not found, skipping layer"
                            );
                            warnings.push(SceneWarning::MissingAsset {
                                layer: i,
                                asset: img.asset.clone(),
                            });
                            None
                        }
                    }
                }
                LayerDef::Text(text) => Some(Layer::AnimatedText(ctx.text(text, fonts)?)),
                LayerDef::Shape(shape) => Some(Layer::ShapeDecoration(ctx.shape(shape)?)),
            };
            if let Some(layer) = built {
                tracing::debug!(layer = i, kind = layer.kind_name(), "layer resolved");
                layers.push(layer);
            }
        }

        Ok(Self {
            canvas: def.canvas,
            fps,
            duration_secs: def.duration_secs,
            clear: def.clear.map(|c| c.rgba8()),
            audio: def.audio.clone(),
            layers,
            warnings,
        })
    }
}

/// Image parameters that do not depend on the raster.
struct ImagePlacement {
    center: Point,
    opacity: f64,
    schedule: Option<AnimationSchedule>,
    float: Option<Oscillation>,
}

struct BuildCtx {
    units: Units,
    canvas: Canvas,
    duration_secs: f64,
}

impl BuildCtx {
    fn sx(&self) -> f64 {
        match self.units {
            Units::Pixels => 1.0,
            Units::Fraction => f64::from(self.canvas.width),
        }
    }

    fn sy(&self) -> f64 {
        match self.units {
            Units::Pixels => 1.0,
            Units::Fraction => f64::from(self.canvas.height),
        }
    }

    fn point(&self, x: f64, y: f64, what: &str) -> PromoResult<Point> {
        if !x.is_finite() || !y.is_finite() {
            return Err(PromoError::validation(format!("{what} position must be finite")));
        }
        Ok(Point::new(x * self.sx(), y * self.sy()))
    }

    fn schedule(
        &self,
        schedule: Option<AnimationSchedule>,
    ) -> PromoResult<Option<AnimationSchedule>> {
        let Some(mut s) = schedule else {
            return Ok(None);
        };
        s.validate(self.duration_secs)?;
        if let EntranceMode::SlideIn { dx, dy } = s.mode {
            s.mode = EntranceMode::SlideIn {
                dx: dx * self.sx(),
                dy: dy * self.sy(),
            };
        }
        Ok(Some(s))
    }

    fn background(&self, def: &BackgroundDef) -> PromoResult<BackgroundLayer> {
        let (from, to) = (def.from.rgba8(), def.to.rgba8());
        let raster = gradient_raster(self.canvas, from, to, def.direction)?;
        Ok(BackgroundLayer {
            from,
            to,
            direction: def.direction,
            paint: RasterPaint::from_raster(&raster)?,
        })
    }

    fn image_placement(&self, def: &ImageDef) -> PromoResult<ImagePlacement> {
        let center = self.point(def.x, def.y, "image")?;
        for side in [def.width, def.height].into_iter().flatten() {
            if !side.is_finite() || side <= 0.0 {
                return Err(PromoError::validation(format!(
                    "image '{}' size must be finite and > 0",
                    def.asset
                )));
            }
        }
        let float = match def.float {
            Some(osc) => {
                osc.validate("image float")?;
                Some(Oscillation {
                    amplitude: osc.amplitude * self.sy(),
                    ..osc
                })
            }
            None => None,
        };
        Ok(ImagePlacement {
            center,
            opacity: validate_opacity(def.opacity, "image")?,
            schedule: self.schedule(def.schedule)?,
            float,
        })
    }

    fn image(
        &self,
        def: &ImageDef,
        placement: ImagePlacement,
        raster: std::sync::Arc<Raster>,
    ) -> PromoResult<ImageLayer> {
        let (rw, rh) = (f64::from(raster.width), f64::from(raster.height));
        let (width, height) = match (def.width, def.height) {
            (Some(w), Some(h)) => (w * self.sx(), h * self.sy()),
            (Some(w), None) => {
                let w = w * self.sx();
                (w, w * rh / rw)
            }
            (None, Some(h)) => {
                let h = h * self.sy();
                (h * rw / rh, h)
            }
            (None, None) => (rw, rh),
        };
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(PromoError::validation(format!(
                "image '{}' size must be finite and > 0",
                def.asset
            )));
        }

        Ok(ImageLayer {
            asset: def.asset.clone(),
            paint: RasterPaint::from_raster(&raster)?,
            raster,
            center: placement.center,
            width,
            height,
            opacity: placement.opacity,
            schedule: placement.schedule,
            float: placement.float,
        })
    }

    fn text(&self, def: &TextDef, fonts: &dyn FontProvider) -> PromoResult<TextLayer> {
        if !def.size_px.is_finite() || def.size_px <= 0.0 {
            return Err(PromoError::validation("text size_px must be finite and > 0"));
        }
        if !def.outline_px.is_finite() || def.outline_px < 0.0 {
            return Err(PromoError::validation(
                "text outline_px must be finite and >= 0",
            ));
        }
        if !def.line_spacing.is_finite() || def.line_spacing <= 0.0 {
            return Err(PromoError::validation(
                "text line_spacing must be finite and > 0",
            ));
        }
        let anchor = self.point(def.x, def.y, "text")?;
        let schedule = self.schedule(def.schedule)?;
        let opacity = validate_opacity(def.opacity, "text")?;

        let max_width = match def.max_width {
            Some(w) => w * self.sx(),
            None => {
                let room = default_wrap_width(self.canvas, anchor.x, def.align, def.outline_px);
                if room <= 0.0 {
                    return Err(PromoError::validation(format!(
                        "text anchor x={} leaves no room on the canvas, set max_width",
                        anchor.x
                    )));
                }
                room
            }
        };
        if !max_width.is_finite() || max_width <= 0.0 {
            return Err(PromoError::validation(
                "text max_width must be finite and > 0",
            ));
        }

        let font = fonts.get_font(def.size_px);
        let wrapped = wrap_text(&def.text, max_width as f32, font.as_ref())?;
        let line_height = f64::from(font.measure("Hg")?.1.max(1.0));
        let advance = line_height * f64::from(def.line_spacing);
        let with_prefixes = schedule.is_some_and(|s| s.mode == EntranceMode::Reveal);

        let color = def.color.rgba8();
        let outline_color = def.outline_color.rgba8();
        let style = SpriteStyle {
            font: font.as_ref(),
            color,
            outline_color,
            outline_px: def.outline_px,
        };

        let mut lines = Vec::with_capacity(wrapped.len());
        let mut bounds: Option<Rect> = None;
        for (i, wl) in wrapped.into_iter().enumerate() {
            let width = f64::from(font.measure(&wl.text)?.0);
            let x = match def.align {
                TextAlign::Left => anchor.x,
                TextAlign::Center => anchor.x - width / 2.0,
                TextAlign::Right => anchor.x - width,
            };
            let origin = Point::new(x, anchor.y + advance * i as f64);
            let line = style.line(wl, origin, width, line_height, with_prefixes)?;
            let rect = Rect::from_origin_size(line.origin, (line.width, line.height));
            bounds = Some(bounds.map_or(rect, |b| b.union(rect)));
            lines.push(line);
        }

        Ok(TextLayer {
            char_count: def.text.chars().count(),
            text: def.text.clone(),
            size_px: def.size_px,
            color,
            outline_color,
            outline_px: def.outline_px,
            align: def.align,
            opacity,
            schedule,
            lines,
            bounds: bounds.unwrap_or_else(|| Rect::from_origin_size(anchor, (0.0, 0.0))),
        })
    }

    fn shape(&self, def: &ShapeLayerDef) -> PromoResult<ShapeLayer> {
        let (sx, sy) = (self.sx(), self.sy());
        let radius = |v: f64, what: &str| -> PromoResult<f64> {
            let r = v * sx;
            if !r.is_finite() || r < 0.0 {
                return Err(PromoError::validation(format!(
                    "shape {what} must be finite and >= 0"
                )));
            }
            Ok(r)
        };

        let shape = match def.shape {
            ShapeDef::Ellipse { cx, cy, rx, ry } => Shape::Ellipse {
                center: self.point(cx, cy, "shape")?,
                radii: Vec2::new(radius(rx, "rx")?, radius(ry, "ry")?),
            },
            ShapeDef::Arc {
                cx,
                cy,
                rx,
                ry,
                start_deg,
                sweep_deg,
            } => {
                if !start_deg.is_finite() || !sweep_deg.is_finite() {
                    return Err(PromoError::validation("arc angles must be finite"));
                }
                Shape::Arc {
                    center: self.point(cx, cy, "shape")?,
                    radii: Vec2::new(radius(rx, "rx")?, radius(ry, "ry")?),
                    start_angle: start_deg.to_radians(),
                    sweep_angle: sweep_deg.to_radians(),
                }
            }
            ShapeDef::RoundedRect {
                cx,
                cy,
                width,
                height,
                radius: r,
            } => {
                let size = Vec2::new(width * sx, height * sy);
                if !size.x.is_finite() || !size.y.is_finite() || size.x < 0.0 || size.y < 0.0 {
                    return Err(PromoError::validation(
                        "rounded_rect size must be finite and >= 0",
                    ));
                }
                Shape::RoundedRect {
                    center: self.point(cx, cy, "shape")?,
                    size,
                    radius: radius(r, "radius")?,
                }
            }
        };

        if shape.is_open() && def.fill.is_some() {
            return Err(PromoError::validation("arc shapes cannot be filled"));
        }
        let stroke = match def.stroke {
            Some(s) if !s.width.is_finite() || s.width <= 0.0 => {
                return Err(PromoError::validation(
                    "shape stroke width must be finite and > 0",
                ));
            }
            Some(s) => Some((s.color.rgba8(), s.width)),
            None => None,
        };
        if let Some(osc) = def.pulsate {
            osc.validate("shape pulsate")?;
        }

        Ok(ShapeLayer {
            shape,
            fill: def.fill.map(|c| c.rgba8()),
            stroke,
            pulsate: def.pulsate,
            opacity: validate_opacity(def.opacity, "shape")?,
            schedule: self.schedule(def.schedule)?,
        })
    }
}

struct SpriteStyle<'a> {
    font: &'a dyn FontHandle,
    color: Rgba8,
    outline_color: Rgba8,
    outline_px: f32,
}

impl SpriteStyle<'_> {
    fn sprite(&self, text: &str) -> PromoResult<Option<LineSprite>> {
        let mask = self.font.rasterize(text)?;
        let Some((raster, pad)) =
            compose_text_sprite(&mask, self.color, self.outline_color, self.outline_px)?
        else {
            return Ok(None);
        };
        Ok(Some(LineSprite {
            paint: RasterPaint::from_raster(&raster)?,
            offset: Vec2::new(-f64::from(pad), -f64::from(pad)),
        }))
    }

    fn line(
        &self,
        wl: WrappedLine,
        origin: Point,
        width: f64,
        height: f64,
        with_prefixes: bool,
    ) -> PromoResult<TextLine> {
        let full = self.sprite(&wl.text)?;
        let mut prefixes = Vec::new();
        if with_prefixes && wl.char_len > 1 {
            prefixes.push(None);
            let mut prefix = String::new();
            for c in wl.text.chars().take(wl.char_len - 1) {
                prefix.push(c);
                prefixes.push(self.sprite(&prefix)?);
            }
        }
        Ok(TextLine {
            text: wl.text,
            char_start: wl.char_start,
            char_len: wl.char_len,
            origin,
            width,
            height,
            full,
            prefixes,
        })
    }
}

/// Widest line that stays on the canvas from `x` with `align`, outline ring included.
fn default_wrap_width(canvas: Canvas, x: f64, align: TextAlign, outline_px: f32) -> f64 {
    let w = f64::from(canvas.width);
    let ring = f64::from(outline_px).ceil();
    match align {
        TextAlign::Left => w - x - ring,
        TextAlign::Right => x - ring,
        TextAlign::Center => 2.0 * (x.min(w - x) - ring),
    }
}

fn validate_opacity(opacity: f64, what: &str) -> PromoResult<f64> {
    if !opacity.is_finite() || !(0.0..=1.0).contains(&opacity) {
        return Err(PromoError::validation(format!(
            "{what} opacity must be within [0, 1]"
        )));
    }
    Ok(opacity)
}

/// Premultiplied gradient covering the canvas; `t = i / (n - 1)` along the axis.
pub(crate) fn gradient_raster(
    canvas: Canvas,
    from: Rgba8,
    to: Rgba8,
    direction: GradientDirection,
) -> PromoResult<Raster> {
    let (w, h) = (canvas.width, canvas.height);
    let frac = |i: u32, n: u32| -> f64 {
        if n <= 1 {
            0.0
        } else {
            f64::from(i) / f64::from(n - 1)
        }
    };

    let mut bytes = vec![0u8; (w as usize).saturating_mul(h as usize).saturating_mul(4)];
    for y in 0..h {
        let row = (y as usize) * (w as usize) * 4;
        match direction {
            GradientDirection::Vertical => {
                let c = from.lerp(to, frac(y, h)).to_premul();
                for px in bytes[row..row + (w as usize) * 4].chunks_exact_mut(4) {
                    px.copy_from_slice(&c);
                }
            }
            GradientDirection::Horizontal | GradientDirection::Diagonal => {
                for x in 0..w {
                    let t = match direction {
                        GradientDirection::Horizontal => frac(x, w),
                        _ => (frac(x, w) + frac(y, h)) / 2.0,
                    };
                    let i = row + (x as usize) * 4;
                    bytes[i..i + 4].copy_from_slice(&from.lerp(to, t).to_premul());
                }
            }
        }
    }
    Raster::from_premul_rgba8(w, h, bytes)
}

#[cfg(test)]
#[path = "../../tests/unit/scene/builder.rs"]
mod tests;
