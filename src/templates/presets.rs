use crate::animation::ease::Ease;
use crate::animation::schedule::{AnimationSchedule, EntranceMode, Oscillation};
use crate::assets::color::ColorDef;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{PromoError, PromoResult};
use crate::foundation::math::Fnv1a64;
use crate::scene::def::{
    BackgroundDef, GradientDirection, ImageDef, LayerDef, SceneDef, ShapeDef, ShapeLayerDef,
    StrokeDef, TextAlign, TextDef, Units,
};

/// Names accepted by [`Template::by_name`], in [`pick_template`] order.
pub const PRESET_NAMES: [&str; 4] = ["modern", "luxury", "minimal", "festive"];

/// Decoration drawn behind the product.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decoration {
    /// Two pulsating stroked rings around the product.
    Rings,
    /// Inset rounded frame plus an accent arc.
    Frame,
    /// Thin bar under the headline.
    Underline,
    /// Scattered pulsating dots.
    Confetti,
}

/// Visual identity of an ad: colors, headline animation and decoration.
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    /// Preset name.
    pub name: &'static str,
    /// Background gradient start.
    pub background_from: Rgba8,
    /// Background gradient end.
    pub background_to: Rgba8,
    /// Background gradient axis.
    pub direction: GradientDirection,
    /// Highlight color for price and decorations.
    pub accent: Rgba8,
    /// Body text color.
    pub text_color: Rgba8,
    /// Text outline color.
    pub outline_color: Rgba8,
    /// How the headline enters.
    pub headline_mode: EntranceMode,
    /// Easing of the headline entrance.
    pub headline_ease: Ease,
    /// Decoration behind the product.
    pub decoration: Decoration,
}

impl Template {
    /// Saturated blue gradient, revealed headline, pulsating rings.
    pub fn modern() -> Self {
        Self {
            name: "modern",
            background_from: Rgba8::rgb(0x1f, 0x3c, 0x88),
            background_to: Rgba8::rgb(0x07, 0x0f, 0x2b),
            direction: GradientDirection::Vertical,
            accent: Rgba8::rgb(0x00, 0xd4, 0xff),
            text_color: Rgba8::rgb(0xff, 0xff, 0xff),
            outline_color: Rgba8::rgb(0x00, 0x00, 0x00),
            headline_mode: EntranceMode::Reveal,
            headline_ease: Ease::Linear,
            decoration: Decoration::Rings,
        }
    }

    /// Black and gold, fading headline, framed canvas.
    pub fn luxury() -> Self {
        Self {
            name: "luxury",
            background_from: Rgba8::rgb(0x14, 0x11, 0x0f),
            background_to: Rgba8::rgb(0x3a, 0x2f, 0x1d),
            direction: GradientDirection::Diagonal,
            accent: Rgba8::rgb(0xd4, 0xaf, 0x37),
            text_color: Rgba8::rgb(0xf5, 0xe6, 0xc8),
            outline_color: Rgba8::rgb(0x00, 0x00, 0x00),
            headline_mode: EntranceMode::FadeIn,
            headline_ease: Ease::InOutCubic,
            decoration: Decoration::Frame,
        }
    }

    /// Light and quiet, sliding headline with an underline.
    pub fn minimal() -> Self {
        Self {
            name: "minimal",
            background_from: Rgba8::rgb(0xfa, 0xfa, 0xfa),
            background_to: Rgba8::rgb(0xe4, 0xe7, 0xeb),
            direction: GradientDirection::Vertical,
            accent: Rgba8::rgb(0x11, 0x18, 0x27),
            text_color: Rgba8::rgb(0x11, 0x18, 0x27),
            outline_color: Rgba8::rgb(0xff, 0xff, 0xff),
            headline_mode: EntranceMode::SlideIn { dx: -0.3, dy: 0.0 },
            headline_ease: Ease::OutCubic,
            decoration: Decoration::Underline,
        }
    }

    /// Warm colors, bouncing headline, confetti dots.
    pub fn festive() -> Self {
        Self {
            name: "festive",
            background_from: Rgba8::rgb(0xc0, 0x1c, 0x28),
            background_to: Rgba8::rgb(0xf6, 0xa1, 0x1b),
            direction: GradientDirection::Horizontal,
            accent: Rgba8::rgb(0xff, 0xe0, 0x66),
            text_color: Rgba8::rgb(0xff, 0xff, 0xff),
            outline_color: Rgba8::rgb(0x5a, 0x0a, 0x10),
            headline_mode: EntranceMode::ScaleIn,
            headline_ease: Ease::OutBounce,
            decoration: Decoration::Confetti,
        }
    }

    /// All presets in [`PRESET_NAMES`] order.
    pub fn presets() -> [Template; 4] {
        [Self::modern(), Self::luxury(), Self::minimal(), Self::festive()]
    }

    /// Preset named `name` (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        Self::presets()
            .into_iter()
            .find(|t| t.name.eq_ignore_ascii_case(name.trim()))
    }

    /// Lay out `req` as a vertical ad.
    ///
    /// Positions are canvas fractions, font sizes follow the canvas height, and entrances are
    /// staggered over the first 70% of `duration_secs`.
    pub fn scene_def(
        &self,
        req: &AdRequest,
        canvas: Canvas,
        fps: Fps,
        duration_secs: f64,
    ) -> PromoResult<SceneDef> {
        canvas.validate()?;
        if !duration_secs.is_finite() || duration_secs <= 0.0 {
            return Err(PromoError::validation(
                "ad duration_secs must be finite and > 0",
            ));
        }
        if req.hook.trim().is_empty() {
            return Err(PromoError::validation("ad hook must be non-empty"));
        }

        let h = f64::from(canvas.height);
        let px = |ratio: f64| (h * ratio).round().max(1.0) as f32;
        let at = |frac: f64, len: f64, mode: EntranceMode, ease: Ease| AnimationSchedule {
            start: duration_secs * frac,
            duration: duration_secs * len,
            ease,
            mode,
            exit: None,
        };
        let outline = px(0.004);

        let text = |content: &str, y: f64, size: f32, color: Rgba8, schedule| TextDef {
            text: content.to_string(),
            x: 0.5,
            y,
            size_px: size,
            color: color.into(),
            outline_color: self.outline_color.into(),
            outline_px: outline,
            max_width: Some(0.88),
            align: TextAlign::Center,
            line_spacing: 1.15,
            opacity: 1.0,
            schedule: Some(schedule),
        };

        let mut layers = vec![LayerDef::Background(BackgroundDef {
            from: self.background_from.into(),
            to: self.background_to.into(),
            direction: self.direction,
        })];
        layers.extend(
            self.decorations(canvas, duration_secs)
                .into_iter()
                .map(LayerDef::Shape),
        );

        if let Some(logo) = present(&req.logo_asset) {
            layers.push(LayerDef::Image(ImageDef {
                asset: logo.to_string(),
                x: 0.5,
                y: 0.07,
                width: None,
                height: Some(0.08),
                opacity: 1.0,
                schedule: Some(at(0.0, 0.08, EntranceMode::FadeIn, Ease::OutQuad)),
                float: None,
            }));
        }
        if let Some(product) = present(&req.product_asset) {
            layers.push(LayerDef::Image(ImageDef {
                asset: product.to_string(),
                x: 0.5,
                y: 0.47,
                width: Some(0.62),
                height: None,
                opacity: 1.0,
                schedule: Some(at(0.05, 0.12, EntranceMode::ScaleIn, Ease::OutBack)),
                float: Some(Oscillation {
                    amplitude: 0.008,
                    angular_speed: 2.4,
                }),
            }));
        }

        layers.push(LayerDef::Text(text(
            req.hook.trim(),
            0.14,
            px(0.048),
            self.text_color,
            at(0.1, 0.2, self.headline_mode, self.headline_ease),
        )));
        if let Some(price) = present(&req.price) {
            layers.push(LayerDef::Text(text(
                price,
                0.7,
                px(0.07),
                self.accent,
                at(0.35, 0.1, EntranceMode::ScaleIn, Ease::OutBack),
            )));
        }
        if let Some(copy) = present(&req.ad_copy) {
            layers.push(LayerDef::Text(TextDef {
                line_spacing: 1.3,
                ..text(
                    copy,
                    0.79,
                    px(0.03),
                    self.text_color,
                    at(0.45, 0.1, EntranceMode::FadeIn, Ease::Linear),
                )
            }));
        }
        if let Some(contact) = present(&req.contact) {
            layers.push(LayerDef::Text(text(
                contact,
                0.91,
                px(0.028),
                self.text_color,
                at(
                    0.55,
                    0.15,
                    EntranceMode::SlideIn { dx: 0.0, dy: 0.05 },
                    Ease::OutCubic,
                ),
            )));
        }

        Ok(SceneDef {
            canvas,
            fps,
            duration_secs,
            units: Units::Fraction,
            clear: Some(ColorDef(self.background_to)),
            audio: present(&req.audio).map(str::to_string),
            layers,
        })
    }

    fn decorations(&self, canvas: Canvas, duration_secs: f64) -> Vec<ShapeLayerDef> {
        // Both radii scale by canvas width, so equal radii stay round.
        let stroke_px = (f64::from(canvas.width) * 0.006).round().max(1.0);
        let shape = |shape, fill: Option<Rgba8>, stroke: Option<Rgba8>, pulsate| ShapeLayerDef {
            shape,
            fill: fill.map(ColorDef::from),
            stroke: stroke.map(|c| StrokeDef {
                color: c.into(),
                width: stroke_px,
            }),
            pulsate,
            opacity: 1.0,
            schedule: Some(AnimationSchedule {
                start: duration_secs * 0.05,
                duration: duration_secs * 0.15,
                ease: Ease::OutCubic,
                mode: EntranceMode::ScaleIn,
                exit: None,
            }),
        };

        match self.decoration {
            Decoration::Rings => [(0.36, 0.04), (0.44, -0.03)]
                .into_iter()
                .map(|(r, amp)| {
                    shape(
                        ShapeDef::Ellipse {
                            cx: 0.5,
                            cy: 0.47,
                            rx: r,
                            ry: r,
                        },
                        None,
                        Some(self.accent),
                        Some(Oscillation {
                            amplitude: amp,
                            angular_speed: 3.0,
                        }),
                    )
                })
                .collect(),
            Decoration::Frame => {
                let mut frame = shape(
                    ShapeDef::RoundedRect {
                        cx: 0.5,
                        cy: 0.5,
                        width: 0.92,
                        height: 0.95,
                        radius: 0.04,
                    },
                    None,
                    Some(self.accent),
                    None,
                );
                if let Some(s) = frame.schedule.as_mut() {
                    s.mode = EntranceMode::FadeIn;
                }
                let arc = shape(
                    ShapeDef::Arc {
                        cx: 0.5,
                        cy: 0.47,
                        rx: 0.38,
                        ry: 0.38,
                        start_deg: 200.0,
                        sweep_deg: 140.0,
                    },
                    None,
                    Some(self.accent),
                    None,
                );
                vec![frame, arc]
            }
            Decoration::Underline => vec![shape(
                ShapeDef::RoundedRect {
                    cx: 0.5,
                    cy: 0.235,
                    width: 0.3,
                    height: 0.006,
                    radius: 0.003,
                },
                Some(self.accent),
                None,
                None,
            )],
            Decoration::Confetti => CONFETTI
                .iter()
                .enumerate()
                .map(|(i, &(cx, cy, r))| {
                    let fill = if i % 2 == 0 {
                        self.accent
                    } else {
                        self.text_color
                    };
                    shape(
                        ShapeDef::Ellipse { cx, cy, rx: r, ry: r },
                        Some(fill),
                        None,
                        Some(Oscillation {
                            amplitude: 0.15,
                            angular_speed: 2.0 + i as f64 * 0.7,
                        }),
                    )
                })
                .collect(),
        }
    }
}

const CONFETTI: [(f64, f64, f64); 6] = [
    (0.12, 0.26, 0.025),
    (0.88, 0.3, 0.018),
    (0.15, 0.62, 0.02),
    (0.86, 0.6, 0.028),
    (0.3, 0.97, 0.015),
    (0.72, 0.03, 0.02),
];

/// Text and assets supplied by the advertiser.
///
/// Empty or whitespace-only optional fields count as absent.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct AdRequest {
    /// Headline.
    pub hook: String,
    /// Price line, shown in the accent color.
    #[serde(default)]
    pub price: Option<String>,
    /// Phone number, handle or address.
    #[serde(default)]
    pub contact: Option<String>,
    /// Longer body copy, wrapped.
    #[serde(default)]
    pub ad_copy: Option<String>,
    /// Product cutout asset identifier.
    #[serde(default)]
    pub product_asset: Option<String>,
    /// Logo asset identifier.
    #[serde(default)]
    pub logo_asset: Option<String>,
    /// Audio track handed to the encoder.
    #[serde(default)]
    pub audio: Option<String>,
}

impl AdRequest {
    /// Request with only a headline.
    pub fn new(hook: impl Into<String>) -> Self {
        Self {
            hook: hook.into(),
            ..Self::default()
        }
    }
}

/// Deterministically pick a preset for `key` under `seed`.
///
/// The same key and seed always give the same template; varying the seed reshuffles choices.
pub fn pick_template(key: &str, seed: u64) -> Template {
    let mut h = Fnv1a64::new_default();
    h.write_u64(seed);
    h.write_bytes(key.as_bytes());
    let presets = Template::presets();
    let idx = (h.finish() % presets.len() as u64) as usize;
    presets[idx].clone()
}

fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "../../tests/unit/templates/presets.rs"]
mod tests;
