use std::sync::Arc;

use crate::animation::schedule::{
    AnimationSchedule, LayerPhase, Oscillation, VisualState, phase_at, visual_state_at,
};
use crate::assets::provider::Raster;
use crate::foundation::core::{Canvas, Fps, FrameIndex, Point, Rect, Rgba8, Vec2};
use crate::foundation::error::{PromoError, PromoResult};
use crate::render::frame::RasterPaint;
use crate::scene::def::{GradientDirection, TextAlign};

/// Immutable, fully resolved scene.
///
/// Built once per render request with [`Scene::build`]; every frame is a pure function of the
/// scene and a timestamp. Assets are decoded, text is wrapped and rasterized, and gradients are
/// precomputed, so rendering performs no I/O.
#[derive(Debug, Clone)]
pub struct Scene {
    pub(crate) canvas: Canvas,
    pub(crate) fps: Fps,
    pub(crate) duration_secs: f64,
    pub(crate) clear: Option<Rgba8>,
    pub(crate) audio: Option<String>,
    pub(crate) layers: Vec<Layer>,
    pub(crate) warnings: Vec<SceneWarning>,
}

/// Something a scene skipped during construction instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneWarning {
    /// The asset provider had nothing for `asset`; the layer at `layer` was dropped.
    MissingAsset {
        /// Index of the layer in the scene definition.
        layer: usize,
        /// Identifier requested from the provider.
        asset: String,
    },
}

impl std::fmt::Display for SceneWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingAsset { layer, asset } => {
                write!(f, "layer {layer}: asset '{asset}' not found, layer skipped")
            }
        }
    }
}

impl Scene {
    /// Output size.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Output frame rate.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Total render length in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }

    /// Frames needed to cover the duration.
    pub fn total_frames(&self) -> u64 {
        self.fps.secs_to_frames_ceil(self.duration_secs)
    }

    /// Timestamp of `frame`.
    pub fn time_of(&self, frame: FrameIndex) -> f64 {
        self.fps.frame_time_secs(frame)
    }

    /// Canvas clear color, if any.
    pub fn clear(&self) -> Option<Rgba8> {
        self.clear
    }

    /// Audio track identifier for the frame consumer.
    pub fn audio(&self) -> Option<&str> {
        self.audio.as_deref()
    }

    /// Resolved layers, back to front. Skipped layers are absent.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Everything skipped while building.
    pub fn warnings(&self) -> &[SceneWarning] {
        &self.warnings
    }

    /// Fail when anything was skipped while building.
    pub fn require_complete(&self) -> PromoResult<()> {
        match self.warnings.first() {
            None => Ok(()),
            Some(w) => Err(PromoError::missing_asset(format!(
                "{w} ({} warning(s) total)",
                self.warnings.len()
            ))),
        }
    }

    /// Lifecycle phase of every layer at `t`.
    pub fn layer_phases(&self, t: f64) -> Vec<LayerPhase> {
        self.layers.iter().map(|l| l.phase(t)).collect()
    }
}

/// One resolved layer.
#[derive(Debug, Clone)]
pub enum Layer {
    /// Full-canvas gradient.
    Background(BackgroundLayer),
    /// Raster image.
    StaticImage(ImageLayer),
    /// Text block.
    AnimatedText(TextLayer),
    /// Shape decoration.
    ShapeDecoration(ShapeLayer),
}

impl Layer {
    /// Animation schedule, `None` for layers that are always settled.
    pub fn schedule(&self) -> Option<&AnimationSchedule> {
        match self {
            Self::Background(_) => None,
            Self::StaticImage(l) => l.schedule.as_ref(),
            Self::AnimatedText(l) => l.schedule.as_ref(),
            Self::ShapeDecoration(l) => l.schedule.as_ref(),
        }
    }

    /// Lifecycle phase at `t`.
    pub fn phase(&self, t: f64) -> LayerPhase {
        phase_at(self.schedule(), t)
    }

    /// Visual state at `t`, `None` while nothing is drawn.
    pub fn visual_state(&self, t: f64) -> Option<VisualState> {
        visual_state_at(self.schedule(), t)
    }

    /// Short kind name for logs.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Background(_) => "background",
            Self::StaticImage(_) => "image",
            Self::AnimatedText(_) => "text",
            Self::ShapeDecoration(_) => "shape",
        }
    }
}

/// Full-canvas gradient.
#[derive(Debug, Clone)]
pub struct BackgroundLayer {
    /// Start color.
    pub from: Rgba8,
    /// End color.
    pub to: Rgba8,
    /// Interpolation axis.
    pub direction: GradientDirection,
    pub(crate) paint: RasterPaint,
}

/// Placed raster image.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    /// Identifier the raster was resolved from.
    pub asset: String,
    /// Decoded raster.
    pub raster: Arc<Raster>,
    /// Settled center in pixels.
    pub center: Point,
    /// Drawn width in pixels.
    pub width: f64,
    /// Drawn height in pixels.
    pub height: f64,
    /// Opacity multiplier.
    pub opacity: f64,
    /// Entrance/exit animation.
    pub schedule: Option<AnimationSchedule>,
    /// Vertical bobbing in pixels.
    pub float: Option<Oscillation>,
    pub(crate) paint: RasterPaint,
}

/// Wrapped, pre-rasterized text block.
#[derive(Debug, Clone)]
pub struct TextLayer {
    /// Full text as written.
    pub text: String,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    pub color: Rgba8,
    /// Outline color.
    pub outline_color: Rgba8,
    /// Outline width in pixels.
    pub outline_px: f32,
    /// Line alignment.
    pub align: TextAlign,
    /// Maximum alpha once settled.
    pub opacity: f64,
    /// Entrance/exit animation.
    pub schedule: Option<AnimationSchedule>,
    /// Lines in top-to-bottom order.
    pub lines: Vec<TextLine>,
    /// Union of the line boxes in pixels.
    pub bounds: Rect,
    pub(crate) char_count: usize,
}

impl TextLayer {
    /// Number of chars of [`TextLayer::text`] shown at `t`, `None` while the layer is hidden.
    pub fn revealed_chars(&self, t: f64) -> Option<usize> {
        let state = visual_state_at(self.schedule.as_ref(), t)?;
        Some(self.revealed_for(&state))
    }

    pub(crate) fn revealed_for(&self, state: &VisualState) -> usize {
        match state.reveal {
            None => self.char_count,
            Some(p) => {
                // Guards `0.3 * 10.0 = 2.9999999999999996`.
                let k = (p.clamp(0.0, 1.0) * self.char_count as f64 + 1e-9).floor() as usize;
                k.min(self.char_count)
            }
        }
    }

    /// The revealed prefix of the text at `t`; empty while the layer is hidden.
    pub fn visible_text(&self, t: f64) -> String {
        let k = self.revealed_chars(t).unwrap_or(0);
        self.text.chars().take(k).collect()
    }
}

/// One line of a [`TextLayer`].
#[derive(Debug, Clone)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Index of the first char in the layer's full text.
    pub char_start: usize,
    /// Number of chars in the line.
    pub char_len: usize,
    /// Top-left of the line box in pixels.
    pub origin: Point,
    /// Advance width in pixels.
    pub width: f64,
    /// Line box height in pixels.
    pub height: f64,
    pub(crate) full: Option<LineSprite>,
    pub(crate) prefixes: Vec<Option<LineSprite>>,
}

impl TextLine {
    /// Sprite showing the first `visible` chars of this line.
    pub(crate) fn sprite_for(&self, visible: usize) -> Option<&LineSprite> {
        if visible == 0 {
            return None;
        }
        if visible >= self.char_len {
            return self.full.as_ref();
        }
        self.prefixes.get(visible).and_then(Option::as_ref)
    }
}

/// Outline and fill composed into one premultiplied raster.
#[derive(Debug, Clone)]
pub(crate) struct LineSprite {
    pub(crate) paint: RasterPaint,
    /// Sprite top-left relative to the line origin (negative by the outline padding).
    pub(crate) offset: Vec2,
}

/// Resolved decoration geometry in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned ellipse.
    Ellipse {
        /// Center.
        center: Point,
        /// Radii.
        radii: Vec2,
    },
    /// Elliptical arc, angles in radians.
    Arc {
        /// Center.
        center: Point,
        /// Radii.
        radii: Vec2,
        /// Start angle.
        start_angle: f64,
        /// Sweep angle.
        sweep_angle: f64,
    },
    /// Rounded rectangle.
    RoundedRect {
        /// Center.
        center: Point,
        /// Width and height.
        size: Vec2,
        /// Corner radius.
        radius: f64,
    },
}

impl Shape {
    /// Geometric center.
    pub fn center(&self) -> Point {
        match *self {
            Self::Ellipse { center, .. }
            | Self::Arc { center, .. }
            | Self::RoundedRect { center, .. } => center,
        }
    }

    /// `true` for open outlines that cannot be filled.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Arc { .. })
    }
}

/// Shape decoration layer.
#[derive(Debug, Clone)]
pub struct ShapeLayer {
    /// Geometry.
    pub shape: Shape,
    /// Fill color.
    pub fill: Option<Rgba8>,
    /// Stroke color and width in pixels.
    pub stroke: Option<(Rgba8, f64)>,
    /// Size oscillation ratio.
    pub pulsate: Option<Oscillation>,
    /// Opacity multiplier.
    pub opacity: f64,
    /// Entrance/exit animation.
    pub schedule: Option<AnimationSchedule>,
}

#[cfg(test)]
#[path = "../../tests/unit/scene/model.rs"]
mod tests;
