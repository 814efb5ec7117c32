use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::animation::schedule::{AnimationSchedule, Oscillation};
use crate::assets::color::ColorDef;
use crate::foundation::core::{Canvas, Fps, Rgba8};
use crate::foundation::error::{PromoError, PromoResult};

/// JSON-facing scene description.
///
/// This is the human-edited boundary object. [`crate::Scene::build`] validates it, resolves
/// coordinates and assets, and produces the immutable runtime scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDef {
    /// Output size.
    pub canvas: Canvas,
    /// Output frame rate.
    pub fps: Fps,
    /// Total render length in seconds.
    pub duration_secs: f64,
    /// How positions and sizes are interpreted.
    #[serde(default)]
    pub units: Units,
    /// Color the canvas is cleared to before the first layer; transparent when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clear: Option<ColorDef>,
    /// Audio track handed through to the frame consumer untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    /// Layers, back to front.
    #[serde(default)]
    pub layers: Vec<LayerDef>,
}

impl SceneDef {
    /// Parse a scene from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> PromoResult<Self> {
        serde_json::from_reader(r).map_err(|e| PromoError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON string.
    pub fn from_json_str(s: &str) -> PromoResult<Self> {
        serde_json::from_str(s).map_err(|e| PromoError::serde(format!("parse scene JSON: {e}")))
    }

    /// Parse a scene from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> PromoResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            PromoError::validation(format!("open scene JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Pretty-printed JSON.
    pub fn to_json_pretty(&self) -> PromoResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| PromoError::serde(format!("serialize scene JSON: {e}")))
    }
}

/// Coordinate interpretation for a whole scene.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Absolute pixels.
    #[default]
    Pixels,
    /// Fractions of the canvas: x and widths of its width, y and heights of its height, radii
    /// of its width. Font sizes and stroke widths stay in pixels.
    Fraction,
}

/// One layer of a [`SceneDef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerDef {
    /// Two-color gradient over the whole canvas.
    Background(BackgroundDef),
    /// Decoded raster asset.
    Image(ImageDef),
    /// Outlined, optionally wrapped and animated text.
    Text(TextDef),
    /// Ellipse, arc or rounded rectangle.
    Shape(ShapeLayerDef),
}

/// Gradient axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GradientDirection {
    /// Top row `from`, bottom row `to`.
    #[default]
    Vertical,
    /// Left column `from`, right column `to`.
    Horizontal,
    /// Top-left `from`, bottom-right `to`.
    Diagonal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Background gradient.
pub struct BackgroundDef {
    /// Start color.
    pub from: ColorDef,
    /// End color.
    pub to: ColorDef,
    /// Interpolation axis.
    #[serde(default)]
    pub direction: GradientDirection,
}

/// Raster image placed by its center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageDef {
    /// Identifier passed to the asset provider.
    pub asset: String,
    /// Center x.
    pub x: f64,
    /// Center y.
    pub y: f64,
    /// Drawn width; derived from `height` and the aspect ratio, or the raster size, when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Drawn height; derived like `width` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Opacity multiplier.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Entrance/exit animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<AnimationSchedule>,
    /// Vertical bobbing motion.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float: Option<Oscillation>,
}

/// Horizontal alignment of text lines around `x`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    /// `x` is the left edge.
    Left,
    /// `x` is the center.
    #[default]
    Center,
    /// `x` is the right edge.
    Right,
}

/// Text block anchored at `(x, y)`: `y` is the top of the first line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextDef {
    /// Text; `\n` forces a line break.
    pub text: String,
    /// Anchor x, see [`TextAlign`].
    pub x: f64,
    /// Top of the block.
    pub y: f64,
    /// Font size in pixels.
    pub size_px: f32,
    /// Fill color.
    #[serde(default = "default_text_color")]
    pub color: ColorDef,
    /// Outline color.
    #[serde(default = "default_outline_color")]
    pub outline_color: ColorDef,
    /// Outline width in pixels; `0` disables the outline pass.
    #[serde(default)]
    pub outline_px: f32,
    /// Wrap width; defaults to the room between the anchor and the canvas edges for `align`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width: Option<f64>,
    /// Line alignment.
    #[serde(default)]
    pub align: TextAlign,
    /// Line advance as a multiple of the font's line height.
    #[serde(default = "default_line_spacing")]
    pub line_spacing: f32,
    /// Maximum alpha the text reaches once settled.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Entrance/exit animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<AnimationSchedule>,
}

/// Decoration primitive. All shapes are positioned by their center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeDef {
    /// Axis-aligned ellipse.
    Ellipse {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Horizontal radius.
        rx: f64,
        /// Vertical radius.
        ry: f64,
    },
    /// Elliptical arc; angles in degrees, clockwise from the positive x axis.
    Arc {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Horizontal radius.
        rx: f64,
        /// Vertical radius.
        ry: f64,
        /// Start angle.
        start_deg: f64,
        /// Sweep angle.
        sweep_deg: f64,
    },
    /// Rounded rectangle.
    RoundedRect {
        /// Center x.
        cx: f64,
        /// Center y.
        cy: f64,
        /// Width.
        width: f64,
        /// Height.
        height: f64,
        /// Corner radius.
        #[serde(default)]
        radius: f64,
    },
}

/// Stroke paint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeDef {
    /// Stroke color.
    pub color: ColorDef,
    /// Stroke width in pixels.
    pub width: f64,
}

/// Shape decoration layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeLayerDef {
    /// Geometry.
    pub shape: ShapeDef,
    /// Fill color; unfilled when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<ColorDef>,
    /// Outline; none when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<StrokeDef>,
    /// Size oscillation as a ratio of the radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pulsate: Option<Oscillation>,
    /// Opacity multiplier.
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Entrance/exit animation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<AnimationSchedule>,
}

fn default_opacity() -> f64 {
    1.0
}

fn default_line_spacing() -> f32 {
    1.2
}

fn default_text_color() -> ColorDef {
    ColorDef(Rgba8::rgb(255, 255, 255))
}

fn default_outline_color() -> ColorDef {
    ColorDef(Rgba8::rgb(0, 0, 0))
}

#[cfg(test)]
#[path = "../../tests/unit/scene/def.rs"]
mod tests;
