//! promoframe renders short vertical product promo videos, one frame at a time.
//!
//! A [`SceneDef`] (usually JSON, or generated from an [`AdRequest`] by a [`Template`]) is resolved
//! once into an immutable [`Scene`]: assets are decoded, text is wrapped and rasterized, and
//! schedules are validated. Every frame is then a pure function of the scene and a timestamp:
//!
//! - Build a [`Scene`] with [`Scene::build`]
//! - Render single frames with [`render`] or a reusable [`FrameRenderer`]
//! - Stream a frame range into a [`FrameSink`] through a [`RenderSession`]
//!
//! Video muxing and audio are out of scope; [`PngSequenceSink`] writes frames plus a manifest
//! for an external encoder.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod foundation;
mod text;

/// Frame sinks.
pub mod encode;
/// Frame output and CPU compositing.
pub mod render;
/// Scene definitions and the resolved scene model.
pub mod scene;
/// Range rendering.
pub mod session;
/// Ad templates.
pub mod templates;

pub use crate::foundation::core::{
    Affine, BezPath, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Rgba8, Vec2,
};
pub use crate::foundation::error::{PromoError, PromoResult};

pub use crate::animation::ease::Ease;
pub use crate::animation::schedule::{
    AnimationSchedule, EntranceMode, ExitSchedule, LayerPhase, Oscillation, VisualState, phase_at,
    visual_state_at,
};
pub use crate::assets::color::ColorDef;
pub use crate::assets::decode::{decode_image, decode_svg};
pub use crate::assets::font::{
    BuiltinFont, FONT_ENV_VAR, FontHandle, FontLibrary, FontProvider, GlyphMask, OutlineFont,
};
pub use crate::assets::provider::{
    AssetProvider, DirAssets, MemoryAssets, Raster, normalize_rel_path,
};
pub use crate::encode::sink::{
    FrameSink, InMemorySink, PngSequenceSink, SequenceManifest, SinkConfig,
};
pub use crate::render::compositor::{FrameRenderer, render};
pub use crate::render::frame::Frame;
pub use crate::scene::def::{
    BackgroundDef, GradientDirection, ImageDef, LayerDef, SceneDef, ShapeDef, ShapeLayerDef,
    StrokeDef, TextAlign, TextDef, Units,
};
pub use crate::scene::model::{
    BackgroundLayer, ImageLayer, Layer, Scene, SceneWarning, Shape, ShapeLayer, TextLayer,
    TextLine,
};
pub use crate::session::render_session::{RenderSession, RenderSessionOpts, RenderStats};
pub use crate::templates::presets::{
    AdRequest, Decoration, PRESET_NAMES, Template, pick_template,
};
pub use crate::text::wrap::{WrappedLine, wrap_text};
