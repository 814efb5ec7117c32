use crate::foundation::error::{PromoError, PromoResult};

pub use kurbo::{Affine, BezPath, Point, Rect, Vec2};

/// Absolute 0-based frame index in render-session space.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Half-open frame range `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FrameRange {
    /// Inclusive range start.
    pub start: FrameIndex,
    /// Exclusive range end.
    pub end: FrameIndex, // exclusive
}

impl FrameRange {
    /// Create a validated range with `start <= end`.
    pub fn new(start: FrameIndex, end: FrameIndex) -> PromoResult<Self> {
        if start.0 > end.0 {
            return Err(PromoError::validation("FrameRange start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Number of frames contained in the range.
    pub fn len_frames(self) -> u64 {
        self.end.0.saturating_sub(self.start.0)
    }

    /// Return `true` when the range has no frames.
    pub fn is_empty(self) -> bool {
        self.start.0 == self.end.0
    }

    /// Return `true` when `f` is inside `[start, end)`.
    pub fn contains(self, f: FrameIndex) -> bool {
        self.start.0 <= f.0 && f.0 < self.end.0
    }
}

/// Frames-per-second represented as a rational `num/den`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Fps {
    /// Numerator (frames).
    pub num: u32,
    /// Denominator (seconds), must be non-zero.
    #[serde(default = "one_u32")]
    pub den: u32,
}

fn one_u32() -> u32 {
    1
}

impl Fps {
    /// Create a validated FPS value.
    pub fn new(num: u32, den: u32) -> PromoResult<Self> {
        if den == 0 {
            return Err(PromoError::validation("Fps den must be > 0"));
        }
        if num == 0 {
            return Err(PromoError::validation("Fps num must be > 0"));
        }
        Ok(Self { num, den })
    }

    /// Convert to floating-point FPS.
    pub fn as_f64(self) -> f64 {
        f64::from(self.num) / f64::from(self.den)
    }

    /// Timestamp in seconds of frame `frame`.
    ///
    /// Multiplies before dividing so that e.g. frame 5 at 10 fps is exactly `0.5`.
    pub fn frame_time_secs(self, frame: FrameIndex) -> f64 {
        (frame.0 as f64) * f64::from(self.den) / f64::from(self.num)
    }

    /// Number of frames needed to cover `secs`, rounding up.
    pub fn secs_to_frames_ceil(self, secs: f64) -> u64 {
        let frames = secs * self.as_f64();
        // Guard against `0.5 * 30.0 = 15.000000000000002`-style noise.
        let rounded = frames.round();
        if (frames - rounded).abs() < 1e-9 {
            return rounded.max(0.0) as u64;
        }
        frames.ceil().max(0.0) as u64
    }
}

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Largest edge the raster backend accepts.
    pub const MAX_EDGE: u32 = u16::MAX as u32;

    /// Reject empty canvases and canvases the raster backend cannot address.
    pub fn validate(self) -> PromoResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PromoError::validation("canvas width/height must be > 0"));
        }
        if self.width > Self::MAX_EDGE || self.height > Self::MAX_EDGE {
            return Err(PromoError::validation(format!(
                "canvas {}x{} exceeds {}x{}",
                self.width,
                self.height,
                Self::MAX_EDGE,
                Self::MAX_EDGE
            )));
        }
        Ok(())
    }
}

/// Straight-alpha RGBA8 color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8 {
    /// Opaque color from RGB channels.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Color from RGBA channels.
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Fully transparent black.
    pub const fn transparent() -> Self {
        Self::rgba(0, 0, 0, 0)
    }

    /// Premultiplied `[r, g, b, a]` bytes.
    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }

    /// Channel-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f64) -> Self {
        fn lerp_u8(a: u8, b: u8, t: f64) -> u8 {
            let a = f64::from(a);
            let b = f64::from(b);
            (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
        }

        let t = t.clamp(0.0, 1.0);
        Self {
            r: lerp_u8(self.r, other.r, t),
            g: lerp_u8(self.g, other.g, t),
            b: lerp_u8(self.b, other.b, t),
            a: lerp_u8(self.a, other.a, t),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
