use std::path::{Path, PathBuf};
use std::sync::Arc;

use font8x8::UnicodeFonts;

use crate::foundation::error::{PromoError, PromoResult};

/// Environment variable consulted by [`FontLibrary::discover`].
pub const FONT_ENV_VAR: &str = "PROMOFRAME_FONT";

pub(crate) const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// 8-bit coverage mask for one line of text, row-major, `width * height` bytes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GlyphMask {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Coverage per pixel.
    pub alpha: Vec<u8>,
}

impl GlyphMask {
    /// Coverage at `(x, y)`, zero outside the mask.
    pub fn at(&self, x: i64, y: i64) -> u8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return 0;
        }
        self.alpha[(y as usize) * (self.width as usize) + (x as usize)]
    }
}

/// A font resolved at one pixel size.
pub trait FontHandle: Send + Sync + std::fmt::Debug {
    /// Pixel size this handle renders at.
    fn size_px(&self) -> f32;

    /// Advance width and line height of `text` laid out on one line.
    fn measure(&self, text: &str) -> PromoResult<(f32, f32)>;

    /// Rasterize `text` on one line; the mask origin is the line box's top-left.
    fn rasterize(&self, text: &str) -> PromoResult<GlyphMask>;
}

/// Source of [`FontHandle`]s by pixel size.
pub trait FontProvider: Send + Sync {
    /// Font at `size_px`. Never fails: providers fall back to a built-in glyph set.
    fn get_font(&self, size_px: f32) -> Arc<dyn FontHandle>;
}

/// Built-in 8x8 bitmap glyphs, scaled by an integer factor.
///
/// Used when no font file is available. Covers Basic Latin and Latin-1; anything else draws as
/// `?`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuiltinFont {
    size_px: f32,
    scale: u32,
}

impl BuiltinFont {
    const CELL: u32 = 8;

    /// Bitmap font approximating `size_px`.
    pub fn new(size_px: f32) -> Self {
        let scale = if size_px.is_finite() {
            (size_px / Self::CELL as f32).round().max(1.0) as u32
        } else {
            1
        };
        Self { size_px, scale }
    }

    fn cell(&self) -> u32 {
        Self::CELL * self.scale
    }

    fn glyph(c: char) -> [u8; 8] {
        font8x8::BASIC_FONTS
            .get(c)
            .or_else(|| font8x8::LATIN_FONTS.get(c))
            .or_else(|| font8x8::BASIC_FONTS.get('?'))
            .unwrap_or([0; 8])
    }
}

impl FontHandle for BuiltinFont {
    fn size_px(&self) -> f32 {
        self.size_px
    }

    fn measure(&self, text: &str) -> PromoResult<(f32, f32)> {
        let cell = self.cell() as f32;
        Ok((text.chars().count() as f32 * cell, cell))
    }

    fn rasterize(&self, text: &str) -> PromoResult<GlyphMask> {
        let cell = self.cell();
        let chars: Vec<char> = text.chars().collect();
        let width = cell.saturating_mul(chars.len() as u32);
        let height = cell;
        let mut alpha = vec![0u8; (width as usize) * (height as usize)];

        for (i, &c) in chars.iter().enumerate() {
            let rows = Self::glyph(c);
            let x0 = (i as u32) * cell;
            for (gy, row) in rows.iter().enumerate() {
                for gx in 0..Self::CELL {
                    // Bit 0 is the leftmost pixel.
                    if row & (1 << gx) == 0 {
                        continue;
                    }
                    for sy in 0..self.scale {
                        let y = (gy as u32) * self.scale + sy;
                        let start = (y as usize) * (width as usize)
                            + (x0 + gx * self.scale) as usize;
                        alpha[start..start + self.scale as usize].fill(255);
                    }
                }
            }
        }

        Ok(GlyphMask {
            width,
            height,
            alpha,
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGBA8 brush color used by Parley text layout.
pub(crate) struct TextBrushRgba8 {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
    pub(crate) a: u8,
}

/// Parley contexts with one registered font family.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrushRgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `font_bytes` into a fresh font context.
    pub(crate) fn new(font_bytes: &[u8]) -> PromoResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| PromoError::font("no font families registered from font bytes"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| PromoError::font("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Shape and lay out `text` on a single unbounded line.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        size_px: f32,
    ) -> PromoResult<parley::Layout<TextBrushRgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(PromoError::font("text size_px must be finite and > 0"));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(TextBrushRgba8 {
            r: 255,
            g: 255,
            b: 255,
            a: 255,
        }));

        let mut layout: parley::Layout<TextBrushRgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }
}

/// Outline font shaped by Parley and rasterized by `vello_cpu`.
///
/// Every shaping call builds its own layout context, so handles are freely shareable across
/// threads. Shaping only happens while a scene is constructed.
#[derive(Clone)]
pub struct OutlineFont {
    size_px: f32,
    bytes: Arc<Vec<u8>>,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for OutlineFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutlineFont")
            .field("size_px", &self.size_px)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

impl OutlineFont {
    /// Font at `size_px` from raw TTF/OTF bytes.
    pub fn new(bytes: Arc<Vec<u8>>, size_px: f32) -> PromoResult<Self> {
        // Validate once so later shaping failures are genuinely exceptional.
        TextLayoutEngine::new(&bytes)?;
        Ok(Self::new_unchecked(bytes, size_px))
    }

    fn new_unchecked(bytes: Arc<Vec<u8>>, size_px: f32) -> Self {
        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(bytes.as_ref().clone()),
            0,
        );
        Self {
            size_px,
            bytes,
            font,
        }
    }

    fn layout(&self, text: &str) -> PromoResult<parley::Layout<TextBrushRgba8>> {
        TextLayoutEngine::new(&self.bytes)?.layout_line(text, self.size_px)
    }
}

impl FontHandle for OutlineFont {
    fn size_px(&self) -> f32 {
        self.size_px
    }

    fn measure(&self, text: &str) -> PromoResult<(f32, f32)> {
        let layout = self.layout(text)?;
        Ok((layout.width(), layout.height()))
    }

    fn rasterize(&self, text: &str) -> PromoResult<GlyphMask> {
        let layout = self.layout(text)?;
        let width = layout.width().ceil().max(0.0) as u32;
        let height = layout.height().ceil().max(0.0) as u32;
        if width == 0 || height == 0 {
            return Ok(GlyphMask {
                width,
                height,
                alpha: vec![0; (width as usize) * (height as usize)],
            });
        }
        let w: u16 = width
            .try_into()
            .map_err(|_| PromoError::font("text line wider than 65535px"))?;
        let h: u16 = height
            .try_into()
            .map_err(|_| PromoError::font("text line taller than 65535px"))?;

        let mut ctx = vello_cpu::RenderContext::new(w, h);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                // Absolute positions: run offset along x, line baseline along y.
                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                ctx.glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
        ctx.flush();
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        ctx.render_to_pixmap(&mut pixmap);

        let alpha = pixmap
            .data_as_u8_slice()
            .chunks_exact(4)
            .map(|px| px[3])
            .collect();
        Ok(GlyphMask {
            width,
            height,
            alpha,
        })
    }
}

#[derive(Clone, Debug)]
enum FontFace {
    Outline(Arc<Vec<u8>>),
    Builtin,
}

/// Default [`FontProvider`]: one outline face, or the built-in bitmap glyphs.
#[derive(Clone, Debug)]
pub struct FontLibrary {
    face: FontFace,
    source: Option<PathBuf>,
}

impl FontLibrary {
    /// Provider that always uses the built-in glyph set.
    pub fn builtin() -> Self {
        Self {
            face: FontFace::Builtin,
            source: None,
        }
    }

    /// Provider backed by TTF/OTF bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> PromoResult<Self> {
        TextLayoutEngine::new(&bytes)?;
        Ok(Self {
            face: FontFace::Outline(Arc::new(bytes)),
            source: None,
        })
    }

    /// Provider backed by a font file.
    pub fn from_path(path: impl AsRef<Path>) -> PromoResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .map_err(|e| PromoError::font(format!("read font '{}': {e}", path.display())))?;
        let mut lib = Self::from_bytes(bytes)?;
        lib.source = Some(path.to_path_buf());
        Ok(lib)
    }

    /// Try `explicit`, then `$PROMOFRAME_FONT`, then well-known system fonts.
    ///
    /// Falls back to [`FontLibrary::builtin`] without failing when nothing is usable.
    pub fn discover(explicit: Option<&Path>) -> Self {
        let env = std::env::var_os(FONT_ENV_VAR).map(PathBuf::from);
        let candidates = explicit
            .map(Path::to_path_buf)
            .into_iter()
            .chain(env)
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::from_path(&path) {
                Ok(lib) => {
                    tracing::debug!(font = %path.display(), "using outline font");
                    return lib;
                }
                Err(err) => tracing::debug!(font = %path.display(), error = %err, "skipping font"),
            }
        }
        tracing::debug!("no usable font file found, using built-in glyphs");
        Self::builtin()
    }

    /// `true` when glyphs come from the built-in bitmap set.
    pub fn is_builtin(&self) -> bool {
        matches!(self.face, FontFace::Builtin)
    }

    /// File the outline face was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

impl FontProvider for FontLibrary {
    fn get_font(&self, size_px: f32) -> Arc<dyn FontHandle> {
        let size_px = if size_px.is_finite() {
            size_px.max(1.0)
        } else {
            1.0
        };
        match &self.face {
            FontFace::Outline(bytes) => {
                Arc::new(OutlineFont::new_unchecked(bytes.clone(), size_px))
            }
            FontFace::Builtin => Arc::new(BuiltinFont::new(size_px)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/font.rs"]
mod tests;
