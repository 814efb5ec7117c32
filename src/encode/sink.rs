use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::core::{Fps, FrameIndex};
use crate::foundation::error::{PromoError, PromoResult};
use crate::render::frame::Frame;

/// Configuration provided to a [`FrameSink`] at the start of a range render.
#[derive(Debug, Clone, PartialEq)]
pub struct SinkConfig {
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Output frames-per-second.
    pub fps: Fps,
    /// Audio track for the downstream encoder, passed through untouched.
    pub audio: Option<PathBuf>,
}

/// Sink contract for consuming rendered frames in timeline order.
///
/// Ordering contract: `push_frame` is called in strictly increasing `FrameIndex` order within the
/// requested render range.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> PromoResult<()>;
    /// Push one frame in strictly increasing timeline order.
    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PromoResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> PromoResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(FrameIndex, Frame)>,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the sink configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<&SinkConfig> {
        self.cfg.as_ref()
    }

    /// Borrow the captured frames.
    pub fn frames(&self) -> &[(FrameIndex, Frame)] {
        &self.frames
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> PromoResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PromoResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> PromoResult<()> {
        Ok(())
    }
}

/// Manifest written next to a PNG sequence for an external encoder.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SequenceManifest {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frame rate.
    pub fps: Fps,
    /// First frame index written.
    pub first_frame: u64,
    /// Number of frames written.
    pub frame_count: u64,
    /// `printf`-style file pattern, e.g. `frame_%05d.png`.
    pub pattern: String,
    /// Audio track to mux, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<PathBuf>,
}

/// Writes `frame_00000.png`, `frame_00001.png`, ... (straight alpha) plus `sequence.json`.
///
/// File numbers are the frame indices, so partial range renders land in the right slots.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    first: Option<u64>,
    written: u64,
}

impl PngSequenceSink {
    /// Manifest file name.
    pub const MANIFEST: &'static str = "sequence.json";

    /// Sink writing into `dir`, created on `begin` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            first: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the PNG written for `idx`.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("frame_{:05}.png", idx.0))
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> PromoResult<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.first = None;
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &Frame) -> PromoResult<()> {
        let Some(cfg) = &self.cfg else {
            return Err(PromoError::render("push_frame called before begin"));
        };
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(PromoError::render(format!(
                "frame {}x{} does not match sink {}x{}",
                frame.width, frame.height, cfg.width, cfg.height
            )));
        }
        let path = self.frame_path(idx);
        let rgba = frame.to_straight_rgba8();
        image::save_buffer_with_format(
            &path,
            &rgba,
            frame.width,
            frame.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;

        self.first.get_or_insert(idx.0);
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> PromoResult<()> {
        let Some(cfg) = self.cfg.take() else {
            return Err(PromoError::render("end called before begin"));
        };
        let manifest = SequenceManifest {
            width: cfg.width,
            height: cfg.height,
            fps: cfg.fps,
            first_frame: self.first.unwrap_or(0),
            frame_count: self.written,
            pattern: "frame_%05d.png".to_owned(),
            audio: cfg.audio,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| PromoError::serde(format!("serialize sequence manifest: {e}")))?;
        let path = self.dir.join(Self::MANIFEST);
        std::fs::write(&path, json)
            .with_context(|| format!("write manifest '{}'", path.display()))?;
        tracing::info!(
            dir = %self.dir.display(),
            frames = self.written,
            "png sequence written"
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
